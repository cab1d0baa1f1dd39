//! Shader programs and their typed parameter setters.

use glam::{Mat4, Vec2, Vec3, Vec4};

use super::backend::{GpuMesh, RenderBackend, ShaderStage, UniformValue};
use super::context::RenderContext;
use crate::error::{Error, Result};

/// Uniform names as declared in the WGSL uniform structs
pub mod uniform_names {
    pub const MODEL: &str = "model";
    pub const MODEL_INV_TR: &str = "model_inv_tr";
    pub const VIEW_PROJ: &str = "view_proj";
    pub const COLOR: &str = "color";
    pub const CAM_POS: &str = "cam_pos";
    pub const DIMENSIONS: &str = "dimensions";
    pub const TIME: &str = "time";
    pub const AMP: &str = "amp";
    pub const FREQ: &str = "freq";
    pub const IMPULSE: &str = "impulse";
    pub const FREQ_FBM: &str = "freq_fbm";
    pub const PAUSE: &str = "pause";
    pub const VIS: &str = "vis";

    pub const ALL: [&str; 13] = [
        MODEL,
        MODEL_INV_TR,
        VIEW_PROJ,
        COLOR,
        CAM_POS,
        DIMENSIONS,
        TIME,
        AMP,
        FREQ,
        IMPULSE,
        FREQ_FBM,
        PAUSE,
        VIS,
    ];
}

/// Vertex/fragment source pair for one program
#[derive(Debug, Clone, Copy)]
pub struct ShaderSources {
    pub label: &'static str,
    pub vertex: &'static str,
    pub fragment: &'static str,
}

impl ShaderSources {
    /// Displaced, audio-reactive icosphere
    pub fn noise() -> Self {
        Self {
            label: "noise",
            vertex: include_str!("shaders/noise.vert.wgsl"),
            fragment: include_str!("shaders/noise.frag.wgsl"),
        }
    }

    /// Diffuse-lit solid geometry
    pub fn lambert() -> Self {
        Self {
            label: "lambert",
            vertex: include_str!("shaders/lambert.vert.wgsl"),
            fragment: include_str!("shaders/lambert.frag.wgsl"),
        }
    }

    /// Screen-space background
    pub fn flat() -> Self {
        Self {
            label: "flat",
            vertex: include_str!("shaders/flat.vert.wgsl"),
            fragment: include_str!("shaders/flat.frag.wgsl"),
        }
    }
}

/// Resolved slots; `None` means the program does not use that uniform
struct UniformSlots<L> {
    model: Option<L>,
    model_inv_tr: Option<L>,
    view_proj: Option<L>,
    color: Option<L>,
    cam_pos: Option<L>,
    dimensions: Option<L>,
    time: Option<L>,
    amp: Option<L>,
    freq: Option<L>,
    impulse: Option<L>,
    freq_fbm: Option<L>,
    pause: Option<L>,
    vis: Option<L>,
}

/// A linked program plus its named parameter slots
pub struct ShaderProgram<B: RenderBackend> {
    label: &'static str,
    program: B::Program,
    slots: UniformSlots<B::Location>,
}

impl<B: RenderBackend> ShaderProgram<B> {
    /// Compile both stages and link them
    ///
    /// Any compile or link diagnostic is returned as a fatal error.
    pub fn new(ctx: &mut RenderContext<B>, sources: &ShaderSources) -> Result<Self> {
        let backend = ctx.backend_mut();

        let vertex = backend
            .compile(ShaderStage::Vertex, sources.vertex)
            .map_err(|log| Error::ShaderCompile {
                stage: ShaderStage::Vertex,
                log,
            })?;
        let fragment = backend
            .compile(ShaderStage::Fragment, sources.fragment)
            .map_err(|log| Error::ShaderCompile {
                stage: ShaderStage::Fragment,
                log,
            })?;
        let program = backend
            .link(sources.label, &vertex, &fragment)
            .map_err(|log| Error::ShaderLink {
                label: sources.label.to_string(),
                log,
            })?;

        let backend = ctx.backend();
        let slot = |name: &str| backend.uniform_location(program, name);
        let slots = UniformSlots {
            model: slot(uniform_names::MODEL),
            model_inv_tr: slot(uniform_names::MODEL_INV_TR),
            view_proj: slot(uniform_names::VIEW_PROJ),
            color: slot(uniform_names::COLOR),
            cam_pos: slot(uniform_names::CAM_POS),
            dimensions: slot(uniform_names::DIMENSIONS),
            time: slot(uniform_names::TIME),
            amp: slot(uniform_names::AMP),
            freq: slot(uniform_names::FREQ),
            impulse: slot(uniform_names::IMPULSE),
            freq_fbm: slot(uniform_names::FREQ_FBM),
            pause: slot(uniform_names::PAUSE),
            vis: slot(uniform_names::VIS),
        };

        log::debug!("Linked shader program '{}' ({:?})", sources.label, program);

        Ok(Self {
            label: sources.label,
            program,
            slots,
        })
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn handle(&self) -> B::Program {
        self.program
    }

    pub fn bind(&self, ctx: &mut RenderContext<B>) {
        ctx.bind(self.program);
    }

    fn write(&self, ctx: &mut RenderContext<B>, slot: Option<B::Location>, value: UniformValue) {
        self.bind(ctx);
        if let Some(location) = slot {
            ctx.backend_mut().upload(location, value);
        }
    }

    /// Upload the model matrix and its inverse transpose (for normals)
    pub fn set_model_matrix(&self, ctx: &mut RenderContext<B>, model: Mat4) {
        self.write(ctx, self.slots.model, UniformValue::Mat4(model));
        if self.slots.model_inv_tr.is_some() {
            let inv_tr = model.inverse().transpose();
            self.write(ctx, self.slots.model_inv_tr, UniformValue::Mat4(inv_tr));
        }
    }

    pub fn set_view_proj_matrix(&self, ctx: &mut RenderContext<B>, view_proj: Mat4) {
        self.write(ctx, self.slots.view_proj, UniformValue::Mat4(view_proj));
    }

    pub fn set_geometry_color(&self, ctx: &mut RenderContext<B>, color: Vec4) {
        self.write(ctx, self.slots.color, UniformValue::Vec4(color));
    }

    pub fn set_camera_position(&self, ctx: &mut RenderContext<B>, eye: Vec3) {
        self.write(ctx, self.slots.cam_pos, UniformValue::Vec4(eye.extend(1.0)));
    }

    pub fn set_dimensions(&self, ctx: &mut RenderContext<B>, dimensions: Vec2) {
        self.write(ctx, self.slots.dimensions, UniformValue::Vec2(dimensions));
    }

    pub fn set_time(&self, ctx: &mut RenderContext<B>, time: f32) {
        self.write(ctx, self.slots.time, UniformValue::Float(time));
    }

    pub fn set_amplitude(&self, ctx: &mut RenderContext<B>, amplitude: f32) {
        self.write(ctx, self.slots.amp, UniformValue::Float(amplitude));
    }

    pub fn set_frequency(&self, ctx: &mut RenderContext<B>, frequency: f32) {
        self.write(ctx, self.slots.freq, UniformValue::Float(frequency));
    }

    pub fn set_impulse(&self, ctx: &mut RenderContext<B>, impulse: f32) {
        self.write(ctx, self.slots.impulse, UniformValue::Float(impulse));
    }

    pub fn set_freq_fbm(&self, ctx: &mut RenderContext<B>, freq_fbm: f32) {
        self.write(ctx, self.slots.freq_fbm, UniformValue::Float(freq_fbm));
    }

    pub fn set_pause_flag(&self, ctx: &mut RenderContext<B>, paused: bool) {
        self.write(ctx, self.slots.pause, UniformValue::Int(paused as i32));
    }

    pub fn set_visualize_flag(&self, ctx: &mut RenderContext<B>, visualize: bool) {
        self.write(ctx, self.slots.vis, UniformValue::Int(visualize as i32));
    }

    /// Draw a whole mesh with this program
    pub fn draw(&self, ctx: &mut RenderContext<B>, mesh: &GpuMesh<B>) {
        self.bind(ctx);
        ctx.backend_mut().draw_indexed(mesh.handle(), mesh.index_count());
    }
}
