//! Per-frame driver: time, amplitude, uniforms and ordered draws.
//!
//! One call to [`FrameDriver::frame`] renders one frame. The driver owns the
//! rendering context, the three shader programs, the uploaded scene, the
//! camera and the live controls, and carries an explicit run flag that the
//! application checks before scheduling the next redraw.

mod clock;
mod scene;

pub use clock::PauseClock;
pub use scene::Scene;

use glam::{Mat4, Vec2};

use crate::audio::AmplitudeSource;
use crate::camera::Camera;
use crate::error::Result;
use crate::params::{Controls, RenderConfig};
use crate::rendering::{RenderBackend, RenderContext, ShaderProgram, ShaderSources};

/// Scale applied to the analyser level before the amplitude control
const AMPLITUDE_GAIN: f32 = 12.0;

/// The three programs drawn every frame
pub struct Programs<B: RenderBackend> {
    /// Displaced icosphere
    pub noise: ShaderProgram<B>,
    /// Cube
    pub lambert: ShaderProgram<B>,
    /// Background quad
    pub flat: ShaderProgram<B>,
}

impl<B: RenderBackend> Programs<B> {
    pub fn compile(ctx: &mut RenderContext<B>) -> Result<Self> {
        Ok(Self {
            noise: ShaderProgram::new(ctx, &ShaderSources::noise())?,
            lambert: ShaderProgram::new(ctx, &ShaderSources::lambert())?,
            flat: ShaderProgram::new(ctx, &ShaderSources::flat())?,
        })
    }

    fn all(&self) -> [&ShaderProgram<B>; 3] {
        [&self.noise, &self.lambert, &self.flat]
    }
}

/// What a frame computed, for logging and tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Seconds passed to the `time` uniform
    pub time: f32,
    /// Raw analyser level (0–255)
    pub sample: f32,
    /// Value passed to the `amp` uniform
    pub amplitude: f32,
    /// The icosphere was rebuilt this frame
    pub regenerated: bool,
    /// Present succeeded
    pub presented: bool,
}

pub struct FrameDriver<B: RenderBackend> {
    ctx: RenderContext<B>,
    programs: Programs<B>,
    scene: Scene<B>,
    camera: Camera,
    controls: Controls,
    config: RenderConfig,
    clock: PauseClock,
    held_amplitude: Option<f32>,
    viewport: (u32, u32),
    running: bool,
}

impl<B: RenderBackend> FrameDriver<B> {
    /// Compile the programs and upload the initial scene
    pub fn new(
        backend: B,
        camera: Camera,
        controls: Controls,
        config: RenderConfig,
    ) -> Result<Self> {
        let mut ctx = RenderContext::new(backend);
        let programs = Programs::compile(&mut ctx)?;
        let scene = Scene::load(ctx.backend_mut(), controls.tessellation, config.icosphere_radius);
        let viewport = (config.window_width, config.window_height);

        let mut driver = Self {
            ctx,
            programs,
            scene,
            camera,
            controls,
            config,
            clock: PauseClock::new(),
            held_amplitude: None,
            viewport,
            running: false,
        };
        driver.resize(viewport.0, viewport.1);
        Ok(driver)
    }

    /// Render one frame at `timestamp_ms`
    pub fn frame(&mut self, timestamp_ms: f64, audio: &mut dyn AmplitudeSource) -> FrameReport {
        self.camera.update();

        let sample = audio.sample_amplitude();
        let paused = self.controls.pause;
        let time = self.clock.tick(timestamp_ms, paused);
        let amplitude = self.amplitude(sample, paused);

        let regenerated = self
            .scene
            .ensure_tessellation(self.ctx.backend_mut(), self.controls.tessellation);

        self.write_uniforms(time, amplitude);

        self.ctx.backend_mut().clear(self.config.clear_color);
        self.draw();

        let presented = match self.ctx.backend_mut().present() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Present failed: {}", e);
                false
            }
        };

        log::trace!(
            "frame t={:.3}s sample={:.1} amp={:.3}{}",
            time,
            sample,
            amplitude,
            if regenerated { " (regenerated)" } else { "" }
        );

        FrameReport {
            time,
            sample,
            amplitude,
            regenerated,
            presented,
        }
    }

    /// Render frames until the timestamps run out or `stop` is called
    ///
    /// `on_frame` runs after every frame and may change controls or stop the
    /// driver. Returns the number of frames rendered.
    pub fn run<I, F>(
        &mut self,
        timestamps: I,
        audio: &mut dyn AmplitudeSource,
        mut on_frame: F,
    ) -> usize
    where
        I: IntoIterator<Item = f64>,
        F: FnMut(&mut Self, &FrameReport),
    {
        self.running = true;
        let mut frames = 0;
        for timestamp in timestamps {
            if !self.running {
                break;
            }
            let report = self.frame(timestamp, audio);
            frames += 1;
            on_frame(self, &report);
        }
        frames
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Rebuild every mesh at the current tessellation
    pub fn load_scene(&mut self) {
        self.scene
            .reload(self.ctx.backend_mut(), self.controls.tessellation);
    }

    /// Track a new viewport size
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        self.viewport = (width, height);
        self.camera.set_aspect_ratio(width as f32 / height as f32);
        self.camera.update_projection_matrix();
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut Controls {
        &mut self.controls
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn scene(&self) -> &Scene<B> {
        &self.scene
    }

    pub fn programs(&self) -> &Programs<B> {
        &self.programs
    }

    pub fn context(&self) -> &RenderContext<B> {
        &self.ctx
    }

    pub fn backend_mut(&mut self) -> &mut B {
        self.ctx.backend_mut()
    }

    /// Amplitude uniform; the last running value is held while paused
    fn amplitude(&mut self, sample: f32, paused: bool) -> f32 {
        if paused {
            if let Some(held) = self.held_amplitude {
                return held;
            }
        }

        let amplitude = if self.controls.visualize {
            self.controls.amplitude * AMPLITUDE_GAIN * sample / 100.0
        } else {
            self.controls.amplitude
        };
        self.held_amplitude = Some(amplitude);
        amplitude
    }

    fn write_uniforms(&mut self, time: f32, amplitude: f32) {
        let ctx = &mut self.ctx;
        let controls = &self.controls;
        let color = controls.color_vec4();
        let view_proj = self.camera.view_proj();

        for program in self.programs.all() {
            program.set_geometry_color(ctx, color);
            program.set_time(ctx, time);
            program.set_amplitude(ctx, amplitude);
            program.set_frequency(ctx, self.config.frequency);
            program.set_impulse(ctx, controls.parabola);
            program.set_freq_fbm(ctx, controls.freq_fbm);
            program.set_pause_flag(ctx, controls.pause);
            program.set_visualize_flag(ctx, controls.visualize);
            program.set_view_proj_matrix(ctx, view_proj);
        }

        self.programs.noise.set_model_matrix(ctx, Mat4::IDENTITY);
        self.programs
            .lambert
            .set_model_matrix(ctx, Mat4::from_scale(glam::Vec3::splat(self.config.cube_scale)));
        self.programs.flat.set_camera_position(ctx, self.camera.eye());
        self.programs.flat.set_dimensions(
            ctx,
            Vec2::new(self.viewport.0 as f32, self.viewport.1 as f32),
        );
    }

    /// Background quad, then the cube, then the icosphere
    fn draw(&mut self) {
        let ctx = &mut self.ctx;

        ctx.backend_mut().set_depth_write(false);
        self.programs.flat.draw(ctx, &self.scene.quad);
        ctx.backend_mut().set_depth_write(true);

        self.programs.lambert.draw(ctx, &self.scene.cube);
        self.programs.noise.draw(ctx, &self.scene.icosphere);
    }
}
