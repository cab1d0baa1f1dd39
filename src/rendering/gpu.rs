//! wgpu implementation of the rendering backend.
//!
//! Programs keep a CPU staging copy of their uniform struct. Every draw
//! snapshots the staging bytes into a per-frame arena that is bound with a
//! dynamic offset, so several draws of one program in a frame each see the
//! values that were current when they were issued.

use std::num::NonZeroU64;
use std::sync::Arc;

use winit::window::Window;

use super::backend::{RenderBackend, ShaderStage, UniformKind, UniformValue};
use super::reflect::{merge_blocks, reflect_stage, UniformBlock};
use crate::error::{Error, Result};
use crate::geometry::{Mesh, Vertex};

/// Size of the per-frame uniform arena
const ARENA_BYTES: u64 = 64 * 1024;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Compiled stage plus its reflection
pub struct GpuShader {
    stage: ShaderStage,
    module: wgpu::ShaderModule,
    entry_point: String,
    uniforms: Option<UniformBlock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramId(usize);

#[derive(Debug, Clone, Copy)]
pub struct UniformLocation {
    program: ProgramId,
    offset: u32,
    kind: UniformKind,
}

/// Vertex and index buffers for one mesh
pub struct MeshBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
}

struct GpuProgram {
    label: String,
    /// Indexed by depth-write flag (0 = off, 1 = on)
    pipelines: [wgpu::RenderPipeline; 2],
    bind_group: Option<wgpu::BindGroup>,
    block: Option<UniformBlock>,
    staging: Vec<u8>,
    /// Arena bytes consumed per draw
    stride: u64,
}

struct DrawCall {
    program: ProgramId,
    depth_write: bool,
    mesh: Arc<MeshBuffers>,
    count: u32,
    uniform_offset: Option<u32>,
}

/// Rendering backend over a window surface
pub struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    arena: wgpu::Buffer,
    arena_data: Vec<u8>,
    arena_cursor: u64,
    uniform_alignment: u64,
    programs: Vec<GpuProgram>,
    current: Option<ProgramId>,
    depth_write: bool,
    clear_color: wgpu::Color,
    draws: Vec<DrawCall>,
}

impl WgpuBackend {
    /// Acquire adapter, device and surface for `window`
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| Error::ContextUnavailable(format!("failed to create surface: {}", e)))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| Error::ContextUnavailable("no suitable GPU adapter".to_string()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| Error::ContextUnavailable(format!("failed to request device: {}", e)))?;

        log::info!("GPU: {} ({:?})", adapter.get_info().name, adapter.get_info().backend);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| Error::ContextUnavailable("surface reports no formats".to_string()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, &config);

        let arena = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Arena"),
            size: ARENA_BYTES,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_alignment = device.limits().min_uniform_buffer_offset_alignment as u64;

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            arena,
            arena_data: vec![0; ARENA_BYTES as usize],
            arena_cursor: 0,
            uniform_alignment,
            programs: Vec::new(),
            current: None,
            depth_write: true,
            clear_color: wgpu::Color::BLACK,
            draws: Vec::new(),
        })
    }

    /// Reconfigure the surface and depth target for a new window size
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, &self.config);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn create_pipeline(
        &self,
        label: &str,
        layout: &wgpu::PipelineLayout,
        vertex: &GpuShader,
        fragment: &GpuShader,
        depth_write: bool,
    ) -> wgpu::RenderPipeline {
        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &vertex.module,
                    entry_point: Some(vertex.entry_point.as_str()),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x4,
                            1 => Float32x4,
                            2 => Float32x4
                        ],
                    }],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment.module,
                    entry_point: Some(fragment.entry_point.as_str()),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.config.format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: depth_write,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
    }

    /// Claim arena space for the current program's uniforms
    fn snapshot_uniforms(&mut self, id: ProgramId) -> Option<Option<u32>> {
        let program = &self.programs[id.0];
        if program.block.is_none() {
            return Some(None);
        }
        if self.arena_cursor + program.stride > ARENA_BYTES {
            log::warn!(
                "Uniform arena full, dropping draw of '{}' this frame",
                program.label
            );
            return None;
        }

        let start = self.arena_cursor as usize;
        self.arena_data[start..start + program.staging.len()].copy_from_slice(&program.staging);
        self.arena_cursor += program.stride;
        Some(Some(start as u32))
    }
}

impl RenderBackend for WgpuBackend {
    type Shader = GpuShader;
    type Program = ProgramId;
    type Location = UniformLocation;
    type Mesh = Arc<MeshBuffers>;

    fn compile(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> std::result::Result<GpuShader, String> {
        let reflection = reflect_stage(stage, source)?;

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(reflection.entry_point.as_str()),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(err.to_string());
        }

        Ok(GpuShader {
            stage,
            module,
            entry_point: reflection.entry_point,
            uniforms: reflection.uniforms,
        })
    }

    fn link(
        &mut self,
        label: &str,
        vertex: &GpuShader,
        fragment: &GpuShader,
    ) -> std::result::Result<ProgramId, String> {
        if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
            return Err(format!(
                "expected vertex + fragment stages, got {} + {}",
                vertex.stage, fragment.stage
            ));
        }

        let block = merge_blocks(vertex.uniforms.as_ref(), fragment.uniforms.as_ref())?;

        let bind_group_layout = block.as_ref().map(|block| {
            self.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(block.span as u64),
                    },
                    count: None,
                }],
            })
        });

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let bind_group = match (&bind_group_layout, &block) {
            (Some(layout), Some(block)) => {
                Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(label),
                    layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                            buffer: &self.arena,
                            offset: 0,
                            size: NonZeroU64::new(block.span as u64),
                        }),
                    }],
                }))
            }
            _ => None,
        };

        let layouts: Vec<&wgpu::BindGroupLayout> = bind_group_layout.iter().collect();
        let pipeline_layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &layouts,
            push_constant_ranges: &[],
        });

        let pipelines = [
            self.create_pipeline(label, &pipeline_layout, vertex, fragment, false),
            self.create_pipeline(label, &pipeline_layout, vertex, fragment, true),
        ];

        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(err.to_string());
        }

        let span = block.as_ref().map_or(0, |b| b.span as u64);
        let stride = span.div_ceil(self.uniform_alignment) * self.uniform_alignment;

        self.programs.push(GpuProgram {
            label: label.to_string(),
            pipelines,
            bind_group,
            block,
            staging: vec![0; span as usize],
            stride,
        });
        Ok(ProgramId(self.programs.len() - 1))
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let field = self.programs.get(program.0)?.block.as_ref()?.fields.get(name)?;
        Some(UniformLocation {
            program,
            offset: field.offset,
            kind: field.kind,
        })
    }

    fn use_program(&mut self, program: ProgramId) {
        self.current = Some(program);
    }

    fn upload(&mut self, location: UniformLocation, value: UniformValue) {
        if value.kind() != location.kind {
            log::warn!(
                "Ignoring {:?} upload into {:?} uniform at offset {}",
                value.kind(),
                location.kind,
                location.offset
            );
            return;
        }
        let program = &mut self.programs[location.program.0];
        let bytes = value.to_bytes();
        let start = location.offset as usize;
        program.staging[start..start + bytes.len()].copy_from_slice(&bytes);
    }

    fn create_mesh(&mut self, mesh: &Mesh) -> Arc<MeshBuffers> {
        use wgpu::util::DeviceExt;

        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.interleaved()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Arc::new(MeshBuffers {
            vertex_buffer,
            index_buffer,
        })
    }

    fn destroy_mesh(&mut self, mesh: Arc<MeshBuffers>) {
        // Draws recorded this frame may still hold a reference
        if let Ok(buffers) = Arc::try_unwrap(mesh) {
            buffers.vertex_buffer.destroy();
            buffers.index_buffer.destroy();
        }
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.depth_write = enabled;
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.clear_color = wgpu::Color {
            r: color[0] as f64,
            g: color[1] as f64,
            b: color[2] as f64,
            a: color[3] as f64,
        };
        self.draws.clear();
        self.arena_cursor = 0;
    }

    fn draw_indexed(&mut self, mesh: &Arc<MeshBuffers>, count: u32) {
        let Some(program) = self.current else {
            log::warn!("Draw issued with no active program");
            return;
        };
        let Some(uniform_offset) = self.snapshot_uniforms(program) else {
            return;
        };
        self.draws.push(DrawCall {
            program,
            depth_write: self.depth_write,
            mesh: Arc::clone(mesh),
            count,
            uniform_offset,
        });
    }

    fn present(&mut self) -> std::result::Result<(), String> {
        let draws = std::mem::take(&mut self.draws);

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(e) => return Err(e.to_string()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if self.arena_cursor > 0 {
            self.queue.write_buffer(
                &self.arena,
                0,
                &self.arena_data[..self.arena_cursor as usize],
            );
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for draw in &draws {
                let program = &self.programs[draw.program.0];
                render_pass.set_pipeline(&program.pipelines[draw.depth_write as usize]);
                if let (Some(bind_group), Some(offset)) =
                    (&program.bind_group, draw.uniform_offset)
                {
                    render_pass.set_bind_group(0, bind_group, &[offset]);
                }
                render_pass.set_vertex_buffer(0, draw.mesh.vertex_buffer.slice(..));
                render_pass
                    .set_index_buffer(draw.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..draw.count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
