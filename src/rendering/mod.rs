//! Rendering: backend abstraction, wgpu implementation and shader programs.

mod backend;
mod context;
mod gpu;
mod reflect;
mod shader;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{GpuMesh, RenderBackend, ShaderStage, UniformKind, UniformValue};
pub use context::RenderContext;
pub use gpu::{GpuShader, MeshBuffers, ProgramId, UniformLocation, WgpuBackend};
pub use reflect::{merge_blocks, reflect_stage, StageReflection, UniformBlock, UniformField};
pub use shader::{uniform_names, ShaderProgram, ShaderSources};
