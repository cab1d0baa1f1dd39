//! Rendering backend abstraction.
//!
//! The core only needs a handful of primitives: compile and link shader
//! stages, look up uniform slots, upload values, manage mesh buffers and
//! issue indexed draws. Everything platform specific lives behind this trait.

use std::fmt;

use glam::{Mat4, Vec2, Vec4};

use crate::geometry::Mesh;

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

/// Shape of a uniform slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Int,
    Vec2,
    Vec4,
    Mat4,
}

impl UniformKind {
    /// Size in bytes of the host representation
    pub fn size(self) -> usize {
        match self {
            Self::Float | Self::Int => 4,
            Self::Vec2 => 8,
            Self::Vec4 => 16,
            Self::Mat4 => 64,
        }
    }
}

/// Value written into a uniform slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2(Vec2),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            Self::Float(_) => UniformKind::Float,
            Self::Int(_) => UniformKind::Int,
            Self::Vec2(_) => UniformKind::Vec2,
            Self::Vec4(_) => UniformKind::Vec4,
            Self::Mat4(_) => UniformKind::Mat4,
        }
    }

    /// Native-endian bytes, matrices column-major
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Float(v) => v.to_ne_bytes().to_vec(),
            Self::Int(v) => v.to_ne_bytes().to_vec(),
            Self::Vec2(v) => bytemuck::cast_slice(&v.to_array()).to_vec(),
            Self::Vec4(v) => bytemuck::cast_slice(&v.to_array()).to_vec(),
            Self::Mat4(m) => bytemuck::cast_slice(&m.to_cols_array()).to_vec(),
        }
    }
}

/// Primitives the frame driver and shader programs rely on
///
/// Shader and link failures are returned as the backend's diagnostic text;
/// callers decide how fatal they are.
pub trait RenderBackend {
    type Shader;
    type Program: Copy + Eq + fmt::Debug;
    type Location: Copy + fmt::Debug;
    type Mesh;

    fn compile(&mut self, stage: ShaderStage, source: &str) -> Result<Self::Shader, String>;

    fn link(
        &mut self,
        label: &str,
        vertex: &Self::Shader,
        fragment: &Self::Shader,
    ) -> Result<Self::Program, String>;

    /// `None` when the program does not declare the uniform
    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::Location>;

    fn use_program(&mut self, program: Self::Program);

    fn upload(&mut self, location: Self::Location, value: UniformValue);

    fn create_mesh(&mut self, mesh: &Mesh) -> Self::Mesh;

    /// Release the buffers behind a mesh handle
    fn destroy_mesh(&mut self, mesh: Self::Mesh);

    fn set_depth_write(&mut self, enabled: bool);

    /// Begin a frame cleared to `color`
    fn clear(&mut self, color: [f32; 4]);

    /// Draw `count` indices of `mesh` with the active program
    fn draw_indexed(&mut self, mesh: &Self::Mesh, count: u32);

    /// Submit everything recorded since `clear`
    fn present(&mut self) -> Result<(), String>;
}

/// Uploaded mesh handle with the counts needed to draw it
pub struct GpuMesh<B: RenderBackend> {
    handle: B::Mesh,
    vertex_count: usize,
    index_count: u32,
}

impl<B: RenderBackend> GpuMesh<B> {
    pub fn upload(backend: &mut B, mesh: &Mesh) -> Self {
        Self {
            handle: backend.create_mesh(mesh),
            vertex_count: mesh.vertex_count(),
            index_count: mesh.index_count(),
        }
    }

    /// Hand the buffers back to the backend
    pub fn release(self, backend: &mut B) {
        backend.destroy_mesh(self.handle);
    }

    pub fn handle(&self) -> &B::Mesh {
        &self.handle
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_sizes_match_kinds() {
        let values = [
            UniformValue::Float(1.5),
            UniformValue::Int(-3),
            UniformValue::Vec2(Vec2::new(1.0, 2.0)),
            UniformValue::Vec4(Vec4::ONE),
            UniformValue::Mat4(Mat4::IDENTITY),
        ];
        for value in values {
            assert_eq!(value.to_bytes().len(), value.kind().size());
        }
    }

    #[test]
    fn test_matrix_bytes_are_column_major() {
        let m = Mat4::from_translation(glam::Vec3::new(7.0, 8.0, 9.0));
        let bytes = UniformValue::Mat4(m).to_bytes();
        let floats: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(&floats[12..15], &[7.0, 8.0, 9.0]);
    }
}
