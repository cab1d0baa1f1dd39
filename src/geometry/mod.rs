//! Mesh data and procedural generators.
//!
//! Meshes are plain CPU data: homogeneous positions (w = 1), normals (w = 0),
//! optional per-vertex colors and a triangle index list. Backends upload them
//! once and draw them until the next regeneration.

mod icosphere;
mod primitives;

pub use icosphere::{icosphere, icosphere_face_count, icosphere_vertex_count};
pub use primitives::{cube, quad};

use bytemuck::{Pod, Zeroable};
use glam::Vec4;

/// Interleaved vertex layout uploaded to the GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 4],
    pub normal: [f32; 4],
    pub color: [f32; 4],
}

/// Color used for vertices of meshes that carry none
pub const DEFAULT_VERTEX_COLOR: Vec4 = Vec4::ONE;

/// Immutable triangle mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec4>,
    pub normals: Vec<Vec4>,
    pub colors: Option<Vec<Vec4>>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles described by the index list
    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Iterate triangles as index triples
    pub fn faces(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Interleave attributes into the upload layout
    pub fn interleaved(&self) -> Vec<Vertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .enumerate()
            .map(|(i, (position, normal))| {
                let color = self
                    .colors
                    .as_ref()
                    .and_then(|colors| colors.get(i).copied())
                    .unwrap_or(DEFAULT_VERTEX_COLOR);
                Vertex {
                    position: position.to_array(),
                    normal: normal.to_array(),
                    color: color.to_array(),
                }
            })
            .collect()
    }
}
