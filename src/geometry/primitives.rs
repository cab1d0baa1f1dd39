//! Fixed-topology primitives: unit cube and full-screen quad.

use glam::{Vec3, Vec4};

use super::Mesh;

/// Depth of the background quad in clip space (just inside the far plane)
pub const QUAD_DEPTH: f32 = 0.999;

/// (normal, u, v) per face with u x v == normal
const CUBE_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::Y, Vec3::Z),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::Z, Vec3::X),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::Y, Vec3::X),
];

/// Axis-aligned cube with half-extent 1 and flat per-face normals
pub fn cube(center: Vec3) -> Mesh {
    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u, v) in CUBE_FACES {
        let base = positions.len() as u32;
        for corner in [-u - v, u - v, u + v, -u + v] {
            positions.push((center + normal + corner).extend(1.0));
            normals.push(normal.extend(0.0));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh {
        positions,
        normals,
        colors: None,
        indices,
    }
}

/// Two-triangle quad covering clip space, offset by `center`
pub fn quad(center: Vec3) -> Mesh {
    let corners = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];
    let positions = corners
        .iter()
        .map(|[x, y]| Vec4::new(x + center.x, y + center.y, QUAD_DEPTH + center.z, 1.0))
        .collect();

    Mesh {
        positions,
        normals: vec![Vec4::new(0.0, 0.0, 1.0, 0.0); 4],
        colors: None,
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}
