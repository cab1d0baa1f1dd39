//! Icosphere generation by recursive icosahedron subdivision.

use std::collections::HashMap;

use glam::Vec3;

use super::Mesh;

/// Golden ratio, the icosahedron's coordinate ratio
const PHI: f32 = 1.618_034;

/// Icosahedron corners before projection onto the unit sphere
const BASE_VERTICES: [[f32; 3]; 12] = [
    [-1.0, PHI, 0.0],
    [1.0, PHI, 0.0],
    [-1.0, -PHI, 0.0],
    [1.0, -PHI, 0.0],
    [0.0, -1.0, PHI],
    [0.0, 1.0, PHI],
    [0.0, -1.0, -PHI],
    [0.0, 1.0, -PHI],
    [PHI, 0.0, -1.0],
    [PHI, 0.0, 1.0],
    [-PHI, 0.0, -1.0],
    [-PHI, 0.0, 1.0],
];

/// Counter-clockwise when seen from outside
const BASE_FACES: [[u32; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Vertex count after `subdivisions` steps: 10 * 4^n + 2
pub fn icosphere_vertex_count(subdivisions: u32) -> usize {
    10 * 4usize.pow(subdivisions) + 2
}

/// Face count after `subdivisions` steps: 20 * 4^n
pub fn icosphere_face_count(subdivisions: u32) -> usize {
    20 * 4usize.pow(subdivisions)
}

/// Working set of unit-sphere vertices and faces during refinement
struct Subdivision {
    vertices: Vec<Vec3>,
    faces: Vec<[u32; 3]>,
}

impl Subdivision {
    fn icosahedron() -> Self {
        Self {
            vertices: BASE_VERTICES
                .iter()
                .map(|v| Vec3::from_array(*v).normalize())
                .collect(),
            faces: BASE_FACES.to_vec(),
        }
    }

    /// Replace every face with four, sharing midpoints across edges
    fn refine(&mut self) {
        let mut midpoints: HashMap<(u32, u32), u32> =
            HashMap::with_capacity(self.faces.len() * 3 / 2);
        let mut faces = Vec::with_capacity(self.faces.len() * 4);

        for &[a, b, c] in &std::mem::take(&mut self.faces) {
            let ab = self.midpoint(&mut midpoints, a, b);
            let bc = self.midpoint(&mut midpoints, b, c);
            let ca = self.midpoint(&mut midpoints, c, a);

            faces.push([a, ab, ca]);
            faces.push([b, bc, ab]);
            faces.push([c, ca, bc]);
            faces.push([ab, bc, ca]);
        }

        self.faces = faces;
    }

    fn midpoint(&mut self, cache: &mut HashMap<(u32, u32), u32>, a: u32, b: u32) -> u32 {
        let key = if a < b { (a, b) } else { (b, a) };
        if let Some(&index) = cache.get(&key) {
            return index;
        }

        let mid = (self.vertices[a as usize] + self.vertices[b as usize]).normalize();
        let index = self.vertices.len() as u32;
        self.vertices.push(mid);
        cache.insert(key, index);
        index
    }
}

/// Build an icosphere of `radius` around `center`
///
/// `subdivisions` is trusted; callers keep it small (the control surface
/// clamps to 0..=8) since every step quadruples the face count.
pub fn icosphere(center: Vec3, radius: f32, subdivisions: u32) -> Mesh {
    let mut work = Subdivision::icosahedron();
    for _ in 0..subdivisions {
        work.refine();
    }

    let positions = work
        .vertices
        .iter()
        .map(|dir| (center + *dir * radius).extend(1.0))
        .collect();
    let normals = work.vertices.iter().map(|dir| dir.extend(0.0)).collect();
    let indices = work.faces.into_iter().flatten().collect();

    Mesh {
        positions,
        normals,
        colors: None,
        indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec4;
    use std::collections::HashSet;

    fn distance_from(center: Vec3, position: Vec4) -> f32 {
        (position.truncate() - center).length()
    }

    #[test]
    fn test_level_zero_is_icosahedron() {
        let center = Vec3::new(1.0, -2.0, 3.0);
        let mesh = icosphere(center, 2.5, 0);

        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.face_count(), 20);
        for p in &mesh.positions {
            assert_relative_eq!(distance_from(center, *p), 2.5, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_level_one_counts() {
        let mesh = icosphere(Vec3::ZERO, 1.0, 1);

        assert_eq!(mesh.vertex_count(), 42);
        assert_eq!(mesh.face_count(), 80);
        for p in &mesh.positions {
            assert_relative_eq!(p.truncate().length(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_counts_follow_closed_form() {
        for level in 0..=5 {
            let mesh = icosphere(Vec3::ZERO, 3.0, level);
            assert_eq!(mesh.vertex_count(), icosphere_vertex_count(level), "level {}", level);
            assert_eq!(mesh.face_count(), icosphere_face_count(level), "level {}", level);
        }
        assert_eq!(icosphere_vertex_count(4), 2562);
        assert_eq!(icosphere_face_count(8), 1_310_720);
    }

    #[test]
    fn test_vertices_on_sphere_surface() {
        let center = Vec3::new(-4.0, 0.5, 10.0);
        let mesh = icosphere(center, 7.0, 3);

        for p in &mesh.positions {
            assert_relative_eq!(distance_from(center, *p), 7.0, epsilon = 1e-4);
            assert_eq!(p.w, 1.0);
        }
    }

    #[test]
    fn test_shared_edges_not_duplicated() {
        let mesh = icosphere(Vec3::ZERO, 1.0, 3);

        let unique: HashSet<[i64; 3]> = mesh
            .positions
            .iter()
            .map(|p| {
                [
                    (p.x * 1e5).round() as i64,
                    (p.y * 1e5).round() as i64,
                    (p.z * 1e5).round() as i64,
                ]
            })
            .collect();

        assert_eq!(unique.len(), icosphere_vertex_count(3));
        assert!(unique.len() < mesh.face_count() * 3);
    }

    #[test]
    fn test_indices_in_bounds() {
        let mesh = icosphere(Vec3::ZERO, 1.0, 4);
        let count = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
    }

    #[test]
    fn test_normals_are_unit_directions() {
        let center = Vec3::new(0.0, 5.0, 0.0);
        let mesh = icosphere(center, 4.0, 2);

        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            assert_eq!(n.w, 0.0);
            assert_relative_eq!(n.truncate().length(), 1.0, epsilon = 1e-5);
            let expected = (p.truncate() - center).normalize();
            assert_relative_eq!(n.truncate().dot(expected), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_winding_faces_outward() {
        let center = Vec3::new(2.0, 2.0, 2.0);
        let mesh = icosphere(center, 1.5, 2);

        for [a, b, c] in mesh.faces() {
            let pa = mesh.positions[a as usize].truncate();
            let pb = mesh.positions[b as usize].truncate();
            let pc = mesh.positions[c as usize].truncate();
            let normal = (pb - pa).cross(pc - pa);
            let centroid = (pa + pb + pc) / 3.0;
            assert!(normal.dot(centroid - center) > 0.0);
        }
    }
}
