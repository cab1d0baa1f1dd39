//! GPU-resident meshes for the three drawn objects.

use glam::Vec3;

use crate::geometry::{cube, icosphere, quad};
use crate::rendering::{GpuMesh, RenderBackend};

/// Icosphere, cube and background quad, uploaded
pub struct Scene<B: RenderBackend> {
    pub icosphere: GpuMesh<B>,
    pub cube: GpuMesh<B>,
    pub quad: GpuMesh<B>,
    tessellation: u32,
    radius: f32,
}

impl<B: RenderBackend> Scene<B> {
    pub fn load(backend: &mut B, tessellation: u32, radius: f32) -> Self {
        log::debug!("Loading scene (tessellation {})", tessellation);
        Self {
            icosphere: GpuMesh::upload(backend, &icosphere(Vec3::ZERO, radius, tessellation)),
            cube: GpuMesh::upload(backend, &cube(Vec3::ZERO)),
            quad: GpuMesh::upload(backend, &quad(Vec3::ZERO)),
            tessellation,
            radius,
        }
    }

    /// Level the current icosphere was built at
    pub fn tessellation(&self) -> u32 {
        self.tessellation
    }

    /// Rebuild the icosphere if `level` differs from the current one
    ///
    /// The old buffers are released before this returns. Returns whether a
    /// rebuild happened.
    pub fn ensure_tessellation(&mut self, backend: &mut B, level: u32) -> bool {
        if level == self.tessellation {
            return false;
        }

        let mesh = icosphere(Vec3::ZERO, self.radius, level);
        log::debug!(
            "Tessellation {} -> {}: {} vertices, {} faces",
            self.tessellation,
            level,
            mesh.vertex_count(),
            mesh.face_count()
        );

        let old = std::mem::replace(&mut self.icosphere, GpuMesh::upload(backend, &mesh));
        old.release(backend);
        self.tessellation = level;
        true
    }

    /// Replace every mesh, built at `tessellation`
    pub fn reload(&mut self, backend: &mut B, tessellation: u32) {
        let fresh = Self::load(backend, tessellation, self.radius);
        std::mem::replace(self, fresh).release(backend);
    }

    pub fn release(self, backend: &mut B) {
        self.icosphere.release(backend);
        self.cube.release(backend);
        self.quad.release(backend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::icosphere_vertex_count;
    use crate::rendering::testing::{Call, RecordingBackend};

    #[test]
    fn test_load_uploads_three_meshes() {
        let mut backend = RecordingBackend::default();
        let scene = Scene::load(&mut backend, 1, 1.0);

        assert_eq!(backend.count(|c| matches!(c, Call::CreateMesh { .. })), 3);
        assert_eq!(scene.icosphere.vertex_count(), 42);
        assert_eq!(scene.cube.index_count(), 36);
        assert_eq!(scene.quad.index_count(), 6);
    }

    #[test]
    fn test_same_level_is_a_no_op() {
        let mut backend = RecordingBackend::default();
        let mut scene = Scene::load(&mut backend, 2, 1.0);
        backend.clear_calls();

        assert!(!scene.ensure_tessellation(&mut backend, 2));
        assert!(backend.calls.is_empty());
    }

    #[test]
    fn test_level_change_replaces_and_destroys() {
        let mut backend = RecordingBackend::default();
        let mut scene = Scene::load(&mut backend, 3, 1.0);
        let old_id = scene.icosphere.handle().id;
        backend.clear_calls();

        assert!(scene.ensure_tessellation(&mut backend, 5));

        assert_eq!(scene.tessellation(), 5);
        assert_eq!(scene.icosphere.vertex_count(), icosphere_vertex_count(5));
        assert!(backend.calls.contains(&Call::DestroyMesh(old_id)));
    }

    #[test]
    fn test_reload_replaces_everything() {
        let mut backend = RecordingBackend::default();
        let mut scene = Scene::load(&mut backend, 0, 1.0);
        backend.clear_calls();

        scene.reload(&mut backend, 1);

        assert_eq!(backend.count(|c| matches!(c, Call::CreateMesh { .. })), 3);
        assert_eq!(backend.count(|c| matches!(c, Call::DestroyMesh(_))), 3);
        assert_eq!(scene.tessellation(), 1);
    }
}
