//! Orbiting look-at camera with perspective projection.

use glam::{Mat4, Quat, Vec3};

use crate::params::CameraConfig;

/// Smallest eye-target distance zoom will allow
const MIN_DISTANCE: f32 = 1e-3;

/// Eye/target/up camera with cached view and projection matrices
#[derive(Debug, Clone)]
pub struct Camera {
    eye: Vec3,
    target: Vec3,
    up: Vec3,

    /// Vertical field of view (radians)
    fovy: f32,
    near: f32,
    far: f32,
    aspect: f32,

    view: Mat4,
    projection: Mat4,
}

impl Camera {
    /// Create a camera looking from `eye` at `target` with +Y up
    pub fn new(eye: Vec3, target: Vec3, config: &CameraConfig) -> Self {
        let mut camera = Self {
            eye,
            target,
            up: Vec3::Y,
            fovy: config.fov_degrees.to_radians(),
            near: config.near_plane,
            far: config.far_plane,
            aspect: 1.0,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        camera.update();
        camera.update_projection_matrix();
        camera
    }

    /// Recompute the view matrix from eye, target and up
    pub fn update(&mut self) {
        self.view = Mat4::look_at_rh(self.eye, self.target, self.up);
    }

    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Recompute the projection matrix (wgpu depth range [0, 1])
    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(self.fovy, self.aspect, self.near, self.far);
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn distance(&self) -> f32 {
        (self.eye - self.target).length()
    }

    /// Rotate the eye about the target
    ///
    /// `yaw` turns about the up vector, `pitch` about the camera's right
    /// axis. Pitch carries the up vector along, so the camera can roll over
    /// the poles.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let up = self.up.normalize_or_zero();
        let mut offset = self.eye - self.target;

        if up != Vec3::ZERO {
            offset = Quat::from_axis_angle(up, -yaw) * offset;
        }

        let right = (-offset).cross(up).normalize_or_zero();
        if right != Vec3::ZERO {
            let rotation = Quat::from_axis_angle(right, -pitch);
            offset = rotation * offset;
            self.up = (rotation * up).normalize();
        }

        self.eye = self.target + offset;
    }

    /// Translate eye and target together in the view plane
    pub fn pan(&mut self, right_amount: f32, up_amount: f32) {
        let forward = (self.target - self.eye).normalize_or_zero();
        let right = forward.cross(self.up).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();
        let delta = right * right_amount + up * up_amount;
        self.eye += delta;
        self.target += delta;
    }

    /// Scale the eye-target distance by `factor`
    pub fn zoom(&mut self, factor: f32) {
        let offset = self.eye - self.target;
        let distance = offset.length();
        if distance <= 0.0 || !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let new_distance = (distance * factor).max(MIN_DISTANCE);
        self.eye = self.target + offset * (new_distance / distance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> Camera {
        let config = CameraConfig::default();
        Camera::new(config.eye, config.target, &config)
    }

    #[test]
    fn test_aspect_ratio_reaches_projection() {
        let mut camera = camera();
        let (w, h) = (1920.0_f32, 1080.0_f32);

        camera.set_aspect_ratio(w / h);
        camera.update_projection_matrix();

        assert_eq!(camera.aspect_ratio(), w / h);
        let proj = camera.projection();
        assert_relative_eq!(proj.y_axis.y / proj.x_axis.x, w / h, epsilon = 1e-5);
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let mut camera = camera();
        camera.set_aspect_ratio(16.0 / 9.0);
        camera.update_projection_matrix();

        let clip = camera.view_proj() * camera.target().extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(ndc.y, 0.0, epsilon = 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_view_requires_update() {
        let mut camera = camera();
        let before = camera.view();

        camera.orbit(0.5, 0.0);
        assert_eq!(camera.view(), before);

        camera.update();
        assert_ne!(camera.view(), before);
    }

    #[test]
    fn test_orbit_preserves_distance() {
        let mut camera = camera();
        let distance = camera.distance();

        for _ in 0..50 {
            camera.orbit(0.13, 0.07);
        }

        assert_relative_eq!(camera.distance(), distance, epsilon = 1e-3);
        assert_eq!(camera.target(), Vec3::ZERO);
    }

    #[test]
    fn test_orbit_over_pole_is_not_clamped() {
        let mut camera = camera();

        camera.orbit(0.0, std::f32::consts::PI);
        camera.update();

        // Half a turn of pitch lands behind the target, upside down
        assert_relative_eq!(camera.eye().z, -12.0, epsilon = 1e-3);
        assert_relative_eq!(camera.up().y, -1.0, epsilon = 1e-4);
        assert!(camera.view().is_finite());
    }

    #[test]
    fn test_pan_moves_eye_and_target_together() {
        let mut camera = camera();
        let offset = camera.eye() - camera.target();

        camera.pan(2.0, -1.0);

        assert_relative_eq!(camera.target().x, 2.0, epsilon = 1e-5);
        assert_relative_eq!(camera.target().y, -1.0, epsilon = 1e-5);
        let new_offset = camera.eye() - camera.target();
        assert!(new_offset.abs_diff_eq(offset, 1e-5));
    }

    #[test]
    fn test_zoom_scales_distance_and_stays_positive() {
        let mut camera = camera();

        camera.zoom(0.5);
        assert_relative_eq!(camera.distance(), 6.0, epsilon = 1e-4);

        for _ in 0..200 {
            camera.zoom(0.01);
        }
        assert!(camera.distance() > 0.0);

        camera.zoom(0.0);
        assert!(camera.distance() > 0.0);
    }
}
