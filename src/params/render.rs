//! Window, camera and frame presentation configuration.

use glam::Vec3;

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Framebuffer clear color (linear RGBA)
    pub clear_color: [f32; 4],

    /// Uniform scale applied to the cube drawn by the lambert program
    /// Large enough that the camera sits inside it
    pub cube_scale: f32,

    /// Icosphere radius (world units)
    pub icosphere_radius: f32,

    /// Constant passed as the shader `freq` uniform
    pub frequency: f32,

    /// Seconds between frame-rate log lines (0 disables)
    pub stats_interval_s: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            clear_color: [0.2, 0.2, 0.2, 1.0],
            cube_scale: 500.0,
            icosphere_radius: 1.0,
            frequency: 1.0,
            stats_interval_s: 5.0,
        }
    }
}

/// Camera lens and initial placement
#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// Initial eye position (world units)
    pub eye: Vec3,

    /// Initial look-at target (world units)
    pub target: Vec3,

    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane
    pub near_plane: f32,

    /// Far clipping plane
    /// Must exceed the cube's half extent so its walls stay visible
    pub far_plane: f32,

    /// Orbit speed (radians per pixel of drag)
    pub orbit_speed: f32,

    /// Pan speed (fraction of eye distance per pixel of drag)
    pub pan_speed: f32,

    /// Zoom factor per wheel line
    pub zoom_step: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 12.0),
            target: Vec3::ZERO,
            fov_degrees: 45.0,
            near_plane: 0.1,
            far_plane: 1000.0,
            orbit_speed: 0.005,
            pan_speed: 0.001,
            zoom_step: 0.1,
        }
    }
}
