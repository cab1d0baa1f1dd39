//! Keyboard and mouse bindings.

use winit::event::{MouseButton, MouseScrollDelta};
use winit::keyboard::KeyCode;

use crate::camera::Camera;
use crate::params::{CameraConfig, Command};

/// Pixels per wheel line for trackpad-style deltas
const PIXELS_PER_LINE: f32 = 40.0;

/// Command bound to a pressed key
pub fn command_for_key(key: KeyCode) -> Option<Command> {
    let command = match key {
        KeyCode::KeyL => Command::LoadScene,
        KeyCode::KeyR => Command::Reset,
        KeyCode::Space => Command::TogglePause,
        KeyCode::KeyV => Command::ToggleVisualize,
        KeyCode::ArrowUp => Command::StepTessellation(1),
        KeyCode::ArrowDown => Command::StepTessellation(-1),
        KeyCode::KeyA => Command::StepAmplitude(1),
        KeyCode::KeyZ => Command::StepAmplitude(-1),
        KeyCode::KeyP => Command::StepParabola(1),
        KeyCode::KeyO => Command::StepParabola(-1),
        KeyCode::KeyF => Command::StepFreqFbm(1),
        KeyCode::KeyG => Command::StepFreqFbm(-1),
        KeyCode::Equal | KeyCode::NumpadAdd => Command::StepVolume(1),
        KeyCode::Minus | KeyCode::NumpadSubtract => Command::StepVolume(-1),
        KeyCode::KeyC => Command::CyclePalette,
        KeyCode::Escape => Command::Quit,
        _ => return None,
    };
    Some(command)
}

/// Camera change requested by the mouse
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraMotion {
    /// Radians about up / right
    Orbit { yaw: f32, pitch: f32 },
    /// World units along the view plane
    Pan { right: f32, up: f32 },
    /// Distance multiplier
    Zoom(f32),
}

impl CameraMotion {
    pub fn apply(self, camera: &mut Camera) {
        match self {
            Self::Orbit { yaw, pitch } => camera.orbit(yaw, pitch),
            Self::Pan { right, up } => camera.pan(right, up),
            Self::Zoom(factor) => camera.zoom(factor),
        }
    }
}

/// Drag tracking: left button orbits, right button pans
#[derive(Debug, Default)]
pub struct MouseState {
    left: bool,
    right: bool,
    last_pos: Option<(f64, f64)>,
}

impl MouseState {
    pub fn button(&mut self, button: MouseButton, pressed: bool) {
        match button {
            MouseButton::Left => self.left = pressed,
            MouseButton::Right => self.right = pressed,
            _ => {}
        }
    }

    /// Cursor moved to `(x, y)`; `distance` is the current eye-target distance
    pub fn moved(
        &mut self,
        x: f64,
        y: f64,
        config: &CameraConfig,
        distance: f32,
    ) -> Option<CameraMotion> {
        let last = self.last_pos.replace((x, y))?;
        let dx = (x - last.0) as f32;
        let dy = (y - last.1) as f32;

        if self.left {
            Some(CameraMotion::Orbit {
                yaw: dx * config.orbit_speed,
                pitch: dy * config.orbit_speed,
            })
        } else if self.right {
            let scale = distance * config.pan_speed;
            Some(CameraMotion::Pan {
                right: -dx * scale,
                up: dy * scale,
            })
        } else {
            None
        }
    }
}

/// Wheel up zooms in
pub fn wheel_zoom(delta: MouseScrollDelta, config: &CameraConfig) -> CameraMotion {
    let lines = match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
    };
    CameraMotion::Zoom((1.0 - config.zoom_step).powf(lines))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(command_for_key(KeyCode::Space), Some(Command::TogglePause));
        assert_eq!(command_for_key(KeyCode::ArrowUp), Some(Command::StepTessellation(1)));
        assert_eq!(command_for_key(KeyCode::Minus), Some(Command::StepVolume(-1)));
        assert_eq!(command_for_key(KeyCode::Escape), Some(Command::Quit));
        assert_eq!(command_for_key(KeyCode::KeyQ), None);
    }

    #[test]
    fn test_first_move_only_records_position() {
        let mut mouse = MouseState::default();
        mouse.button(MouseButton::Left, true);
        assert_eq!(mouse.moved(10.0, 10.0, &CameraConfig::default(), 1.0), None);
    }

    #[test]
    fn test_left_drag_orbits() {
        let config = CameraConfig::default();
        let mut mouse = MouseState::default();
        mouse.moved(0.0, 0.0, &config, 1.0);
        mouse.button(MouseButton::Left, true);

        let motion = mouse.moved(100.0, -20.0, &config, 1.0);
        assert_eq!(
            motion,
            Some(CameraMotion::Orbit {
                yaw: 100.0 * config.orbit_speed,
                pitch: -20.0 * config.orbit_speed,
            })
        );
    }

    #[test]
    fn test_right_drag_pans_and_release_stops() {
        let config = CameraConfig::default();
        let mut mouse = MouseState::default();
        mouse.moved(0.0, 0.0, &config, 10.0);
        mouse.button(MouseButton::Right, true);
        assert!(matches!(
            mouse.moved(5.0, 5.0, &config, 10.0),
            Some(CameraMotion::Pan { .. })
        ));

        mouse.button(MouseButton::Right, false);
        assert_eq!(mouse.moved(6.0, 6.0, &config, 10.0), None);
    }

    #[test]
    fn test_wheel_up_zooms_in() {
        let config = CameraConfig::default();
        match wheel_zoom(MouseScrollDelta::LineDelta(0.0, 1.0), &config) {
            CameraMotion::Zoom(f) => assert!(f < 1.0 && f > 0.0),
            other => panic!("unexpected motion {:?}", other),
        }
    }
}
