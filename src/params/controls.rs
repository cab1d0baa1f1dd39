//! Live control values and the commands that change them.

use glam::Vec4;

/// Inclusive slider bounds with a step size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl SliderRange {
    pub const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Move `steps` increments from `value`, snapped to the step grid
    pub fn step_by(&self, value: f32, steps: i32) -> f32 {
        let index = ((value - self.min) / self.step).round() + steps as f32;
        self.clamp(self.min + index * self.step)
    }
}

/// Subdivision level (integer steps)
pub const TESSELLATION_RANGE: SliderRange = SliderRange::new(0.0, 8.0, 1.0);

/// Displacement amplitude multiplier
pub const AMPLITUDE_RANGE: SliderRange = SliderRange::new(0.1, 10.0, 0.1);

/// Parabola exponent fed to the `impulse` uniform
pub const PARABOLA_RANGE: SliderRange = SliderRange::new(1.0, 200.0, 0.5);

/// Spatial frequency of the fbm layers
pub const FREQ_FBM_RANGE: SliderRange = SliderRange::new(1.0, 15.0, 0.1);

/// Playback volume
pub const VOLUME_RANGE: SliderRange = SliderRange::new(0.0, 1.0, 0.01);

/// Base colors cycled by [`Command::CyclePalette`] (RGB 0–255)
pub const PALETTES: [[u8; 3]; 5] = [
    [255, 112, 67],
    [64, 160, 255],
    [120, 255, 170],
    [250, 220, 90],
    [0, 0, 0],
];

/// Control-surface actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    LoadScene,
    Reset,
    TogglePause,
    ToggleVisualize,
    /// Tessellation up (+1) or down (-1)
    StepTessellation(i32),
    StepAmplitude(i32),
    StepParabola(i32),
    StepFreqFbm(i32),
    StepVolume(i32),
    CyclePalette,
    Quit,
}

/// What the application has to do after a command is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Only control values changed; the next frame picks them up
    None,
    /// Rebuild every mesh
    ReloadScene,
    /// Push volume and pause state to the audio system
    SyncAudio,
    /// Push the volume and resume playback where it left off
    ResumeAudio,
    Quit,
}

/// Flat record of everything the control surface can change
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    pub tessellation: u32,
    pub amplitude: f32,
    pub parabola: f32,
    pub freq_fbm: f32,
    pub pause: bool,
    pub visualize: bool,
    pub volume: f32,
    /// Base geometry color (RGB 0–255)
    pub color: [u8; 3],
    palette: usize,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            tessellation: 5,
            amplitude: 1.0,
            parabola: 40.0,
            freq_fbm: 5.0,
            pause: false,
            visualize: true,
            volume: 0.5,
            color: PALETTES[0],
            palette: 0,
        }
    }
}

impl Controls {
    /// Restore every slider and toggle; the color is kept
    pub fn reset(&mut self) {
        let color = self.color;
        let palette = self.palette;
        *self = Self {
            color,
            palette,
            ..Self::default()
        };
    }

    /// Clamp every value into its slider range
    pub fn clamped(mut self) -> Self {
        self.tessellation = TESSELLATION_RANGE.clamp(self.tessellation as f32) as u32;
        self.amplitude = AMPLITUDE_RANGE.clamp(self.amplitude);
        self.parabola = PARABOLA_RANGE.clamp(self.parabola);
        self.freq_fbm = FREQ_FBM_RANGE.clamp(self.freq_fbm);
        self.volume = VOLUME_RANGE.clamp(self.volume);
        self
    }

    pub fn apply(&mut self, command: Command) -> Effect {
        match command {
            Command::LoadScene => return Effect::ReloadScene,
            Command::Reset => {
                self.reset();
                return Effect::ResumeAudio;
            }
            Command::TogglePause => {
                self.pause = !self.pause;
                return Effect::SyncAudio;
            }
            Command::ToggleVisualize => self.visualize = !self.visualize,
            Command::StepTessellation(steps) => {
                self.tessellation =
                    TESSELLATION_RANGE.step_by(self.tessellation as f32, steps) as u32;
            }
            Command::StepAmplitude(steps) => {
                self.amplitude = AMPLITUDE_RANGE.step_by(self.amplitude, steps);
            }
            Command::StepParabola(steps) => {
                self.parabola = PARABOLA_RANGE.step_by(self.parabola, steps);
            }
            Command::StepFreqFbm(steps) => {
                self.freq_fbm = FREQ_FBM_RANGE.step_by(self.freq_fbm, steps);
            }
            Command::StepVolume(steps) => {
                self.volume = VOLUME_RANGE.step_by(self.volume, steps);
                return Effect::SyncAudio;
            }
            Command::CyclePalette => {
                self.palette = (self.palette + 1) % PALETTES.len();
                self.color = PALETTES[self.palette];
            }
            Command::Quit => return Effect::Quit,
        }
        Effect::None
    }

    /// Base color as normalized RGBA with alpha 1
    pub fn color_vec4(&self) -> Vec4 {
        let [r, g, b] = self.color;
        Vec4::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let c = Controls::default();
        assert_eq!(c.tessellation, 5);
        assert_eq!(c.amplitude, 1.0);
        assert_eq!(c.parabola, 40.0);
        assert_eq!(c.freq_fbm, 5.0);
        assert!(!c.pause);
        assert!(c.visualize);
        assert_eq!(c.volume, 0.5);
    }

    #[test]
    fn test_tessellation_clamps_to_range() {
        let mut c = Controls::default();
        for _ in 0..20 {
            c.apply(Command::StepTessellation(1));
        }
        assert_eq!(c.tessellation, 8);
        for _ in 0..20 {
            c.apply(Command::StepTessellation(-1));
        }
        assert_eq!(c.tessellation, 0);
    }

    #[test]
    fn test_steps_snap_to_grid() {
        let mut c = Controls::default();
        c.apply(Command::StepAmplitude(1));
        c.apply(Command::StepAmplitude(1));
        assert_relative_eq!(c.amplitude, 1.2, epsilon = 1e-5);

        c.apply(Command::StepParabola(-1));
        assert_relative_eq!(c.parabola, 39.5, epsilon = 1e-4);

        c.amplitude = 0.1;
        c.apply(Command::StepAmplitude(-1));
        assert_relative_eq!(c.amplitude, 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_volume_step_syncs_audio() {
        let mut c = Controls::default();
        assert_eq!(c.apply(Command::StepVolume(1)), Effect::SyncAudio);
        assert_relative_eq!(c.volume, 0.51, epsilon = 1e-5);
        c.volume = 1.0;
        c.apply(Command::StepVolume(1));
        assert_eq!(c.volume, 1.0);
    }

    #[test]
    fn test_reset_restores_defaults_but_keeps_color() {
        let mut c = Controls::default();
        c.apply(Command::CyclePalette);
        c.apply(Command::TogglePause);
        c.apply(Command::ToggleVisualize);
        c.apply(Command::StepTessellation(-2));
        c.apply(Command::StepFreqFbm(10));
        let color = c.color;

        assert_eq!(c.apply(Command::Reset), Effect::ResumeAudio);
        assert_eq!(c.color, color);
        assert_eq!(c.tessellation, 5);
        assert!(!c.pause);
        assert!(c.visualize);
        assert_eq!(c.freq_fbm, 5.0);
    }

    #[test]
    fn test_palette_cycles_and_wraps() {
        let mut c = Controls::default();
        for i in 1..=PALETTES.len() {
            c.apply(Command::CyclePalette);
            assert_eq!(c.color, PALETTES[i % PALETTES.len()]);
        }
    }

    #[test]
    fn test_effects() {
        let mut c = Controls::default();
        assert_eq!(c.apply(Command::LoadScene), Effect::ReloadScene);
        assert_eq!(c.apply(Command::TogglePause), Effect::SyncAudio);
        assert!(c.pause);
        assert_eq!(c.apply(Command::ToggleVisualize), Effect::None);
        assert_eq!(c.apply(Command::Quit), Effect::Quit);
    }

    #[test]
    fn test_clamped_pulls_overrides_into_range() {
        let c = Controls {
            tessellation: 12,
            amplitude: 0.0,
            volume: 3.0,
            ..Controls::default()
        }
        .clamped();
        assert_eq!(c.tessellation, 8);
        assert_eq!(c.amplitude, 0.1);
        assert_eq!(c.volume, 1.0);
    }

    #[test]
    fn test_color_vec4_normalizes() {
        let mut c = Controls::default();
        c.color = [255, 0, 51];
        let v = c.color_vec4();
        assert_relative_eq!(v.x, 1.0);
        assert_relative_eq!(v.y, 0.0);
        assert_relative_eq!(v.z, 0.2, epsilon = 1e-6);
        assert_eq!(v.w, 1.0);
    }
}
