//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::error::{Error, Result};
use crate::params::{CameraConfig, Controls, PlaybackConfig, RenderConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Sonosphere")]
#[command(about = "Audio-reactive icosphere demo", long_about = None)]
pub struct Args {
    /// WAV file to loop (plays a built-in synth loop when omitted)
    #[arg(long, value_name = "PATH")]
    pub audio: Option<PathBuf>,

    /// Window width (pixels)
    #[arg(long, value_name = "PIXELS", default_value = "1280")]
    pub width: u32,

    /// Window height (pixels)
    #[arg(long, value_name = "PIXELS", default_value = "720")]
    pub height: u32,

    /// Initial subdivision level (0-8)
    #[arg(long, value_name = "LEVEL")]
    pub tessellation: Option<u32>,

    /// Initial displacement amplitude (0.1-10)
    #[arg(long)]
    pub amplitude: Option<f32>,

    /// Initial parabola exponent (1-200)
    #[arg(long)]
    pub parabola: Option<f32>,

    /// Initial fbm frequency (1-15)
    #[arg(long)]
    pub freq_fbm: Option<f32>,

    /// Initial volume (0-1)
    #[arg(long)]
    pub volume: Option<f32>,

    /// Base color as RRGGBB hex
    #[arg(long, value_name = "HEX")]
    pub color: Option<String>,

    /// Start paused
    #[arg(long)]
    pub paused: bool,

    /// Start with audio visualization off
    #[arg(long)]
    pub no_visualize: bool,

    /// Camera distance from the icosphere
    #[arg(long, value_name = "UNITS")]
    pub distance: Option<f32>,
}

impl Args {
    /// Initial controls with overrides applied and clamped
    pub fn controls(&self) -> Result<Controls> {
        let mut controls = Controls::default();
        if let Some(v) = self.tessellation {
            controls.tessellation = v;
        }
        if let Some(v) = self.amplitude {
            controls.amplitude = v;
        }
        if let Some(v) = self.parabola {
            controls.parabola = v;
        }
        if let Some(v) = self.freq_fbm {
            controls.freq_fbm = v;
        }
        if let Some(v) = self.volume {
            controls.volume = v;
        }
        if let Some(hex) = &self.color {
            controls.color = parse_color(hex)?;
        }
        controls.pause = self.paused;
        controls.visualize = !self.no_visualize;
        Ok(controls.clamped())
    }

    pub fn render_config(&self) -> Result<RenderConfig> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Config(format!(
                "window size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(RenderConfig {
            window_width: self.width,
            window_height: self.height,
            ..RenderConfig::default()
        })
    }

    pub fn camera_config(&self) -> Result<CameraConfig> {
        let mut config = CameraConfig::default();
        if let Some(distance) = self.distance {
            if !(distance.is_finite() && distance > 0.0) {
                return Err(Error::Config(format!(
                    "camera distance must be positive, got {}",
                    distance
                )));
            }
            config.eye = config.target + (config.eye - config.target).normalize() * distance;
        }
        Ok(config)
    }

    pub fn playback_config(&self, controls: &Controls) -> PlaybackConfig {
        PlaybackConfig {
            track: self.audio.clone(),
            volume: controls.volume,
            paused: controls.pause,
        }
    }
}

/// Parse `RRGGBB` (with or without a leading `#`)
fn parse_color(hex: &str) -> Result<[u8; 3]> {
    let digits = hex.trim_start_matches('#');
    let invalid = || Error::Config(format!("color must be RRGGBB hex, got '{}'", hex));
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(std::iter::once("sonosphere").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults_match_controls() {
        let args = parse(&[]);
        assert_eq!(args.controls().unwrap(), Controls::default());
        assert_eq!(args.render_config().unwrap().window_width, 1280);
    }

    #[test]
    fn test_overrides_are_clamped() {
        let args = parse(&["--tessellation", "11", "--volume", "0.2", "--paused"]);
        let controls = args.controls().unwrap();
        assert_eq!(controls.tessellation, 8);
        assert_eq!(controls.volume, 0.2);
        assert!(controls.pause);
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ff8000").unwrap(), [255, 128, 0]);
        assert_eq!(parse_color("0a0B0c").unwrap(), [10, 11, 12]);
        assert!(parse_color("fff").is_err());
        assert!(parse_color("zzzzzz").is_err());
    }

    #[test]
    fn test_distance_override() {
        let args = parse(&["--distance", "40"]);
        let config = args.camera_config().unwrap();
        assert!((config.eye.length() - 40.0).abs() < 1e-4);

        assert!(parse(&["--distance", "0"]).camera_config().is_err());
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(parse(&["--width", "0"]).render_config().is_err());
    }
}
