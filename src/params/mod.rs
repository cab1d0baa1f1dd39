//! Parameter definitions with units and documented ranges.
//!
//! Every tunable number lives here with:
//! - Units (pixels, degrees, seconds, decibels)
//! - Documented ranges and meanings
//! - A `Default` impl matching the demo's startup state

mod audio;
mod controls;
mod render;

// Re-export all types
pub use audio::{audio_constants, AnalyserConfig, PlaybackConfig};
pub use controls::{
    Command, Controls, Effect, SliderRange, AMPLITUDE_RANGE, FREQ_FBM_RANGE, PALETTES,
    PARABOLA_RANGE, TESSELLATION_RANGE, VOLUME_RANGE,
};
pub use render::{CameraConfig, RenderConfig};
