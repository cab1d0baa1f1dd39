//! Audio playback and amplitude analysis.
//!
//! Plays a looping WAV track (or a Glicol composition) through cpal and
//! reports the average byte frequency level of what is being played.

mod analyser;
mod player;
mod synthesis;
mod system;

pub use analyser::{Analyser, SampleTap};
pub use player::{Player, Source, Synth, Track};
pub use synthesis::{build_engine, GLICOL_COMPOSITION};
pub use system::AudioSystem;

/// Something the frame driver can ask for the current loudness
pub trait AmplitudeSource {
    /// Average byte frequency level in [0, 255]
    fn sample_amplitude(&mut self) -> f32;
}

/// Source used when no audio device is available
#[derive(Debug, Clone, Copy, Default)]
pub struct Silence;

impl AmplitudeSource for Silence {
    fn sample_amplitude(&mut self) -> f32 {
        0.0
    }
}

/// Fixed amplitude, for tests and headless runs
#[derive(Debug, Clone, Copy)]
pub struct Constant(pub f32);

impl AmplitudeSource for Constant {
    fn sample_amplitude(&mut self) -> f32 {
        self.0
    }
}

impl<T: AmplitudeSource + ?Sized> AmplitudeSource for Box<T> {
    fn sample_amplitude(&mut self) -> f32 {
        (**self).sample_amplitude()
    }
}
