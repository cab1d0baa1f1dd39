//! Audio playback and spectrum analysis parameters.

/// Audio engine constants
pub mod audio_constants {
    /// Glicol engine block size (samples per block)
    pub const BLOCK_SIZE: usize = 128;

    /// Output gain ceiling applied after volume
    pub const CLIP_LEVEL: f32 = 0.9;
}

/// Spectrum analyser configuration (Web Audio `AnalyserNode` semantics)
#[derive(Debug, Clone)]
pub struct AnalyserConfig {
    /// FFT window size (must be power of 2)
    /// Yields `fft_size / 2` frequency bins
    pub fft_size: usize,

    /// Temporal smoothing between successive analyses (0 = none, <1)
    pub smoothing: f32,

    /// Level mapped to byte 0 (decibels)
    pub min_decibels: f32,

    /// Level mapped to byte 255 (decibels)
    pub max_decibels: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 256,
            smoothing: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyserConfig {
    /// Number of frequency bins reported
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), String> {
        if !self.fft_size.is_power_of_two() || self.fft_size < 32 {
            return Err(format!(
                "FFT size must be a power of 2 and at least 32, got {}",
                self.fft_size
            ));
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(format!("Smoothing must be in [0, 1), got {}", self.smoothing));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(format!(
                "Decibel range is empty: [{}, {}]",
                self.min_decibels, self.max_decibels
            ));
        }
        Ok(())
    }
}

/// Playback configuration
#[derive(Debug, Clone, Default)]
pub struct PlaybackConfig {
    /// WAV file to loop; `None` plays the built-in composition
    pub track: Option<std::path::PathBuf>,

    /// Initial volume (0–1)
    pub volume: f32,

    /// Start paused
    pub paused: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_analyser_matches_web_audio() {
        let config = AnalyserConfig::default();
        assert_eq!(config.bin_count(), 128);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_fft_size() {
        let config = AnalyserConfig {
            fft_size: 300,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let config = AnalyserConfig {
            min_decibels: -20.0,
            max_decibels: -30.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
