//! Audio output stream plus on-demand spectrum analysis.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::analyser::{Analyser, SampleTap};
use super::player::{Player, Source, Synth, Track};
use super::synthesis::build_engine;
use super::AmplitudeSource;
use crate::error::{Error, Result};
use crate::params::{AnalyserConfig, PlaybackConfig};

/// Audio system managing playback and amplitude analysis
pub struct AudioSystem {
    /// Playback state (shared with the device callback)
    player: Arc<Mutex<Player>>,

    /// Latest output samples (written by the device callback)
    tap: Arc<Mutex<SampleTap>>,

    analyser: Analyser,
    scratch: Vec<f32>,

    /// Audio output stream (kept alive)
    _stream: cpal::Stream,
}

impl AudioSystem {
    /// Open the default output device and start looping playback
    pub fn new(playback: &PlaybackConfig, analyser_config: AnalyserConfig) -> Result<Self> {
        let analyser = Analyser::new(analyser_config).map_err(Error::Config)?;

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no audio output device found".to_string()))?;

        let config = device
            .default_output_config()
            .map_err(|e| Error::Audio(format!("failed to get output config: {}", e)))?;
        if config.sample_format() != cpal::SampleFormat::F32 {
            return Err(Error::Audio(format!(
                "unsupported output sample format {:?}",
                config.sample_format()
            )));
        }

        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;

        log::info!(
            "Audio: {} @ {}Hz, {} ch",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate,
            channels
        );

        let source = match &playback.track {
            Some(path) => {
                let track = Track::open(path, sample_rate)?;
                log::info!("Looping {} ({} frames)", path.display(), track.len());
                Source::Track(track)
            }
            None => {
                log::info!("No track given, playing built-in composition");
                let engine = build_engine(sample_rate as usize).map_err(Error::Audio)?;
                Source::Synth(Box::new(Synth::new(engine)))
            }
        };

        let player = Arc::new(Mutex::new(Player::new(
            source,
            playback.volume,
            playback.paused,
        )));
        let tap = Arc::new(Mutex::new(SampleTap::new(analyser.config().fft_size)));

        let player_cb = Arc::clone(&player);
        let tap_cb = Arc::clone(&tap);

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut player = lock(&player_cb);
                    let mut tap = lock(&tap_cb);
                    player.fill(data, channels, &mut tap);
                },
                |err| log::warn!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| Error::Audio(format!("failed to build output stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| Error::Audio(format!("failed to start output stream: {}", e)))?;

        Ok(Self {
            player,
            tap,
            scratch: Vec::with_capacity(analyser.config().fft_size),
            analyser,
            _stream: stream,
        })
    }

    pub fn set_volume(&self, volume: f32) {
        lock(&self.player).set_volume(volume);
    }

    pub fn set_paused(&self, paused: bool) {
        lock(&self.player).set_paused(paused);
    }
}

impl AmplitudeSource for AudioSystem {
    fn sample_amplitude(&mut self) -> f32 {
        lock(&self.tap).snapshot_into(&mut self.scratch);
        self.analyser.average(&self.scratch)
    }
}

/// Lock, ignoring poison from a panicked callback
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
