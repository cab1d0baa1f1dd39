//! Looping playback of a decoded track or the synth fallback.

use std::io::Read;
use std::path::Path;

use glicol::Engine;

use super::analyser::SampleTap;
use crate::error::{Error, Result};
use crate::params::audio_constants::{BLOCK_SIZE, CLIP_LEVEL};

/// Stereo frame
type Frame = [f32; 2];

/// Decoded PCM resampled to the device rate
#[derive(Debug, Clone)]
pub struct Track {
    frames: Vec<Frame>,
    position: usize,
}

impl Track {
    /// Decode a WAV file for playback at `target_rate`
    pub fn open(path: &Path, target_rate: u32) -> Result<Self> {
        let to_error = |source| Error::Track {
            path: path.to_path_buf(),
            source,
        };
        let reader = hound::WavReader::open(path).map_err(to_error)?;
        Self::decode(reader, target_rate).map_err(to_error)
    }

    /// Decode any WAV stream (integer or float PCM, any channel count)
    pub fn decode<R: Read>(
        reader: hound::WavReader<R>,
        target_rate: u32,
    ) -> std::result::Result<Self, hound::Error> {
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1_i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        let frames: Vec<Frame> = samples
            .chunks_exact(channels)
            .map(|c| if channels == 1 { [c[0], c[0]] } else { [c[0], c[1]] })
            .collect();

        log::debug!(
            "Decoded {} frames ({} ch, {} Hz, {} bit)",
            frames.len(),
            spec.channels,
            spec.sample_rate,
            spec.bits_per_sample
        );

        Ok(Self {
            frames: resample(&frames, spec.sample_rate, target_rate),
            position: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn next_frame(&mut self) -> Frame {
        if self.frames.is_empty() {
            return [0.0; 2];
        }
        let frame = self.frames[self.position];
        self.position = (self.position + 1) % self.frames.len();
        frame
    }
}

/// Linear-interpolation rate conversion
fn resample(frames: &[Frame], from: u32, to: u32) -> Vec<Frame> {
    if from == to || from == 0 || to == 0 || frames.len() < 2 {
        return frames.to_vec();
    }

    let ratio = from as f64 / to as f64;
    let out_len = ((frames.len() as f64) / ratio).floor() as usize;
    (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = pos as usize;
            let frac = (pos - idx as f64) as f32;
            let a = frames[idx];
            let b = frames[(idx + 1).min(frames.len() - 1)];
            [a[0] + (b[0] - a[0]) * frac, a[1] + (b[1] - a[1]) * frac]
        })
        .collect()
}

/// Glicol engine output, buffered one block at a time
pub struct Synth {
    engine: Engine<BLOCK_SIZE>,
    block: [Frame; BLOCK_SIZE],
    cursor: usize,
}

impl Synth {
    pub fn new(engine: Engine<BLOCK_SIZE>) -> Self {
        Self {
            engine,
            block: [[0.0; 2]; BLOCK_SIZE],
            cursor: BLOCK_SIZE,
        }
    }

    fn next_frame(&mut self) -> Frame {
        if self.cursor == BLOCK_SIZE {
            let (buffers, _) = self.engine.next_block(vec![]);
            for (i, frame) in self.block.iter_mut().enumerate() {
                let left = buffers[0][i];
                let right = if buffers.len() > 1 { buffers[1][i] } else { left };
                *frame = [left, right];
            }
            self.cursor = 0;
        }
        let frame = self.block[self.cursor];
        self.cursor += 1;
        frame
    }
}

pub enum Source {
    Track(Track),
    Synth(Box<Synth>),
}

impl Source {
    fn next_frame(&mut self) -> Frame {
        match self {
            Self::Track(track) => track.next_frame(),
            Self::Synth(synth) => synth.next_frame(),
        }
    }
}

/// Playback state shared with the device callback
pub struct Player {
    source: Source,
    volume: f32,
    paused: bool,
}

impl Player {
    pub fn new(source: Source, volume: f32, paused: bool) -> Self {
        Self {
            source,
            volume: volume.clamp(0.0, 1.0),
            paused,
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Fill an interleaved output buffer and feed the analysis tap
    ///
    /// Paused playback writes silence and leaves the source where it is.
    pub fn fill(&mut self, out: &mut [f32], channels: usize, tap: &mut SampleTap) {
        let channels = channels.max(1);
        for frame in out.chunks_mut(channels) {
            let [left, right] = if self.paused {
                [0.0; 2]
            } else {
                let [l, r] = self.source.next_frame();
                [
                    (l * self.volume).clamp(-CLIP_LEVEL, CLIP_LEVEL),
                    (r * self.volume).clamp(-CLIP_LEVEL, CLIP_LEVEL),
                ]
            };
            let mono = 0.5 * (left + right);

            match frame {
                [only] => *only = mono,
                [l, r, rest @ ..] => {
                    *l = left;
                    *r = right;
                    rest.fill(0.0);
                }
                [] => {}
            }
            tap.push(mono);
        }
    }
}
