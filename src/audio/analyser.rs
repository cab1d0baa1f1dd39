//! Spectrum analysis producing byte frequency data.
//!
//! Follows the Web Audio `AnalyserNode` definition: Blackman window, FFT
//! magnitude divided by the window size, exponential smoothing across calls,
//! then decibels mapped linearly onto 0–255.

use std::collections::VecDeque;
use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::params::AnalyserConfig;

/// Rolling window of the most recent mono samples sent to the device
#[derive(Debug, Clone)]
pub struct SampleTap {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl SampleTap {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::from(vec![0.0; capacity]),
            capacity,
        }
    }

    pub fn push(&mut self, sample: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Copy the window out, oldest sample first
    pub fn snapshot_into(&self, out: &mut Vec<f32>) {
        out.clear();
        out.extend(self.samples.iter().copied());
    }
}

/// Smoothed spectrum analyser
pub struct Analyser {
    config: AnalyserConfig,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    bytes: Vec<u8>,
}

impl Analyser {
    pub fn new(config: AnalyserConfig) -> Result<Self, String> {
        config.validate()?;

        let n = config.fft_size;
        let fft = FftPlanner::new().plan_fft_forward(n);
        let window = (0..n).map(|i| blackman_window(i, n)).collect();

        Ok(Self {
            fft,
            window,
            buffer: vec![Complex::new(0.0, 0.0); n],
            smoothed: vec![0.0; config.bin_count()],
            bytes: vec![0; config.bin_count()],
            config,
        })
    }

    pub fn config(&self) -> &AnalyserConfig {
        &self.config
    }

    /// Analyse the last `fft_size` samples and return one byte per bin
    ///
    /// Shorter input is zero-padded at the front.
    pub fn byte_frequency_data(&mut self, samples: &[f32]) -> &[u8] {
        let n = self.config.fft_size;
        let tail = &samples[samples.len().saturating_sub(n)..];
        let pad = n - tail.len();

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { tail[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }
        self.fft.process(&mut self.buffer);

        let tau = self.config.smoothing;
        let range = self.config.max_decibels - self.config.min_decibels;
        for (k, byte) in self.bytes.iter_mut().enumerate() {
            let magnitude = self.buffer[k].norm() / n as f32;
            let smoothed = tau * self.smoothed[k] + (1.0 - tau) * magnitude;
            self.smoothed[k] = if smoothed.is_finite() { smoothed } else { 0.0 };

            let db = 20.0 * self.smoothed[k].log10();
            let scaled = 255.0 * (db - self.config.min_decibels) / range;
            *byte = if scaled.is_nan() {
                0
            } else {
                scaled.clamp(0.0, 255.0) as u8
            };
        }

        &self.bytes
    }

    /// Mean of the byte frequency data, in [0, 255]
    pub fn average(&mut self, samples: &[f32]) -> f32 {
        let bytes = self.byte_frequency_data(samples);
        let sum: u32 = bytes.iter().map(|&b| b as u32).sum();
        sum as f32 / bytes.len() as f32
    }
}

/// Blackman window (alpha = 0.16) as used by Web Audio analysers
fn blackman_window(index: usize, size: usize) -> f32 {
    let x = index as f32 / size as f32;
    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
}
