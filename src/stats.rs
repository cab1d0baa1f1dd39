//! Frame-rate reporting through the logger.

/// Counts frames and reports the rate once per interval
#[derive(Debug, Clone)]
pub struct FrameStats {
    interval_ms: f64,
    window_start_ms: Option<f64>,
    frames: u32,
}

impl FrameStats {
    /// `interval_s` of 0 disables reporting
    pub fn new(interval_s: f32) -> Self {
        Self {
            interval_ms: interval_s as f64 * 1000.0,
            window_start_ms: None,
            frames: 0,
        }
    }

    /// Count a frame; returns frames per second when an interval completes
    pub fn record(&mut self, timestamp_ms: f64) -> Option<f32> {
        if self.interval_ms <= 0.0 {
            return None;
        }

        let start = *self.window_start_ms.get_or_insert(timestamp_ms);
        self.frames += 1;

        let elapsed = timestamp_ms - start;
        if elapsed < self.interval_ms {
            return None;
        }

        let fps = (self.frames as f64 * 1000.0 / elapsed) as f32;
        log::info!("{:.1} fps ({} frames in {:.1}s)", fps, self.frames, elapsed / 1000.0);
        self.window_start_ms = Some(timestamp_ms);
        self.frames = 0;
        Some(fps)
    }
}
