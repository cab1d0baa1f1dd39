//! Frame time with a pause freeze.

/// Elapsed-time clock that freezes while paused
///
/// Time is seconds since the first timestamp seen. Entering the paused state
/// captures the current time once; every paused frame after that reuses the
/// capture until a running frame clears it.
#[derive(Debug, Clone, Default)]
pub struct PauseClock {
    origin_ms: Option<f64>,
    frozen: Option<f32>,
}

impl PauseClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time in seconds for a frame at `timestamp_ms`
    pub fn tick(&mut self, timestamp_ms: f64, paused: bool) -> f32 {
        let origin = *self.origin_ms.get_or_insert(timestamp_ms);
        let now = ((timestamp_ms - origin) / 1000.0) as f32;

        if paused {
            *self.frozen.get_or_insert(now)
        } else {
            self.frozen = None;
            now
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_starts_at_zero() {
        let mut clock = PauseClock::new();
        assert_eq!(clock.tick(5_000.0, false), 0.0);
        assert_eq!(clock.tick(6_500.0, false), 1.5);
    }

    #[test]
    fn test_pause_captures_once() {
        let mut clock = PauseClock::new();
        clock.tick(0.0, false);
        clock.tick(1_000.0, false);

        let frozen = clock.tick(2_000.0, true);
        assert_eq!(frozen, 2.0);
        for ts in [3_000.0, 10_000.0, 99_000.0] {
            assert_eq!(clock.tick(ts, true), frozen);
        }
        assert!(clock.is_frozen());
    }

    #[test]
    fn test_resume_follows_wall_clock() {
        let mut clock = PauseClock::new();
        clock.tick(0.0, false);
        clock.tick(1_000.0, true);
        clock.tick(4_000.0, true);

        assert_eq!(clock.tick(5_000.0, false), 5.0);
        assert!(!clock.is_frozen());

        // A second pause captures afresh
        assert_eq!(clock.tick(6_000.0, true), 6.0);
    }

    #[test]
    fn test_paused_first_frame() {
        let mut clock = PauseClock::new();
        assert_eq!(clock.tick(1_234.0, true), 0.0);
        assert_eq!(clock.tick(9_999.0, true), 0.0);
    }
}
