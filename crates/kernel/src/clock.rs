use std::time::Instant;

/// Upper bound on a frame's delta time, in seconds.
pub const MAX_FRAME_DELTA: f32 = 1.0;

/// Lower bound on a frame's delta time, so behaviours always see a positive step.
pub const MIN_FRAME_DELTA: f32 = 1.0e-6;

/// Clamp a measured frame gap into `(0, MAX_FRAME_DELTA]`.
pub fn clamp_delta(raw: f32) -> f32 {
    if raw.is_nan() || raw < MIN_FRAME_DELTA {
        MIN_FRAME_DELTA
    } else {
        raw.min(MAX_FRAME_DELTA)
    }
}

/// Measures the gap between frames.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frames: u64,
}

impl FrameClock {
    pub fn new(now: Instant) -> Self {
        Self { last: now, frames: 0 }
    }

    /// Clamped seconds since the previous tick.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let raw = now.saturating_duration_since(self.last).as_secs_f32();
        self.last = now;
        self.frames += 1;
        clamp_delta(raw)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn stalls_are_clamped_to_one_second() {
        let start = Instant::now();
        let mut clock = FrameClock::new(start);
        assert_eq!(clock.tick(start + Duration::from_secs(5)), 1.0);
        assert_eq!(clock.frames(), 1);
    }

    #[test]
    fn zero_gap_stays_positive() {
        let start = Instant::now();
        let mut clock = FrameClock::new(start);
        assert!(clock.tick(start) > 0.0);
        // going backwards saturates instead of panicking
        assert!(clock.tick(start) > 0.0);
    }

    #[test]
    fn ordinary_frames_pass_through() {
        let start = Instant::now();
        let mut clock = FrameClock::new(start);
        let dt = clock.tick(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn clamp_handles_non_finite() {
        assert_eq!(clamp_delta(f32::INFINITY), MAX_FRAME_DELTA);
        assert_eq!(clamp_delta(f32::NAN), MIN_FRAME_DELTA);
        assert_eq!(clamp_delta(-3.0), MIN_FRAME_DELTA);
    }
}
