//! Frame timing
//!
//! Keeps the raw frame delta for the interpolator (which treats oversized
//! frames as a desync signal) and a clamped delta for the motion integrator.

use std::time::Duration;

/// Per-step clock
#[derive(Debug, Clone)]
pub struct FrameClock {
    max_delta: f32,
    raw_delta: f32,
    delta: f32,
    elapsed: f64,
    frame_count: u64,
}

impl FrameClock {
    /// Create a clock that clamps deltas to `max_delta` seconds
    #[must_use]
    pub fn new(max_delta: f32) -> Self {
        Self {
            max_delta,
            raw_delta: 0.0,
            delta: 0.0,
            elapsed: 0.0,
            frame_count: 0,
        }
    }

    /// Record a frame of `raw_delta` seconds; negative and NaN deltas count as 0
    pub fn tick(&mut self, raw_delta: f32) {
        let raw = if raw_delta.is_finite() { raw_delta.max(0.0) } else { 0.0 };
        self.raw_delta = raw;
        self.delta = raw.min(self.max_delta);
        self.elapsed += f64::from(raw);
        self.frame_count += 1;
    }

    /// Record a frame measured as a [`Duration`]
    pub fn tick_duration(&mut self, delta: Duration) {
        self.tick(delta.as_secs_f32());
    }

    /// Delta safe to integrate
    #[must_use]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Delta as measured, possibly huge after a suspend
    #[must_use]
    pub fn raw_delta(&self) -> f32 {
        self.raw_delta
    }

    /// Whether the last frame exceeded the clamp
    #[must_use]
    pub fn was_clamped(&self) -> bool {
        self.raw_delta > self.delta
    }

    /// Seconds since creation, unclamped
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Frames recorded
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
