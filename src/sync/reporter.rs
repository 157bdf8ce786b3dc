//! Throttled reporting of the local avatar's position
//!
//! The network layer flushes whatever this produces; no wire format lives
//! here.

use glam::Vec2;
use serde::Serialize;

use super::ReportingConfig;

/// Position update to hand to the network layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionReport {
    /// World x
    pub x: f32,
    /// World z
    pub z: f32,
    /// Monotonic sequence number, starting at 1
    pub seq: u64,
}

/// Emits at most one report per interval, and only after real movement
#[derive(Debug, Clone)]
pub struct PositionReporter {
    config: ReportingConfig,
    last_sent: Vec2,
    since_last: f32,
    seq: u64,
}

impl PositionReporter {
    /// Create a reporter; `origin` counts as already sent
    #[must_use]
    pub fn new(config: ReportingConfig, origin: Vec2) -> Self {
        Self {
            config,
            last_sent: origin,
            since_last: 0.0,
            seq: 0,
        }
    }

    /// Sequence number of the last emitted report
    #[must_use]
    pub fn last_seq(&self) -> u64 {
        self.seq
    }

    /// Advance by `delta` and maybe produce a report
    pub fn poll(&mut self, position: Vec2, delta: f32, dead: bool) -> Option<PositionReport> {
        self.since_last += delta.max(0.0);
        if self.since_last < self.config.interval {
            return None;
        }
        // Carry the remainder; a hitch longer than two intervals starts over
        let remainder = self.since_last - self.config.interval;
        self.since_last = if remainder < self.config.interval { remainder } else { 0.0 };

        if dead {
            return None;
        }
        let moved = (position - self.last_sent).abs();
        if moved.x < self.config.epsilon && moved.y < self.config.epsilon {
            return None;
        }

        self.last_sent = position;
        self.seq += 1;
        Some(PositionReport {
            x: position.x,
            z: position.y,
            seq: self.seq,
        })
    }
}
