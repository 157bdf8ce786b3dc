//! Point and area traversability queries
//!
//! World coordinates in `[-extent/2, extent/2]` map linearly onto the
//! bitmap's pixel range. Until a bitmap is installed every query answers
//! "not walkable".

use std::f32::consts::TAU;

use glam::Vec2;

use super::{NavError, WalkabilityBitmap};

/// Readiness of the oracle, for orchestration code
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum OracleStatus {
    /// Bitmap not installed yet
    Pending,
    /// Queries are answered from the bitmap
    Ready,
    /// Loading failed; queries stay closed
    Failed,
}

#[derive(Debug, Clone)]
enum OracleState {
    Pending,
    Ready(WalkabilityBitmap),
    Failed(NavError),
}

/// Answers whether a world point can be occupied
#[derive(Debug, Clone)]
pub struct WalkabilityOracle {
    world_extent: f32,
    clearance_samples: u32,
    state: OracleState,
}

impl WalkabilityOracle {
    /// Create an oracle that is waiting for its bitmap
    #[must_use]
    pub fn pending(world_extent: f32, clearance_samples: u32) -> Self {
        Self {
            world_extent,
            clearance_samples,
            state: OracleState::Pending,
        }
    }

    /// Create an oracle that is immediately ready
    #[must_use]
    pub fn ready(world_extent: f32, clearance_samples: u32, bitmap: WalkabilityBitmap) -> Self {
        let mut oracle = Self::pending(world_extent, clearance_samples);
        oracle.install(bitmap);
        oracle
    }

    /// Install the decoded bitmap, making the oracle ready
    pub fn install(&mut self, bitmap: WalkabilityBitmap) {
        log::info!(
            "Walkability bitmap installed: {}x{} ({:.1}% open)",
            bitmap.width(),
            bitmap.height(),
            bitmap.open_ratio() * 100.0
        );
        self.state = OracleState::Ready(bitmap);
    }

    /// Record a load failure; queries keep failing closed
    pub fn mark_failed(&mut self, error: NavError) {
        log::warn!("Walkability bitmap unavailable: {error}");
        self.state = OracleState::Failed(error);
    }

    /// Current readiness
    #[must_use]
    pub fn status(&self) -> OracleStatus {
        match self.state {
            OracleState::Pending => OracleStatus::Pending,
            OracleState::Ready(_) => OracleStatus::Ready,
            OracleState::Failed(_) => OracleStatus::Failed,
        }
    }

    /// The load error, if loading failed
    #[must_use]
    pub fn failure(&self) -> Option<&NavError> {
        match &self.state {
            OracleState::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Test a single world point
    #[must_use]
    pub fn is_walkable(&self, x: f32, z: f32) -> bool {
        let OracleState::Ready(bitmap) = &self.state else {
            return false;
        };
        let half = self.world_extent * 0.5;
        let u = ((x + half) / self.world_extent * bitmap.width() as f32).floor();
        let v = ((z + half) / self.world_extent * bitmap.height() as f32).floor();
        // NaN and infinities fall out of range here
        if !u.is_finite() || !v.is_finite() {
            return false;
        }
        bitmap.is_open(u as i64, v as i64)
    }

    /// Test a point and a ring of samples at `clearance` around it
    #[must_use]
    pub fn is_walkable_with_clearance(&self, x: f32, z: f32, clearance: f32) -> bool {
        if !self.is_walkable(x, z) {
            return false;
        }
        if clearance <= 0.0 {
            return true;
        }
        (0..self.clearance_samples).all(|k| {
            let angle = k as f32 / self.clearance_samples as f32 * TAU;
            let offset = Vec2::from_angle(angle) * clearance;
            self.is_walkable(x + offset.x, z + offset.y)
        })
    }
}
