//! Debug and statistics module
//!
//! Running counters for the simulation and a serialisable snapshot of the
//! local avatar for overlays and telemetry.

use glam::Vec2;
use serde::Serialize;

use crate::motion::{Containment, MotionPhase};
use crate::nav::OracleStatus;
use crate::sync::{InterpolationStats, TargetRef};

/// Counters accumulated over the life of a simulation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepStats {
    /// Steps run
    pub total_steps: u64,
    /// Steps whose raw delta exceeded the integration clamp
    pub clamped_steps: u64,
    /// Containment nudges onto a nearby clear spot
    pub nudges: u64,
    /// Containment reverts to the last safe spot
    pub reverts: u64,
    /// Minion steps toward their targets
    pub minion_steps: u64,
    /// Stale minions set straight onto their targets
    pub soft_corrections: u64,
    /// Stale minions teleported across a large gap
    pub hard_snaps: u64,
    /// Largest raw delta seen, in seconds
    pub max_delta: f32,
}

impl StepStats {
    /// Create zeroed counters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one step
    pub fn record_step(
        &mut self,
        raw_delta: f32,
        clamped: bool,
        containment: Containment,
        minions: InterpolationStats,
    ) {
        self.total_steps += 1;
        if clamped {
            self.clamped_steps += 1;
        }
        self.max_delta = self.max_delta.max(raw_delta);

        match containment {
            Containment::Nudged { .. } => self.nudges += 1,
            Containment::Reverted { .. } => self.reverts += 1,
            Containment::Clear | Containment::Unchecked => {}
        }

        self.minion_steps += minions.stepped as u64;
        self.soft_corrections += minions.soft_corrections as u64;
        self.hard_snaps += minions.hard_snaps as u64;
    }

    /// Get a formatted stats string
    #[must_use]
    pub fn format_stats(&self) -> String {
        format!(
            "Steps: {} (clamped {}) | Unstuck: {} nudged, {} reverted | Minions: {} soft, {} hard",
            self.total_steps,
            self.clamped_steps,
            self.nudges,
            self.reverts,
            self.soft_corrections,
            self.hard_snaps
        )
    }
}

/// Point-in-time view of the local avatar and its surroundings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugSnapshot {
    /// Planar position
    pub position: Vec2,
    /// Velocity over the last step
    pub velocity: Vec2,
    /// Heading in radians
    pub yaw: f32,
    /// Motion phase
    pub phase: MotionPhase,
    /// Remaining waypoints
    pub path: Vec<Vec2>,
    /// Final waypoint, if any
    pub destination: Option<Vec2>,
    /// Current attack target
    pub attack_target: Option<TargetRef>,
    /// Re-paths issued while chasing
    pub repath_count: u32,
    /// Tracked minions
    pub minion_count: usize,
    /// Tracked remote players
    pub player_count: usize,
    /// Navigation readiness
    pub oracle: OracleStatus,
    /// Lifetime counters
    pub stats: StepStats,
}

impl DebugSnapshot {
    /// Render as compact JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Overlay lines, one fact per line
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("pos: ({:.2}, {:.2})", self.position.x, self.position.y),
            format!("vel: {:.2} u/s", self.velocity.length()),
            format!("phase: {:?}", self.phase),
            format!("path: {} waypoints", self.path.len()),
            format!("oracle: {:?}", self.oracle),
        ];
        if let Some(target) = self.attack_target {
            lines.push(format!("target: {target:?}"));
        }
        lines.push(self.stats.format_stats());
        lines
    }
}
