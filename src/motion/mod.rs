//! Motion of the locally controlled avatar
//!
//! Path following, attack-follow pursuit with re-path hysteresis, and the
//! containment pass that keeps the avatar on walkable ground.

mod containment;
mod controller;
mod state;
mod steering;

pub use containment::Containment;
pub use controller::MotionController;
pub use state::{MotionPhase, MotionState};
pub use steering::{SeekStep, facing, seek, step_toward, turn_toward, yaw_of};

use serde::{Deserialize, Serialize};

/// Avatar motion tuning; defaults are tuned for game feel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Movement speed in units per second
    pub speed: f32,
    /// Distance at which attack-follow stops approaching
    pub attack_range: f32,
    /// Target movement that forces a re-path while chasing
    pub repath_drift: f32,
    /// Distance at which a waypoint counts as reached
    pub arrival_epsilon: f32,
    /// Per-frame slerp factor toward the travel direction
    pub turn_blend: f32,
    /// Largest delta fed to the integrator in one frame
    pub max_step_delta: f32,
    /// Move commands shorter than this with clear sight skip pathfinding
    pub direct_move_distance: f32,
    /// Stuck-recovery search
    pub containment: ContainmentConfig,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed: 9.0,
            attack_range: 4.0,
            repath_drift: 0.3,
            arrival_epsilon: 0.1,
            turn_blend: 0.2,
            max_step_delta: 0.1,
            direct_move_distance: 2.0,
            containment: ContainmentConfig::default(),
        }
    }
}

/// Rings searched around a stuck avatar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainmentConfig {
    /// Radius increment between rings
    pub ring_step: f32,
    /// Largest ring radius
    pub max_radius: f32,
    /// Candidates per ring
    pub ring_samples: u32,
}

impl Default for ContainmentConfig {
    fn default() -> Self {
        Self {
            ring_step: 0.18,
            max_radius: 1.5,
            ring_samples: 24,
        }
    }
}
