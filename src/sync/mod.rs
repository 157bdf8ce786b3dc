//! Remote entity synchronisation
//!
//! Interpolation of server-driven minions, remote player tracking, team
//! affiliation, and throttled reporting of the local position.

mod minions;
mod reporter;
mod targets;
mod team;

pub use minions::{InterpolationStats, MinionProxy, MinionRegistry, MinionSnapshot, UnitKind};
pub use reporter::{PositionReport, PositionReporter};
pub use targets::{
    MinionId, PlayerId, RemotePlayer, RemotePlayers, TargetLocator, TargetRef, WorldTargets,
};
pub use team::{Team, are_allies, is_hostile};

use serde::{Deserialize, Serialize};

/// Minion interpolation tuning; defaults are tuned for game feel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationConfig {
    /// Speed used until the server reports one
    pub default_speed: f32,
    /// Seconds of velocity extrapolation applied to reported positions
    pub prediction_horizon: f32,
    /// Catch-up factor applied to speed when closing the gap
    pub catch_up_multiplier: f32,
    /// Seconds without data before a minion counts as desynced
    pub stale_after: f32,
    /// Gap above which a desynced minion teleports
    pub snap_distance: f32,
    /// Frame delta above which every minion counts as desynced
    pub max_frame_delta: f32,
    /// Blend factor toward a freshly reported velocity
    pub velocity_blend: f32,
    /// Blend factor toward a freshly predicted target
    pub target_blend: f32,
    /// Gap below which a minion just sits on its target
    pub settle_distance: f32,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            default_speed: 2.6,
            prediction_horizon: 0.2,
            catch_up_multiplier: 1.35,
            stale_after: 0.55,
            snap_distance: 3.25,
            max_frame_delta: 0.25,
            velocity_blend: 0.5,
            target_blend: 0.5,
            settle_distance: 0.01,
        }
    }
}

/// Position report throttling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingConfig {
    /// Minimum seconds between reports
    pub interval: f32,
    /// Per-axis movement below which nothing is sent
    pub epsilon: f32,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            interval: 1.0 / 20.0,
            epsilon: 0.001,
        }
    }
}
