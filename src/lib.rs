//! Client-side navigation core for an arena game
//!
//! This crate provides:
//! - Walkability and line of sight queries against a map bitmap
//! - Grid pathfinding with corner-cut prevention and path smoothing
//! - Avatar motion with attack-follow and stuck recovery
//! - Interpolation of server-driven minions

pub mod core;
pub mod motion;
pub mod nav;
pub mod sync;

// Re-exports for convenience
pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::core::{
        ConfigError, DebugSnapshot, EventQueue, SimEvent, Simulation, SimulationConfig,
        StepOutcome,
    };
    pub use crate::motion::{Containment, MotionController, MotionPhase, MotionState};
    pub use crate::nav::{
        NavError, NavigationContext, OracleStatus, Path, PendingBitmap, WalkabilityBitmap,
    };
    pub use crate::sync::{
        MinionId, MinionRegistry, MinionSnapshot, PlayerId, PositionReport, TargetRef, Team,
    };
    pub use glam::{Quat, Vec2};
}
