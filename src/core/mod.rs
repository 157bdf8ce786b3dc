//! Core simulation module
//!
//! Contains the Simulation step, its configuration, events, timing and
//! debug views

mod config;
mod debug;
mod events;
mod simulation;
mod time;

pub use config::{ConfigError, SimulationConfig};
pub use debug::{DebugSnapshot, StepStats};
pub use events::{EventQueue, SimEvent};
pub use simulation::{Simulation, StepOutcome};
pub use time::FrameClock;
