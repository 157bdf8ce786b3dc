//! Navigation module
//!
//! Walkability queries against a loaded bitmap, line of sight sampling, and
//! grid pathfinding with corner-cut prevention and path smoothing.

mod bitmap;
mod context;
mod grid;
mod line_of_sight;
mod oracle;
mod pathfinding;

pub use bitmap::{PendingBitmap, WalkabilityBitmap};
pub use context::NavigationContext;
pub use grid::{GridCell, NavGrid};
pub use line_of_sight::has_line_of_sight;
pub use oracle::{OracleStatus, WalkabilityOracle};
pub use pathfinding::{NEIGHBOR_OFFSETS, Path, find_path, smooth_path};

use serde::{Deserialize, Serialize};

/// Side length of the square world, in world units
pub const WORLD_EXTENT: f32 = 100.0;

/// Number of pathfinding cells per world side
pub const GRID_DIVISIONS: u32 = 200;

/// Navigation tuning shared by the oracle, line of sight and the pathfinder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Side length of the square world centred on the origin
    pub world_extent: f32,
    /// Grid cells per side
    pub divisions: u32,
    /// Radius that must stay walkable around a moving body
    pub agent_clearance: f32,
    /// Points sampled on the clearance ring
    pub clearance_samples: u32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            world_extent: WORLD_EXTENT,
            divisions: GRID_DIVISIONS,
            agent_clearance: 0.3,
            clearance_samples: 16,
        }
    }
}

/// Errors raised while loading navigation data.
///
/// Queries never fail; only producing a bitmap can.
#[derive(Debug, Clone, PartialEq)]
pub enum NavError {
    /// The map file could not be read
    Io(String),
    /// The map bytes are not a decodable image
    Decode(String),
    /// The decoded image has no pixels
    EmptyBitmap,
    /// The background decoder went away without answering
    LoaderDisconnected,
}

impl std::fmt::Display for NavError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Decode(e) => write!(f, "Decode error: {e}"),
            Self::EmptyBitmap => write!(f, "Walkability bitmap has no pixels"),
            Self::LoaderDisconnected => write!(f, "Bitmap loader stopped before finishing"),
        }
    }
}

impl std::error::Error for NavError {}
