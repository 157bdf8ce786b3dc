//! Straight-segment traversability by sampling

use glam::Vec2;

use super::{NavGrid, WalkabilityOracle};

/// Sample the segment `a -> b` every half cell against the oracle.
///
/// Only interior samples are tested; endpoints are the caller's concern.
#[must_use]
pub fn has_line_of_sight(
    oracle: &WalkabilityOracle,
    grid: &NavGrid,
    clearance: f32,
    a: Vec2,
    b: Vec2,
) -> bool {
    let spacing = grid.cell_size * 0.5;
    let steps = (a.distance(b) / spacing).ceil() as u32;
    (1..steps).all(|k| {
        let p = a.lerp(b, k as f32 / steps as f32);
        oracle.is_walkable_with_clearance(p.x, p.y, clearance)
    })
}
