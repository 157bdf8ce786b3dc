//! Stuck recovery
//!
//! Runs once per frame after movement. An avatar standing somewhere its own
//! oracle rejects is moved to the nearest clear spot on a ring search, or
//! back to where it last stood safely.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::Serialize;

use super::{MotionController, MotionState};
use crate::nav::{NavigationContext, OracleStatus};

/// Outcome of a containment check
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Containment {
    /// Oracle not ready; nothing can be judged yet
    Unchecked,
    /// Position was already walkable
    Clear,
    /// Moved to a nearby walkable candidate
    Nudged { from: Vec2, to: Vec2 },
    /// No candidate found; returned to the last safe position
    Reverted { from: Vec2, to: Vec2 },
}

impl Containment {
    /// Whether the position was changed
    #[must_use]
    pub fn moved(&self) -> bool {
        matches!(self, Self::Nudged { .. } | Self::Reverted { .. })
    }
}

impl MotionController {
    /// Keep `state` on ground its oracle considers walkable
    pub fn check_character_position(
        &self,
        state: &mut MotionState,
        nav: &NavigationContext,
    ) -> Containment {
        if nav.status() != OracleStatus::Ready {
            return Containment::Unchecked;
        }

        let clearance = nav.clearance();
        let from = state.position;
        if nav.is_walkable_with_clearance(from.x, from.y, clearance) {
            state.last_safe_position = from;
            return Containment::Clear;
        }

        if let Some(to) = self.ring_search(nav, from, clearance) {
            log::warn!("Unstuck: nudged from {from} to {to}");
            state.position = to;
            state.last_safe_position = to;
            return Containment::Nudged { from, to };
        }

        let to = state.last_safe_position;
        log::warn!("Unstuck: no clear spot near {from}, reverting to {to}");
        state.position = to;
        Containment::Reverted { from, to }
    }

    /// First clear candidate on rings of growing radius around `center`
    fn ring_search(&self, nav: &NavigationContext, center: Vec2, clearance: f32) -> Option<Vec2> {
        let cfg = &self.config().containment;
        if cfg.ring_step <= 0.0 || cfg.ring_samples == 0 {
            return None;
        }

        let rings = (cfg.max_radius / cfg.ring_step).floor() as u32;
        (1..=rings)
            .flat_map(|ring| {
                let radius = cfg.ring_step * ring as f32;
                (0..cfg.ring_samples).map(move |k| {
                    let angle = k as f32 / cfg.ring_samples as f32 * TAU;
                    center + Vec2::from_angle(angle) * radius
                })
            })
            .find(|c| nav.is_walkable_with_clearance(c.x, c.y, clearance))
    }
}
