//! Owned navigation state passed through the simulation step

use glam::Vec2;

use super::{
    NavError, NavGrid, NavigationConfig, OracleStatus, Path, WalkabilityBitmap,
    WalkabilityOracle, find_path, has_line_of_sight,
};

/// The loaded grid and oracle, with the clearance every query uses
#[derive(Debug, Clone)]
pub struct NavigationContext {
    grid: NavGrid,
    oracle: WalkabilityOracle,
    config: NavigationConfig,
}

impl NavigationContext {
    /// Create a context whose bitmap is still loading
    #[must_use]
    pub fn new(config: NavigationConfig) -> Self {
        Self {
            grid: NavGrid::new(config.world_extent, config.divisions),
            oracle: WalkabilityOracle::pending(config.world_extent, config.clearance_samples),
            config,
        }
    }

    /// Create a ready context from an already decoded bitmap
    #[must_use]
    pub fn with_bitmap(config: NavigationConfig, bitmap: WalkabilityBitmap) -> Self {
        let mut ctx = Self::new(config);
        ctx.install_bitmap(bitmap);
        ctx
    }

    /// Install a decoded bitmap
    pub fn install_bitmap(&mut self, bitmap: WalkabilityBitmap) {
        self.oracle.install(bitmap);
    }

    /// Record that the bitmap could not be loaded
    pub fn mark_failed(&mut self, error: NavError) {
        self.oracle.mark_failed(error);
    }

    /// Oracle readiness
    #[must_use]
    pub fn status(&self) -> OracleStatus {
        self.oracle.status()
    }

    /// The navigation grid
    #[must_use]
    pub fn grid(&self) -> &NavGrid {
        &self.grid
    }

    /// The walkability oracle
    #[must_use]
    pub fn oracle(&self) -> &WalkabilityOracle {
        &self.oracle
    }

    /// Navigation settings
    #[must_use]
    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// Clearance radius used for bodies moving through the world
    #[must_use]
    pub fn clearance(&self) -> f32 {
        self.config.agent_clearance
    }

    /// Point test
    #[must_use]
    pub fn is_walkable(&self, x: f32, z: f32) -> bool {
        self.oracle.is_walkable(x, z)
    }

    /// Point test with a clearance ring
    #[must_use]
    pub fn is_walkable_with_clearance(&self, x: f32, z: f32, clearance: f32) -> bool {
        self.oracle.is_walkable_with_clearance(x, z, clearance)
    }

    /// Whether a body can travel straight from `a` to `b`
    #[must_use]
    pub fn has_line_of_sight(&self, a: Vec2, b: Vec2) -> bool {
        has_line_of_sight(&self.oracle, &self.grid, self.config.agent_clearance, a, b)
    }

    /// Route from `(start_x, start_z)` to `(end_x, end_z)`, empty if none
    #[must_use]
    pub fn find_path(&self, start_x: f32, start_z: f32, end_x: f32, end_z: f32) -> Path {
        find_path(
            &self.oracle,
            &self.grid,
            self.config.agent_clearance,
            Vec2::new(start_x, start_z),
            Vec2::new(end_x, end_z),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_context_answers_nothing() {
        let ctx = NavigationContext::new(NavigationConfig::default());

        assert_eq!(ctx.status(), OracleStatus::Pending);
        assert!(!ctx.is_walkable(0.0, 0.0));
        assert!(ctx.find_path(0.0, 0.0, 5.0, 5.0).is_empty());
    }

    #[test]
    fn test_install_makes_queries_live() {
        let mut ctx = NavigationContext::new(NavigationConfig::default());
        ctx.install_bitmap(WalkabilityBitmap::all_open(200, 200).unwrap());

        assert_eq!(ctx.status(), OracleStatus::Ready);
        assert!(ctx.is_walkable_with_clearance(3.0, -4.0, ctx.clearance()));
        assert!(ctx.has_line_of_sight(Vec2::ZERO, Vec2::new(10.0, 10.0)));
        assert_eq!(ctx.find_path(0.0, 0.0, 10.0, 10.0).len(), 2);
    }

    #[test]
    fn test_failure_is_surfaced() {
        let mut ctx = NavigationContext::new(NavigationConfig::default());
        ctx.mark_failed(NavError::Io("missing".to_string()));

        assert_eq!(ctx.status(), OracleStatus::Failed);
        assert!(ctx.oracle().failure().is_some());
        assert!(!ctx.is_walkable(0.0, 0.0));
    }
}
