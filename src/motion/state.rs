//! Per-avatar motion state

use glam::{Quat, Vec2};
use serde::Serialize;

use super::{MotionConfig, yaw_of};
use crate::nav::Path;
use crate::sync::TargetRef;

/// What the avatar is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MotionPhase {
    /// No path and no attack target
    Idle,
    /// Walking a path toward a destination
    FollowingPath,
    /// Chasing an attack target, with or without a current path
    AttackFollowing,
}

/// Position, orientation and intent of one controlled entity
#[derive(Debug, Clone)]
pub struct MotionState {
    pub(super) position: Vec2,
    pub(super) orientation: Quat,
    pub(super) path: Path,
    pub(super) attack_target: Option<TargetRef>,
    /// Target position at the last re-path
    pub(super) last_target_position: Option<Vec2>,
    pub(super) last_safe_position: Vec2,
    pub(super) speed: f32,
    pub(super) attack_range: f32,
    pub(super) velocity: Vec2,
    pub(super) active: bool,
    pub(super) dead: bool,
    pub(super) controls_enabled: bool,
    pub(super) repath_count: u32,
}

impl MotionState {
    /// Create an idle entity at `position`
    #[must_use]
    pub fn new(position: Vec2, speed: f32, attack_range: f32) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
            path: Path::empty(),
            attack_target: None,
            last_target_position: None,
            last_safe_position: position,
            speed,
            attack_range,
            velocity: Vec2::ZERO,
            active: true,
            dead: false,
            controls_enabled: true,
            repath_count: 0,
        }
    }

    /// Create an idle entity using the configured speed and range
    #[must_use]
    pub fn from_config(position: Vec2, config: &MotionConfig) -> Self {
        Self::new(position, config.speed, config.attack_range)
    }

    /// Current planar position
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Current facing
    #[must_use]
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Heading in radians, 0 facing +Z
    #[must_use]
    pub fn yaw(&self) -> f32 {
        yaw_of(self.orientation)
    }

    /// Velocity measured over the last update
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Movement speed
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Attack range
    #[must_use]
    pub fn attack_range(&self) -> f32 {
        self.attack_range
    }

    /// The remaining path
    #[must_use]
    pub fn current_path(&self) -> &Path {
        &self.path
    }

    /// Final waypoint of the current path
    #[must_use]
    pub fn current_destination(&self) -> Option<Vec2> {
        self.path.destination()
    }

    /// Current attack target
    #[must_use]
    pub fn attack_target(&self) -> Option<TargetRef> {
        self.attack_target
    }

    /// Last position known to be clear of obstacles
    #[must_use]
    pub fn last_safe_position(&self) -> Vec2 {
        self.last_safe_position
    }

    /// Number of paths computed while chasing
    #[must_use]
    pub fn repath_count(&self) -> u32 {
        self.repath_count
    }

    /// Whether the entity is dead
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Whether movement is allowed this frame
    #[must_use]
    pub fn can_move(&self) -> bool {
        self.active && !self.dead && self.controls_enabled
    }

    /// Derived state machine phase
    #[must_use]
    pub fn phase(&self) -> MotionPhase {
        if self.attack_target.is_some() {
            MotionPhase::AttackFollowing
        } else if !self.path.is_empty() {
            MotionPhase::FollowingPath
        } else {
            MotionPhase::Idle
        }
    }

    /// Replace the path wholesale
    pub fn set_path(&mut self, path: Path) {
        self.path = path;
    }

    /// Start chasing `target`, or stop chasing with `None`
    pub fn move_to_attack_target(&mut self, target: Option<TargetRef>) {
        if self.attack_target != target {
            self.last_target_position = None;
        }
        self.attack_target = target;
    }

    /// Place the entity somewhere else, e.g. on respawn or server correction
    pub fn teleport(&mut self, position: Vec2) {
        self.position = position;
        self.path = Path::empty();
        self.velocity = Vec2::ZERO;
    }

    /// Bring the entity back to life at `position`, trusting it as safe
    pub fn respawn_at(&mut self, position: Vec2) {
        self.teleport(position);
        self.last_safe_position = position;
        self.move_to_attack_target(None);
        self.dead = false;
    }

    /// Mark the entity dead or alive
    pub fn set_dead(&mut self, dead: bool) {
        self.dead = dead;
    }

    /// Whether the match is running for this entity
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Enable or disable player controls
    pub fn set_controls_enabled(&mut self, enabled: bool) {
        self.controls_enabled = enabled;
    }

    /// Change movement speed (class or item change)
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Change attack range (class change)
    pub fn set_attack_range(&mut self, range: f32) {
        self.attack_range = range;
    }
}
