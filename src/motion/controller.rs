//! Per-frame motion update for the local avatar

use glam::Vec2;

use super::{MotionConfig, MotionPhase, MotionState, seek, turn_toward};
use crate::nav::{NavigationContext, Path};
use crate::sync::{TargetLocator, TargetRef};

/// Drives [`MotionState`]s through path following and attack-follow
#[derive(Debug, Clone, Default)]
pub struct MotionController {
    config: MotionConfig,
}

impl MotionController {
    /// Create a controller with the given tuning
    #[must_use]
    pub fn new(config: MotionConfig) -> Self {
        Self { config }
    }

    /// Motion tuning
    #[must_use]
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Advance one entity by `delta` seconds.
    ///
    /// Inactive, dead or control-locked entities do not move and report zero
    /// velocity. Returns the phase after the update.
    pub fn update_character(
        &self,
        state: &mut MotionState,
        nav: &NavigationContext,
        targets: &impl TargetLocator,
        delta: f32,
    ) -> MotionPhase {
        if !state.can_move() {
            state.velocity = Vec2::ZERO;
            return state.phase();
        }

        let delta = delta.clamp(0.0, self.config.max_step_delta);
        let before = state.position;

        if let Some(target) = state.attack_target {
            self.pursue(state, nav, targets, target);
        }
        self.follow_path(state, delta);

        state.velocity = if delta > 0.0 {
            (state.position - before) / delta
        } else {
            Vec2::ZERO
        };
        state.phase()
    }

    /// Issue a move order toward `destination`.
    ///
    /// Cancels attack-follow. Returns the destination marker position when a
    /// path was issued, `None` when the order was refused.
    pub fn command_move(
        &self,
        state: &mut MotionState,
        nav: &NavigationContext,
        destination: Vec2,
    ) -> Option<Vec2> {
        if !state.can_move() {
            return None;
        }
        if !nav.is_walkable_with_clearance(destination.x, destination.y, nav.clearance()) {
            log::debug!("Move to {destination} refused: not walkable");
            return None;
        }

        let from = state.position;
        let path = if from.distance(destination) < self.config.direct_move_distance
            && nav.has_line_of_sight(from, destination)
        {
            Path::from_points([destination])
        } else {
            nav.find_path(from.x, from.y, destination.x, destination.y)
        };

        if path.is_empty() {
            log::debug!("Move to {destination} refused: no route");
            return None;
        }

        state.move_to_attack_target(None);
        state.set_path(path);
        Some(destination)
    }

    /// Attack-follow: re-path toward the target with drift hysteresis, hold
    /// position once in range
    fn pursue(
        &self,
        state: &mut MotionState,
        nav: &NavigationContext,
        targets: &impl TargetLocator,
        target: TargetRef,
    ) {
        let Some(target_pos) = targets.locate(target) else {
            log::debug!("Attack target {target:?} is gone");
            state.attack_target = None;
            state.last_target_position = None;
            state.path = Path::empty();
            return;
        };

        let distance = state.position.distance(target_pos);
        if distance <= state.attack_range {
            state.path = Path::empty();
            state.last_target_position = None;
            return;
        }

        let drifted = state
            .last_target_position
            .is_none_or(|last| last.distance(target_pos) > self.config.repath_drift);
        if drifted || state.path.is_empty() {
            let pos = state.position;
            let path = nav.find_path(pos.x, pos.y, target_pos.x, target_pos.y);
            state.repath_count += 1;
            state.last_target_position = Some(target_pos);
            // A single point is our own cell; nothing to walk
            state.path = if path.len() > 1 { path } else { Path::empty() };
        }
    }

    /// Walk the path head first, popping waypoints as they are reached
    fn follow_path(&self, state: &mut MotionState, delta: f32) {
        let mut budget = state.speed * delta;
        let mut heading = Vec2::ZERO;

        while let Some(head) = state.path.head() {
            if state.position.distance(head) <= self.config.arrival_epsilon {
                state.path.pop_head();
                continue;
            }
            if budget <= 0.0 {
                break;
            }

            let step = seek(state.position, head, budget);
            state.position = step.position;
            budget -= step.travelled;
            heading = step.direction;
            if step.remaining > 0.0 {
                break;
            }
        }

        state.orientation = turn_toward(state.orientation, heading, self.config.turn_blend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::{NavigationConfig, WalkabilityBitmap};
    use crate::sync::{MinionId, PlayerId};
    use rustc_hash::FxHashMap;

    const DT: f32 = 1.0 / 60.0;

    fn open_nav() -> NavigationContext {
        NavigationContext::with_bitmap(
            NavigationConfig::default(),
            WalkabilityBitmap::all_open(200, 200).unwrap(),
        )
    }

    /// Wall at x in [-1, 1) with a gap at z in [20, 30)
    fn walled_nav() -> NavigationContext {
        let bitmap = WalkabilityBitmap::from_fn(200, 200, |u, v| {
            let in_wall = (98..102).contains(&u);
            let in_gap = (140..160).contains(&v);
            if in_wall && !in_gap { 255 } else { 0 }
        })
        .unwrap();
        NavigationContext::with_bitmap(NavigationConfig::default(), bitmap)
    }

    fn no_targets() -> FxHashMap<TargetRef, Vec2> {
        FxHashMap::default()
    }

    fn targets_at(target: TargetRef, pos: Vec2) -> FxHashMap<TargetRef, Vec2> {
        let mut map = FxHashMap::default();
        map.insert(target, pos);
        map
    }

    #[test]
    fn test_follows_path_to_destination() {
        let nav = open_nav();
        let controller = MotionController::default();
        let mut state = MotionState::from_config(Vec2::ZERO, controller.config());
        let none = no_targets();

        let marker = controller.command_move(&mut state, &nav, Vec2::new(6.0, 0.0));
        assert_eq!(marker, Some(Vec2::new(6.0, 0.0)));
        assert_eq!(state.phase(), MotionPhase::FollowingPath);

        // The path ends on the centre of the destination cell
        let end = state.current_destination().unwrap();
        assert!(end.distance(Vec2::new(6.0, 0.0)) < 0.5);

        for _ in 0..120 {
            controller.update_character(&mut state, &nav, &none, DT);
        }

        assert!(state.position().distance(end) < 1e-4);
        assert_eq!(state.phase(), MotionPhase::Idle);
        assert_eq!(state.velocity(), Vec2::ZERO);
        assert!((state.yaw() - std::f32::consts::FRAC_PI_2).abs() < 0.1);
    }

    #[test]
    fn test_step_is_speed_limited() {
        let nav = open_nav();
        let controller = MotionController::default();
        let mut state = MotionState::new(Vec2::ZERO, 9.0, 4.0);
        state.set_path(Path::from_points([Vec2::new(20.0, 0.0)]));

        controller.update_character(&mut state, &nav, &no_targets(), 0.05);

        assert!((state.position().x - 0.45).abs() < 1e-5);
        assert!((state.velocity().x - 9.0).abs() < 1e-3);
    }

    #[test]
    fn test_large_delta_is_clamped() {
        let nav = open_nav();
        let controller = MotionController::default();
        let mut state = MotionState::new(Vec2::ZERO, 9.0, 4.0);
        state.set_path(Path::from_points([Vec2::new(20.0, 0.0)]));

        controller.update_character(&mut state, &nav, &no_targets(), 5.0);

        // 9 u/s over the 0.1 s cap
        assert!((state.position().x - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_continues_past_reached_waypoint() {
        let nav = open_nav();
        let controller = MotionController::default();
        let mut state = MotionState::new(Vec2::ZERO, 10.0, 4.0);
        state.set_path(Path::from_points([Vec2::new(0.5, 0.0), Vec2::new(0.5, 5.0)]));

        controller.update_character(&mut state, &nav, &no_targets(), 0.1);

        assert!(state.position().distance(Vec2::new(0.5, 0.5)) < 1e-4);
        assert_eq!(state.current_path().len(), 1);
    }

    #[test]
    fn test_gated_entity_does_not_move() {
        let nav = open_nav();
        let controller = MotionController::default();
        let mut state = MotionState::new(Vec2::ZERO, 9.0, 4.0);
        state.set_path(Path::from_points([Vec2::new(5.0, 0.0)]));
        controller.update_character(&mut state, &nav, &no_targets(), DT);
        assert!(state.velocity().length() > 0.0);

        state.set_dead(true);
        let before = state.position();
        controller.update_character(&mut state, &nav, &no_targets(), DT);

        assert_eq!(state.position(), before);
        assert_eq!(state.velocity(), Vec2::ZERO);
        assert!(controller.command_move(&mut state, &nav, Vec2::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_short_hop_skips_pathfinding() {
        let nav = open_nav();
        let controller = MotionController::default();
        let mut state = MotionState::new(Vec2::ZERO, 9.0, 4.0);

        controller.command_move(&mut state, &nav, Vec2::new(1.0, 0.5));

        assert_eq!(state.current_path().to_vec(), vec![Vec2::new(1.0, 0.5)]);
    }

    #[test]
    fn test_move_into_wall_is_refused() {
        let nav = walled_nav();
        let controller = MotionController::default();
        let mut state = MotionState::new(Vec2::new(-10.0, 0.0), 9.0, 4.0);
        state.move_to_attack_target(Some(TargetRef::Player(PlayerId(1))));

        assert!(controller.command_move(&mut state, &nav, Vec2::new(0.0, 0.0)).is_none());
        // A refused order leaves the current intent alone
        assert_eq!(state.attack_target(), Some(TargetRef::Player(PlayerId(1))));

        assert!(controller.command_move(&mut state, &nav, Vec2::new(10.0, 0.0)).is_some());
        assert_eq!(state.attack_target(), None);
        assert!(state.current_path().len() > 2);
    }

    #[test]
    fn test_attack_follow_hysteresis() {
        let nav = open_nav();
        let controller = MotionController::default();
        let target = TargetRef::Minion(MinionId(5));
        let mut targets = targets_at(target, Vec2::new(10.0, 0.0));
        let mut state = MotionState::new(Vec2::ZERO, 9.0, 4.0);
        state.move_to_attack_target(Some(target));

        controller.update_character(&mut state, &nav, &targets, DT);
        assert!(!state.current_path().is_empty());
        assert_eq!(state.repath_count(), 1);

        // Small drift mid-chase keeps the old path
        targets.insert(target, Vec2::new(10.0, 0.2));
        controller.update_character(&mut state, &nav, &targets, DT);
        assert_eq!(state.repath_count(), 1);

        // Run until in range
        for _ in 0..120 {
            controller.update_character(&mut state, &nav, &targets, DT);
        }
        assert!(state.position().distance(Vec2::new(10.0, 0.2)) <= 4.0);
        assert!(state.current_path().is_empty());
        assert_eq!(state.phase(), MotionPhase::AttackFollowing);
        let settled = state.repath_count();

        // Holding in range never re-paths, even if the target shuffles
        targets.insert(target, Vec2::new(9.9, 0.3));
        for _ in 0..30 {
            controller.update_character(&mut state, &nav, &targets, DT);
        }
        assert_eq!(state.repath_count(), settled);
        assert!(state.current_path().is_empty());

        // Target runs off: chase resumes
        targets.insert(target, Vec2::new(25.0, 0.0));
        controller.update_character(&mut state, &nav, &targets, DT);
        assert_eq!(state.repath_count(), settled + 1);
        assert!(!state.current_path().is_empty());
    }

    #[test]
    fn test_large_drift_repaths() {
        let nav = open_nav();
        let controller = MotionController::default();
        let target = TargetRef::Player(PlayerId(2));
        let mut targets = targets_at(target, Vec2::new(0.0, 15.0));
        let mut state = MotionState::new(Vec2::ZERO, 9.0, 4.0);
        state.move_to_attack_target(Some(target));

        controller.update_character(&mut state, &nav, &targets, DT);
        targets.insert(target, Vec2::new(2.0, 15.0));
        controller.update_character(&mut state, &nav, &targets, DT);

        assert_eq!(state.repath_count(), 2);
        let dest = state.current_destination().unwrap();
        assert!(dest.distance(Vec2::new(2.0, 15.0)) < 0.5);
    }

    #[test]
    fn test_lost_target_ends_pursuit() {
        let nav = open_nav();
        let controller = MotionController::default();
        let target = TargetRef::Minion(MinionId(9));
        let targets = targets_at(target, Vec2::new(10.0, 10.0));
        let mut state = MotionState::new(Vec2::ZERO, 9.0, 4.0);
        state.move_to_attack_target(Some(target));
        controller.update_character(&mut state, &nav, &targets, DT);
        assert!(!state.current_path().is_empty());

        let phase = controller.update_character(&mut state, &nav, &no_targets(), DT);

        assert_eq!(phase, MotionPhase::Idle);
        assert!(state.current_path().is_empty());
        assert_eq!(state.attack_target(), None);
    }

    #[test]
    fn test_chasing_target_beside_wall_paths_once() {
        let nav = walled_nav();
        let controller = MotionController::default();
        let target = TargetRef::Minion(MinionId(6));
        // Passes clearance, but its cell centre is inside the clearance band
        let targets = targets_at(target, Vec2::new(-1.35, 0.0));
        let mut state = MotionState::new(Vec2::new(-20.0, 0.0), 9.0, 4.0);
        state.move_to_attack_target(Some(target));

        controller.update_character(&mut state, &nav, &targets, DT);
        assert!(!state.current_path().is_empty());

        for _ in 0..10 {
            controller.update_character(&mut state, &nav, &targets, DT);
        }
        assert_eq!(state.repath_count(), 1);
        assert!(!state.current_path().is_empty());
    }
}
