//! The per-frame simulation step
//!
//! Owns every piece of navigation state and runs it in a fixed order:
//! event handling, avatar motion, containment, minion interpolation, and
//! position reporting.

use glam::Vec2;

use super::{DebugSnapshot, EventQueue, FrameClock, SimEvent, SimulationConfig, StepStats};
use crate::motion::{Containment, MotionController, MotionPhase, MotionState};
use crate::nav::{NavigationContext, OracleStatus, Path, PendingBitmap, WalkabilityBitmap};
use crate::sync::{
    InterpolationStats, MinionId, MinionRegistry, MinionSnapshot, PlayerId, PositionReport,
    PositionReporter, RemotePlayers, TargetLocator, TargetRef, Team, WorldTargets, are_allies,
};

/// What one step did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Avatar phase after motion
    pub phase: MotionPhase,
    /// Containment result
    pub containment: Containment,
    /// Minion interpolation counters
    pub minions: InterpolationStats,
    /// Position report to flush, if one is due
    pub report: Option<PositionReport>,
}

/// One client's navigation world
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    nav: NavigationContext,
    avatar: MotionState,
    controller: MotionController,
    minions: MinionRegistry,
    players: RemotePlayers,
    events: EventQueue,
    clock: FrameClock,
    reporter: PositionReporter,
    team: Option<Team>,
    stats: StepStats,
}

impl Simulation {
    /// Create a simulation whose map is still loading
    #[must_use]
    pub fn new(config: SimulationConfig, spawn: Vec2) -> Self {
        let nav = NavigationContext::new(config.navigation.clone());
        Self::with_context(config, nav, spawn)
    }

    /// Create a simulation on an already decoded map
    #[must_use]
    pub fn with_bitmap(config: SimulationConfig, bitmap: WalkabilityBitmap, spawn: Vec2) -> Self {
        let nav = NavigationContext::with_bitmap(config.navigation.clone(), bitmap);
        Self::with_context(config, nav, spawn)
    }

    fn with_context(config: SimulationConfig, nav: NavigationContext, spawn: Vec2) -> Self {
        Self {
            avatar: MotionState::from_config(spawn, &config.motion),
            controller: MotionController::new(config.motion.clone()),
            minions: MinionRegistry::new(config.interpolation.clone()),
            players: RemotePlayers::new(),
            events: EventQueue::new(),
            clock: FrameClock::new(config.motion.max_step_delta),
            reporter: PositionReporter::new(config.reporting.clone(), spawn),
            team: None,
            stats: StepStats::new(),
            nav,
            config,
        }
    }

    /// Run one frame of `raw_delta` seconds
    pub fn step(&mut self, raw_delta: f32) -> StepOutcome {
        self.clock.tick(raw_delta);
        self.handle_events();

        let chasing = self.avatar.attack_target();
        let targets = WorldTargets {
            minions: &self.minions,
            players: &self.players,
        };
        let phase = self.controller.update_character(
            &mut self.avatar,
            &self.nav,
            &targets,
            self.clock.delta(),
        );
        if let Some(target) = chasing {
            if self.avatar.attack_target().is_none() {
                self.events.push(SimEvent::AttackTargetLost { target });
            }
        }

        let containment = self
            .controller
            .check_character_position(&mut self.avatar, &self.nav);
        match containment {
            Containment::Nudged { from, to } => self.events.push(SimEvent::EntityUnstuck {
                from,
                to,
                reverted: false,
            }),
            Containment::Reverted { from, to } => self.events.push(SimEvent::EntityUnstuck {
                from,
                to,
                reverted: true,
            }),
            Containment::Clear | Containment::Unchecked => {}
        }

        let minions = self.minions.update_minions(self.clock.raw_delta());
        let report = self.reporter.poll(
            self.avatar.position(),
            self.clock.raw_delta(),
            self.avatar.is_dead(),
        );

        self.stats.record_step(
            self.clock.raw_delta(),
            self.clock.was_clamped(),
            containment,
            minions,
        );

        StepOutcome {
            phase,
            containment,
            minions,
            report,
        }
    }

    /// Removal notices from the previous step release the attack target
    fn handle_events(&mut self) {
        self.events.swap();
        let Some(target) = self.avatar.attack_target() else {
            return;
        };

        let removed = self.events.iter().any(|event| match (event, target) {
            (SimEvent::MinionRemoved { id }, TargetRef::Minion(t)) => *id == t,
            (SimEvent::PlayerRemoved { id }, TargetRef::Player(t)) => *id == t,
            _ => false,
        });
        if removed {
            log::debug!("Attack target {target:?} removed");
            self.avatar.move_to_attack_target(None);
            self.avatar.set_path(Path::empty());
            self.events.push(SimEvent::AttackTargetLost { target });
        }
    }

    /// Install a finished background decode, or record its failure.
    ///
    /// Does nothing once the map is ready or has failed.
    pub fn poll_map_load(&mut self, pending: &PendingBitmap) -> OracleStatus {
        if self.nav.status() != OracleStatus::Pending {
            return self.nav.status();
        }

        match pending.try_take() {
            Some(Ok(bitmap)) => self.nav.install_bitmap(bitmap),
            Some(Err(error)) => {
                log::error!("Map {} failed to load: {error}", pending.path().display());
                self.events.push(SimEvent::MapLoadFailed {
                    reason: error.to_string(),
                });
                self.nav.mark_failed(error);
            }
            None => {}
        }
        self.nav.status()
    }

    /// Walk to `destination`; returns the marker position if accepted
    pub fn command_move(&mut self, destination: Vec2) -> Option<Vec2> {
        self.controller
            .command_move(&mut self.avatar, &self.nav, destination)
    }

    /// Start attack-follow on `target`.
    ///
    /// Refused if the avatar cannot move, the target is unknown, or it is a
    /// known ally.
    pub fn command_attack(&mut self, target: TargetRef) -> bool {
        if !self.avatar.can_move() {
            return false;
        }

        let targets = WorldTargets {
            minions: &self.minions,
            players: &self.players,
        };
        if targets.locate(target).is_none() {
            log::debug!("Attack on unknown target {target:?} refused");
            return false;
        }
        if are_allies(self.team, targets.team_of(target)) {
            log::debug!("Attack on ally {target:?} refused");
            return false;
        }

        self.avatar.move_to_attack_target(Some(target));
        true
    }

    /// Stop chasing; the current path is kept
    pub fn stop_attack(&mut self) {
        self.avatar.move_to_attack_target(None);
    }

    /// Set the local player's side
    pub fn set_team(&mut self, team: Option<Team>) {
        self.team = team;
    }

    /// The local player's side
    #[must_use]
    pub fn team(&self) -> Option<Team> {
        self.team
    }

    /// Mark the avatar dead; it stops moving and reporting
    pub fn kill(&mut self) {
        self.avatar.set_dead(true);
        self.avatar.move_to_attack_target(None);
        self.avatar.set_path(Path::empty());
    }

    /// Bring the avatar back at `position`
    pub fn respawn(&mut self, position: Vec2) {
        self.avatar.respawn_at(position);
    }

    /// Forget every minion and remote player, e.g. when leaving a match.
    ///
    /// Removal events go out as usual, so pursuit of any of them ends on the
    /// next step.
    pub fn clear_remote_entities(&mut self) {
        self.minions.clear(&mut self.events);
        self.players.clear(&mut self.events);
    }

    /// Full authoritative minion roster
    pub fn apply_minion_snapshot(&mut self, roster: &[MinionSnapshot]) {
        self.minions.apply_snapshot(roster, &mut self.events);
    }

    /// Newly spawned minions
    pub fn apply_minions_spawned(&mut self, spawned: &[MinionSnapshot]) {
        self.minions.apply_spawned(spawned, &mut self.events);
    }

    /// Incremental minion updates
    pub fn apply_minion_updates(&mut self, updates: &[MinionSnapshot]) {
        self.minions.apply_updates(updates, &mut self.events);
    }

    /// Minion removal notices
    pub fn apply_minions_removed(&mut self, ids: &[MinionId]) {
        self.minions.apply_removed(ids, &mut self.events);
    }

    /// Another player moved or joined
    pub fn upsert_player(&mut self, id: PlayerId, position: Vec2, team: Option<Team>) {
        self.players.upsert(id, position, team);
    }

    /// Another player left
    pub fn remove_player(&mut self, id: PlayerId) -> bool {
        self.players.remove(id, &mut self.events)
    }

    /// Point-in-time view for overlays
    #[must_use]
    pub fn debug_snapshot(&self) -> DebugSnapshot {
        DebugSnapshot {
            position: self.avatar.position(),
            velocity: self.avatar.velocity(),
            yaw: self.avatar.yaw(),
            phase: self.avatar.phase(),
            path: self.avatar.current_path().to_vec(),
            destination: self.avatar.current_destination(),
            attack_target: self.avatar.attack_target(),
            repath_count: self.avatar.repath_count(),
            minion_count: self.minions.len(),
            player_count: self.players.len(),
            oracle: self.nav.status(),
            stats: self.stats.clone(),
        }
    }

    /// Events handled during the last step
    pub fn events(&self) -> impl Iterator<Item = &SimEvent> {
        self.events.iter()
    }

    /// The local avatar
    #[must_use]
    pub fn avatar(&self) -> &MotionState {
        &self.avatar
    }

    /// Mutable access to the local avatar, e.g. for control locks
    pub fn avatar_mut(&mut self) -> &mut MotionState {
        &mut self.avatar
    }

    /// Navigation state
    #[must_use]
    pub fn nav(&self) -> &NavigationContext {
        &self.nav
    }

    /// Minion registry
    #[must_use]
    pub fn minions(&self) -> &MinionRegistry {
        &self.minions
    }

    /// Remote players
    #[must_use]
    pub fn players(&self) -> &RemotePlayers {
        &self.players
    }

    /// Frame clock
    #[must_use]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Lifetime counters
    #[must_use]
    pub fn stats(&self) -> &StepStats {
        &self.stats
    }

    /// Tuning in use
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const DT: f32 = 1.0 / 60.0;

    fn open_sim() -> Simulation {
        Simulation::with_bitmap(
            SimulationConfig::default(),
            WalkabilityBitmap::all_open(200, 200).unwrap(),
            Vec2::ZERO,
        )
    }

    fn wait_for_map(sim: &mut Simulation, pending: &PendingBitmap) -> OracleStatus {
        for _ in 0..400 {
            let status = sim.poll_map_load(pending);
            if status != OracleStatus::Pending {
                return status;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        sim.nav().status()
    }

    #[test]
    fn test_move_produces_reports() {
        let mut sim = open_sim();
        assert!(sim.command_move(Vec2::new(5.0, 0.0)).is_some());

        let reports: Vec<PositionReport> = (0..10).filter_map(|_| sim.step(0.05).report).collect();

        assert!(!reports.is_empty());
        assert_eq!(reports[0].seq, 1);
        assert!(reports.windows(2).all(|w| w[1].seq == w[0].seq + 1));
        assert!(sim.avatar().position().x > 0.0);
    }

    #[test]
    fn test_large_frame_is_clamped_for_motion() {
        let mut sim = open_sim();
        sim.command_move(Vec2::new(20.0, 0.0));

        sim.step(3.0);

        // 9 u/s over the 0.1 s cap
        assert!((sim.avatar().position().x - 0.9).abs() < 1e-3);
        assert_eq!(sim.stats().clamped_steps, 1);
    }

    #[test]
    fn test_removed_target_ends_pursuit() {
        let mut sim = open_sim();
        sim.set_team(Some(Team::Blue));
        sim.apply_minions_spawned(&[
            MinionSnapshot::at(MinionId(1), Vec2::new(20.0, 0.0)).with_team(Team::Red)
        ]);
        assert!(sim.command_attack(TargetRef::Minion(MinionId(1))));

        sim.step(DT);
        assert_eq!(sim.avatar().phase(), MotionPhase::AttackFollowing);
        assert!(!sim.avatar().current_path().is_empty());

        sim.apply_minions_removed(&[MinionId(1)]);
        let outcome = sim.step(DT);

        assert_eq!(outcome.phase, MotionPhase::Idle);
        assert!(sim.avatar().current_path().is_empty());

        sim.step(DT);
        assert!(sim.events().any(|e| matches!(
            e,
            SimEvent::AttackTargetLost {
                target: TargetRef::Minion(MinionId(1))
            }
        )));
    }

    #[test]
    fn test_attack_on_ally_is_refused() {
        let mut sim = open_sim();
        sim.set_team(Some(Team::Red));
        sim.upsert_player(PlayerId(2), Vec2::new(3.0, 3.0), Some(Team::Red));
        sim.upsert_player(PlayerId(3), Vec2::new(6.0, 3.0), None);

        assert!(!sim.command_attack(TargetRef::Player(PlayerId(2))));
        assert!(!sim.command_attack(TargetRef::Player(PlayerId(9))));
        assert!(sim.command_attack(TargetRef::Player(PlayerId(3))));
        assert_eq!(sim.avatar().attack_target(), Some(TargetRef::Player(PlayerId(3))));
    }

    #[test]
    fn test_dead_avatar_is_frozen() {
        let mut sim = open_sim();
        sim.command_move(Vec2::new(5.0, 0.0));
        sim.kill();

        let outcome = sim.step(0.1);

        assert_eq!(sim.avatar().position(), Vec2::ZERO);
        assert!(outcome.report.is_none());
        assert!(sim.command_move(Vec2::new(5.0, 0.0)).is_none());

        sim.respawn(Vec2::new(-5.0, 0.0));
        assert!(sim.command_move(Vec2::new(5.0, 0.0)).is_some());
    }

    #[test]
    fn test_pending_map_loads_in_background() {
        let path = std::env::temp_dir().join(format!("arena_nav_sim_{}.png", std::process::id()));
        image::RgbaImage::from_pixel(200, 200, image::Rgba([0, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let mut sim = Simulation::new(SimulationConfig::default(), Vec2::ZERO);
        assert!(sim.command_move(Vec2::new(5.0, 0.0)).is_none());

        let pending = PendingBitmap::spawn(&path);
        assert_eq!(wait_for_map(&mut sim, &pending), OracleStatus::Ready);
        assert!(sim.command_move(Vec2::new(5.0, 0.0)).is_some());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_map_failure_is_surfaced() {
        let mut sim = Simulation::new(SimulationConfig::default(), Vec2::ZERO);
        let pending = PendingBitmap::spawn("/definitely/not/here/arena.png");

        assert_eq!(wait_for_map(&mut sim, &pending), OracleStatus::Failed);
        sim.step(DT);

        assert!(sim.events().any(|e| matches!(e, SimEvent::MapLoadFailed { .. })));
        // Later polls keep the failure
        assert_eq!(sim.poll_map_load(&pending), OracleStatus::Failed);
    }

    #[test]
    fn test_debug_snapshot_reflects_state() {
        let mut sim = open_sim();
        sim.apply_minion_snapshot(&[
            MinionSnapshot::at(MinionId(1), Vec2::new(1.0, 1.0)),
            MinionSnapshot::at(MinionId(2), Vec2::new(2.0, 1.0)),
        ]);
        sim.command_move(Vec2::new(10.0, 0.0));
        sim.step(DT);

        let snapshot = sim.debug_snapshot();
        assert_eq!(snapshot.phase, MotionPhase::FollowingPath);
        assert_eq!(snapshot.minion_count, 2);
        assert_eq!(snapshot.oracle, OracleStatus::Ready);
        assert_eq!(snapshot.stats.total_steps, 1);
        assert!(snapshot.to_json().unwrap().contains("FollowingPath"));
    }

    #[test]
    fn test_stop_attack_keeps_path() {
        let mut sim = open_sim();
        sim.apply_minions_spawned(&[MinionSnapshot::at(MinionId(4), Vec2::new(15.0, 0.0))]);
        assert!(sim.command_attack(TargetRef::Minion(MinionId(4))));
        sim.step(DT);
        assert!(!sim.avatar().current_path().is_empty());

        sim.stop_attack();
        let outcome = sim.step(DT);

        assert_eq!(sim.avatar().attack_target(), None);
        assert_eq!(outcome.phase, MotionPhase::FollowingPath);
    }

    #[test]
    fn test_clearing_remote_entities_ends_pursuit() {
        let mut sim = open_sim();
        sim.apply_minions_spawned(&[
            MinionSnapshot::at(MinionId(1), Vec2::new(10.0, 0.0)),
            MinionSnapshot::at(MinionId(2), Vec2::new(-10.0, 0.0)),
        ]);
        sim.upsert_player(PlayerId(7), Vec2::new(0.0, 12.0), None);
        assert!(sim.command_attack(TargetRef::Player(PlayerId(7))));
        sim.step(DT);

        sim.clear_remote_entities();
        assert!(sim.minions().is_empty());
        assert!(sim.players().is_empty());

        let outcome = sim.step(DT);
        assert_eq!(outcome.phase, MotionPhase::Idle);
        assert!(sim.events().any(|e| matches!(e, SimEvent::PlayerRemoved { id: PlayerId(7) })));
        assert_eq!(
            sim.events()
                .filter(|e| matches!(e, SimEvent::MinionRemoved { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn test_respawn_point_becomes_safe_fallback() {
        // Everything west of x = -30 is solid, far beyond the ring search
        let bitmap =
            WalkabilityBitmap::from_fn(200, 200, |u, _| if u < 40 { 255 } else { 0 }).unwrap();
        let mut sim = Simulation::with_bitmap(SimulationConfig::default(), bitmap, Vec2::ZERO);
        sim.step(DT);
        sim.kill();

        let respawn = Vec2::new(-40.0, 0.0);
        sim.respawn(respawn);
        let outcome = sim.step(DT);

        assert_eq!(
            outcome.containment,
            Containment::Reverted {
                from: respawn,
                to: respawn
            }
        );
        assert_eq!(sim.avatar().position(), respawn);
    }
}
