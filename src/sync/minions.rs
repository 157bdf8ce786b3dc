//! Client-side interpolation of server-driven minions
//!
//! The server owns minion state. Between its snapshots each minion is
//! steered toward a short-horizon prediction of where the server will put
//! it, and corrected outright when the local copy goes stale.

use glam::Vec2;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::{InterpolationConfig, MinionId, TargetRef, Team};
use crate::core::{EventQueue, SimEvent};
use crate::motion::step_toward;

/// Unit archetype reported by the server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// Close-range lane unit
    #[default]
    Melee,
    /// Ranged lane unit
    Ranged,
    /// Slow heavy unit
    Siege,
}

/// One minion's authoritative state as delivered by the network layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinionSnapshot {
    /// Identity
    pub id: MinionId,
    /// Side, if the server sent one
    #[serde(default)]
    pub team: Option<Team>,
    /// Archetype
    #[serde(default)]
    pub kind: UnitKind,
    /// Reported position; absent positions leave the proxy without a target
    #[serde(default)]
    pub position: Option<Vec2>,
    /// Reported velocity
    #[serde(default)]
    pub velocity: Vec2,
    /// Movement speed, when the server includes it
    #[serde(default)]
    pub speed: Option<f32>,
    /// Whether the minion reached the end of its lane
    #[serde(default)]
    pub arrived: bool,
    /// What the minion is fighting, if anything
    #[serde(default)]
    pub combat_target: Option<TargetRef>,
}

impl MinionSnapshot {
    /// Snapshot of a stationary minion at `position`
    #[must_use]
    pub fn at(id: MinionId, position: Vec2) -> Self {
        Self {
            id,
            team: None,
            kind: UnitKind::default(),
            position: Some(position),
            velocity: Vec2::ZERO,
            speed: None,
            arrived: false,
            combat_target: None,
        }
    }

    /// Set the reported velocity
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the reported team
    #[must_use]
    pub fn with_team(mut self, team: Team) -> Self {
        self.team = Some(team);
        self
    }

    /// Set the reported speed
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }
}

/// Local visual state of one remote minion
#[derive(Debug, Clone, PartialEq)]
pub struct MinionProxy {
    /// Identity
    pub id: MinionId,
    /// Side, if known
    pub team: Option<Team>,
    /// Archetype
    pub kind: UnitKind,
    /// Where the minion is drawn
    pub position: Vec2,
    /// Smoothed velocity estimate
    pub velocity: Vec2,
    /// Predicted position the visual chases; `None` until a position arrives
    pub target: Option<Vec2>,
    /// Movement speed used for catch-up steps
    pub speed: f32,
    /// Registry clock time of the last authoritative data
    pub last_update: f64,
    /// Server says the minion finished its lane
    pub arrived: bool,
    /// What the minion is fighting
    pub combat_target: Option<TargetRef>,
}

impl MinionProxy {
    fn spawn(id: MinionId, default_speed: f32, now: f64) -> Self {
        Self {
            id,
            team: None,
            kind: UnitKind::default(),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            target: None,
            speed: default_speed,
            last_update: now,
            arrived: false,
            combat_target: None,
        }
    }

    /// Distance between the drawn position and the predicted target
    #[must_use]
    pub fn gap(&self) -> f32 {
        self.target.map_or(0.0, |t| t.distance(self.position))
    }
}

/// What a per-tick advance did, for telemetry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InterpolationStats {
    /// Minions stepped toward their target
    pub stepped: usize,
    /// Stale minions set straight onto their target
    pub soft_corrections: usize,
    /// Stale minions teleported across a large gap
    pub hard_snaps: usize,
}

/// Registry of minion proxies
#[derive(Debug)]
pub struct MinionRegistry {
    config: InterpolationConfig,
    entries: FxHashMap<MinionId, MinionProxy>,
    /// Seconds advanced through `update_minions`
    clock: f64,
}

impl MinionRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new(config: InterpolationConfig) -> Self {
        Self {
            config,
            entries: FxHashMap::default(),
            clock: 0.0,
        }
    }

    /// Look up a minion
    #[must_use]
    pub fn get(&self, id: MinionId) -> Option<&MinionProxy> {
        self.entries.get(&id)
    }

    /// All tracked minions, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &MinionProxy> {
        self.entries.values()
    }

    /// Number of tracked minions
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no minions are tracked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registry clock in seconds
    #[must_use]
    pub fn now(&self) -> f64 {
        self.clock
    }

    /// Interpolation settings
    #[must_use]
    pub fn config(&self) -> &InterpolationConfig {
        &self.config
    }

    /// Apply the authoritative roster.
    ///
    /// Listed minions snap to their reported state; tracked minions missing
    /// from the roster are removed.
    pub fn apply_snapshot(&mut self, roster: &[MinionSnapshot], events: &mut EventQueue) {
        for snapshot in roster {
            self.upsert(snapshot, true, events);
        }

        let mut gone: Vec<MinionId> = self
            .entries
            .keys()
            .filter(|id| !roster.iter().any(|s| s.id == **id))
            .copied()
            .collect();
        gone.sort_unstable();
        self.apply_removed(&gone, events);
    }

    /// Newly spawned minions; they start exactly where reported
    pub fn apply_spawned(&mut self, spawned: &[MinionSnapshot], events: &mut EventQueue) {
        for snapshot in spawned {
            self.upsert(snapshot, true, events);
        }
    }

    /// Incremental updates; known minions blend, unknown ones spawn
    pub fn apply_updates(&mut self, updates: &[MinionSnapshot], events: &mut EventQueue) {
        for snapshot in updates {
            let known = self.entries.contains_key(&snapshot.id);
            self.upsert(snapshot, !known, events);
        }
    }

    /// Explicit removal notices
    pub fn apply_removed(&mut self, ids: &[MinionId], events: &mut EventQueue) {
        for id in ids {
            if self.entries.remove(id).is_some() {
                log::debug!("Minion {} removed", id.0);
                events.push(SimEvent::MinionRemoved { id: *id });
            }
        }
    }

    /// Drop every minion, announcing each removal
    pub fn clear(&mut self, events: &mut EventQueue) {
        let mut ids: Vec<MinionId> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        self.apply_removed(&ids, events);
    }

    fn upsert(&mut self, snapshot: &MinionSnapshot, snap: bool, events: &mut EventQueue) {
        let now = self.clock;
        let config = &self.config;
        let entry = self.entries.entry(snapshot.id).or_insert_with(|| {
            events.push(SimEvent::MinionSpawned { id: snapshot.id });
            MinionProxy::spawn(snapshot.id, config.default_speed, now)
        });

        entry.team = snapshot.team;
        entry.kind = snapshot.kind;
        entry.arrived = snapshot.arrived;
        entry.combat_target = snapshot.combat_target;
        if let Some(speed) = snapshot.speed.filter(|s| s.is_finite() && *s > 0.0) {
            entry.speed = speed;
        }
        entry.last_update = now;

        if snap {
            entry.velocity = snapshot.velocity;
            if let Some(reported) = snapshot.position {
                entry.position = reported;
                entry.target = Some(reported + entry.velocity * config.prediction_horizon);
            }
            return;
        }

        entry.velocity = entry
            .velocity
            .lerp(snapshot.velocity, config.velocity_blend);
        if let Some(reported) = snapshot.position {
            let fresh = reported + entry.velocity * config.prediction_horizon;
            entry.target = Some(match entry.target {
                Some(previous) => previous.lerp(fresh, config.target_blend),
                None => fresh,
            });
        }
    }

    /// Advance every proxy by one frame
    pub fn update_minions(&mut self, delta: f32) -> InterpolationStats {
        let mut stats = InterpolationStats::default();
        if delta <= 0.0 {
            return stats;
        }
        self.clock += f64::from(delta);

        let config = &self.config;
        let hitch = delta > config.max_frame_delta;
        let settle_sq = config.settle_distance * config.settle_distance;

        for entry in self.entries.values_mut() {
            let Some(target) = entry.target else {
                continue;
            };
            let gap_sq = entry.position.distance_squared(target);
            let stale = self.clock - entry.last_update > f64::from(config.stale_after);

            if stale || hitch {
                if gap_sq > config.snap_distance * config.snap_distance {
                    log::debug!(
                        "Minion {} desynced by {:.2}, snapping",
                        entry.id.0,
                        gap_sq.sqrt()
                    );
                    entry.position = target;
                    stats.hard_snaps += 1;
                } else {
                    if gap_sq >= settle_sq {
                        stats.soft_corrections += 1;
                    }
                    entry.position = target;
                    entry.velocity *= 0.5;
                }
                continue;
            }

            if gap_sq < settle_sq {
                entry.position = target;
                continue;
            }

            let max_step = entry.speed * delta * config.catch_up_multiplier;
            entry.position = step_toward(entry.position, target, max_step);
            stats.stepped += 1;
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> (MinionRegistry, EventQueue) {
        (
            MinionRegistry::new(InterpolationConfig::default()),
            EventQueue::new(),
        )
    }

    #[test]
    fn test_spawn_snaps_to_reported_position() {
        let (mut reg, mut events) = registry();
        reg.apply_spawned(
            &[MinionSnapshot::at(MinionId(1), Vec2::new(4.0, -2.0)).with_velocity(Vec2::X)],
            &mut events,
        );

        let m = reg.get(MinionId(1)).unwrap();
        assert_eq!(m.position, Vec2::new(4.0, -2.0));
        assert_eq!(m.velocity, Vec2::X);
        let target = m.target.unwrap();
        assert!((target.x - 4.2).abs() < 1e-5);

        events.swap();
        assert!(matches!(
            events.iter().next(),
            Some(SimEvent::MinionSpawned { id: MinionId(1) })
        ));
    }

    #[test]
    fn test_advance_is_step_limited_and_never_overshoots() {
        let (mut reg, mut events) = registry();
        reg.apply_spawned(
            &[MinionSnapshot::at(MinionId(1), Vec2::ZERO).with_velocity(Vec2::X)],
            &mut events,
        );
        let cfg = reg.config().clone();
        let target = reg.get(MinionId(1)).unwrap().target.unwrap();

        reg.update_minions(0.1);

        let m = reg.get(MinionId(1)).unwrap();
        let limit = cfg.default_speed * 0.1 * cfg.catch_up_multiplier;
        assert!(m.position.length() <= limit + 1e-5);
        assert!(m.position.x <= target.x + 1e-5);
        assert!(m.position.distance(target) < 1e-4);
    }

    #[test]
    fn test_slow_minion_moves_exactly_one_step() {
        let (mut reg, mut events) = registry();
        reg.apply_spawned(
            &[MinionSnapshot::at(MinionId(2), Vec2::ZERO)
                .with_velocity(Vec2::new(0.0, 10.0))
                .with_speed(1.0)],
            &mut events,
        );

        let stats = reg.update_minions(0.1);

        let m = reg.get(MinionId(2)).unwrap();
        let expected = 1.0 * 0.1 * reg.config().catch_up_multiplier;
        assert!((m.position.y - expected).abs() < 1e-5);
        assert_eq!(stats.stepped, 1);
    }

    #[test]
    fn test_incremental_update_blends() {
        let (mut reg, mut events) = registry();
        reg.apply_spawned(&[MinionSnapshot::at(MinionId(1), Vec2::ZERO)], &mut events);

        reg.apply_updates(
            &[MinionSnapshot::at(MinionId(1), Vec2::new(2.0, 0.0)).with_velocity(Vec2::new(2.0, 0.0))],
            &mut events,
        );

        let m = reg.get(MinionId(1)).unwrap();
        // Position is not snapped by an incremental update
        assert_eq!(m.position, Vec2::ZERO);
        // Velocity moved part of the way toward the report
        assert!(m.velocity.x > 0.0 && m.velocity.x < 2.0);
        let target = m.target.unwrap();
        assert!(target.x > 0.0 && target.x < 2.0 + 2.0 * reg.config().prediction_horizon);
    }

    #[test]
    fn test_update_for_unknown_id_spawns() {
        let (mut reg, mut events) = registry();
        reg.apply_updates(&[MinionSnapshot::at(MinionId(5), Vec2::new(1.0, 1.0))], &mut events);

        assert_eq!(reg.get(MinionId(5)).unwrap().position, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_stale_large_gap_teleports_to_target() {
        let (mut reg, mut events) = registry();
        reg.apply_spawned(&[MinionSnapshot::at(MinionId(1), Vec2::ZERO)], &mut events);
        reg.apply_updates(&[MinionSnapshot::at(MinionId(1), Vec2::new(20.0, 0.0))], &mut events);

        // Fresh data: ordinary catch-up steps
        assert_eq!(reg.update_minions(0.2).stepped, 1);
        assert_eq!(reg.update_minions(0.2).stepped, 1);
        let target = reg.get(MinionId(1)).unwrap().target.unwrap();
        assert!(reg.get(MinionId(1)).unwrap().gap() > reg.config().snap_distance);

        // Past the staleness threshold with a wide gap
        let third = reg.update_minions(0.2);

        assert_eq!(third.hard_snaps, 1);
        assert_eq!(reg.get(MinionId(1)).unwrap().position, target);
    }

    #[test]
    fn test_stale_small_gap_soft_corrects_and_halves_velocity() {
        let (mut reg, mut events) = registry();
        reg.apply_spawned(
            &[MinionSnapshot::at(MinionId(1), Vec2::ZERO)
                .with_velocity(Vec2::new(4.0, 0.0))
                .with_speed(0.5)],
            &mut events,
        );
        // Slow speed keeps a gap open while the data goes stale
        reg.update_minions(0.2);
        reg.update_minions(0.2);
        let before = reg.get(MinionId(1)).unwrap().clone();
        assert!(before.gap() > 0.0 && before.gap() < reg.config().snap_distance);

        let stats = reg.update_minions(0.2);

        let m = reg.get(MinionId(1)).unwrap();
        assert_eq!(stats.soft_corrections, 1);
        assert_eq!(Some(m.position), m.target);
        assert!((m.velocity.x - before.velocity.x * 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_oversized_frame_counts_as_desync() {
        let (mut reg, mut events) = registry();
        reg.apply_spawned(&[MinionSnapshot::at(MinionId(1), Vec2::ZERO)], &mut events);
        reg.apply_updates(&[MinionSnapshot::at(MinionId(1), Vec2::new(30.0, 0.0))], &mut events);
        let target = reg.get(MinionId(1)).unwrap().target.unwrap();

        let stats = reg.update_minions(2.0);

        assert_eq!(stats.hard_snaps, 1);
        assert_eq!(reg.get(MinionId(1)).unwrap().position, target);
    }

    #[test]
    fn test_no_target_never_moves() {
        let (mut reg, mut events) = registry();
        let mut snapshot = MinionSnapshot::at(MinionId(1), Vec2::ZERO);
        snapshot.position = None;
        reg.apply_spawned(&[snapshot], &mut events);

        reg.update_minions(0.1);
        reg.update_minions(5.0);

        let m = reg.get(MinionId(1)).unwrap();
        assert_eq!(m.position, Vec2::ZERO);
        assert!(m.target.is_none());
    }

    #[test]
    fn test_full_snapshot_reconciles_roster() {
        let (mut reg, mut events) = registry();
        reg.apply_spawned(
            &[
                MinionSnapshot::at(MinionId(1), Vec2::ZERO),
                MinionSnapshot::at(MinionId(2), Vec2::ONE),
            ],
            &mut events,
        );
        events.swap();

        reg.apply_snapshot(
            &[
                MinionSnapshot::at(MinionId(2), Vec2::new(3.0, 3.0)),
                MinionSnapshot::at(MinionId(3), Vec2::new(-1.0, 0.0)),
            ],
            &mut events,
        );
        events.swap();

        assert!(reg.get(MinionId(1)).is_none());
        assert_eq!(reg.get(MinionId(2)).unwrap().position, Vec2::new(3.0, 3.0));
        assert_eq!(reg.get(MinionId(3)).unwrap().position, Vec2::new(-1.0, 0.0));

        let removed: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                SimEvent::MinionRemoved { id } => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(removed, vec![MinionId(1)]);
    }

    #[test]
    fn test_speed_falls_back_to_last_known() {
        let (mut reg, mut events) = registry();
        reg.apply_spawned(
            &[MinionSnapshot::at(MinionId(1), Vec2::ZERO).with_speed(4.0)],
            &mut events,
        );
        let mut update = MinionSnapshot::at(MinionId(1), Vec2::ONE);
        update.speed = Some(f32::NAN);
        reg.apply_updates(&[update], &mut events);

        assert!((reg.get(MinionId(1)).unwrap().speed - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_snapshot_deserializes_with_defaults() {
        let json = r#"{"id":9,"team":"red","position":[1.5,2.0],"velocity":[0.0,1.0]}"#;
        let snapshot: MinionSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(snapshot.id, MinionId(9));
        assert_eq!(snapshot.team, Some(Team::Red));
        assert_eq!(snapshot.kind, UnitKind::Melee);
        assert_eq!(snapshot.position, Some(Vec2::new(1.5, 2.0)));
        assert!(!snapshot.arrived);
    }
}
