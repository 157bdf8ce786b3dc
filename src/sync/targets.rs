//! Attack target references and their lookup
//!
//! The motion controller holds a [`TargetRef`] rather than a position so it
//! can chase a target that keeps moving. Each tick the reference is resolved
//! through a [`TargetLocator`].

use glam::Vec2;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::{MinionRegistry, Team};
use crate::core::{EventQueue, SimEvent};

/// Server identity of a minion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MinionId(pub u32);

/// Server identity of another player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

/// A live reference to something that can be attacked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetRef {
    /// A server-driven minion
    Minion(MinionId),
    /// Another player's avatar
    Player(PlayerId),
}

/// Resolves target references to their current state
pub trait TargetLocator {
    /// Current planar position, `None` if the target no longer exists
    fn locate(&self, target: TargetRef) -> Option<Vec2>;

    /// Team of the target, if known
    fn team_of(&self, _target: TargetRef) -> Option<Team> {
        None
    }
}

impl TargetLocator for FxHashMap<TargetRef, Vec2> {
    fn locate(&self, target: TargetRef) -> Option<Vec2> {
        self.get(&target).copied()
    }
}

/// Another player's avatar as last reported by the server
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePlayer {
    /// Identity
    pub id: PlayerId,
    /// Last reported position
    pub position: Vec2,
    /// Side, if known
    pub team: Option<Team>,
}

/// Remote player avatars keyed by id
#[derive(Debug, Default)]
pub struct RemotePlayers {
    players: FxHashMap<PlayerId, RemotePlayer>,
}

impl RemotePlayers {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or move a player; positions snap
    pub fn upsert(&mut self, id: PlayerId, position: Vec2, team: Option<Team>) {
        self.players
            .entry(id)
            .and_modify(|p| {
                p.position = position;
                if team.is_some() {
                    p.team = team;
                }
            })
            .or_insert(RemotePlayer { id, position, team });
    }

    /// Remove a player, announcing it so dependants can let go
    pub fn remove(&mut self, id: PlayerId, events: &mut EventQueue) -> bool {
        if self.players.remove(&id).is_some() {
            events.push(SimEvent::PlayerRemoved { id });
            true
        } else {
            false
        }
    }

    /// Look up a player
    #[must_use]
    pub fn get(&self, id: PlayerId) -> Option<&RemotePlayer> {
        self.players.get(&id)
    }

    /// Number of tracked players
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Check if no players are tracked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Remove every player, announcing each removal
    pub fn clear(&mut self, events: &mut EventQueue) {
        for id in self.players.keys() {
            events.push(SimEvent::PlayerRemoved { id: *id });
        }
        self.players.clear();
    }
}

/// Target lookup across minions and remote players
#[derive(Debug, Clone, Copy)]
pub struct WorldTargets<'a> {
    /// Minion registry
    pub minions: &'a MinionRegistry,
    /// Remote player registry
    pub players: &'a RemotePlayers,
}

impl TargetLocator for WorldTargets<'_> {
    fn locate(&self, target: TargetRef) -> Option<Vec2> {
        match target {
            TargetRef::Minion(id) => self.minions.get(id).map(|m| m.position),
            TargetRef::Player(id) => self.players.get(id).map(|p| p.position),
        }
    }

    fn team_of(&self, target: TargetRef) -> Option<Team> {
        match target {
            TargetRef::Minion(id) => self.minions.get(id).and_then(|m| m.team),
            TargetRef::Player(id) => self.players.get(id).and_then(|p| p.team),
        }
    }
}
