//! Simulation events
//!
//! Subsystems push notices into an [`EventQueue`] while they run; the
//! simulation reads them at the start of the next step. Removal notices
//! therefore reach attack targeting in one consistent place, whichever
//! handler produced them.

use glam::Vec2;

use crate::sync::{MinionId, PlayerId, TargetRef};

// ============================================================================
// Event Types
// ============================================================================

/// Something another subsystem needs to hear about
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SimEvent {
    // -------------------------------------------------------------------------
    // Remote entity lifecycle
    // -------------------------------------------------------------------------
    /// A minion was seen for the first time.
    MinionSpawned {
        /// Server identity
        id: MinionId,
    },

    /// A minion left the roster.
    MinionRemoved {
        /// Server identity
        id: MinionId,
    },

    /// A remote player left.
    PlayerRemoved {
        /// Server identity
        id: PlayerId,
    },

    // -------------------------------------------------------------------------
    // Local avatar
    // -------------------------------------------------------------------------
    /// Attack-follow ended because the target disappeared.
    AttackTargetLost {
        /// The target that was being chased
        target: TargetRef,
    },

    /// Containment moved the avatar off impassable ground.
    EntityUnstuck {
        /// Position that failed the walkability test
        from: Vec2,
        /// Position after correction
        to: Vec2,
        /// True if no nearby spot was found and the last safe spot was used
        reverted: bool,
    },

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------
    /// The walkability bitmap could not be loaded.
    MapLoadFailed {
        /// Human readable cause
        reason: String,
    },
}

/// Events written during one step, read during the next
#[derive(Debug, Default)]
pub struct EventQueue {
    incoming: Vec<SimEvent>,
    current: Vec<SimEvent>,
}

impl EventQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event; it becomes readable after the next [`swap`](Self::swap)
    pub fn push(&mut self, event: SimEvent) {
        self.incoming.push(event);
    }

    /// Step boundary: last step's events become readable, older ones drop
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.incoming, &mut self.current);
        self.incoming.clear();
    }

    /// Events readable this step, in push order
    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.current.iter()
    }
}
