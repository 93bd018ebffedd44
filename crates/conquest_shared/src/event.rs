//! Outbound engine events.
//!
//! The authoritative thread pushes these onto an explicit queue as it
//! mutates territory state; the host drains the queue after each pump and
//! dispatches to the messaging/UI collaborators. There is no listener
//! registration - consumers pull.

use crate::coord::Coord;
use crate::id::{AttackId, FactionId, PlayerId, RegionId};

/// Why an attack ended without capturing its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelReason {
    /// The marker was destroyed or the attack was cancelled by a
    /// collaborator (the cell was defended).
    Defended,
    /// An external rule vetoed the capture at finalization time.
    Vetoed,
    /// The region's core cell fell to another attack, cancelling every
    /// attack in the region.
    Superseded,
    /// War was disabled while the attack was in flight.
    WarDisabled,
    /// The backing cell or region no longer resolves (world reloaded).
    InconsistentState,
}

/// Events emitted by the conquest engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConquestEvent {
    /// An attack was legally started.
    AttackStarted {
        /// The attack handle.
        attack: AttackId,
        /// Attacking player.
        player: PlayerId,
        /// Attacking faction.
        faction: FactionId,
        /// Cell under attack.
        cell: Coord,
    },

    /// An attack ended without a capture.
    AttackCancelled {
        /// The attack handle.
        attack: AttackId,
        /// Attacking player.
        player: PlayerId,
        /// Attacking faction.
        faction: FactionId,
        /// Cell that was under attack.
        cell: Coord,
        /// Why the attack ended.
        reason: CancelReason,
    },

    /// A region's core cell fell to an outside faction; the region is now
    /// occupied and eligible for annexation.
    RegionCaptured {
        /// The captured region.
        region: RegionId,
        /// The new occupier.
        by: FactionId,
        /// The region's owner at capture time, if any.
        from: Option<FactionId>,
    },

    /// A region's core cell was recaptured by its owner's side; the
    /// occupier was expelled.
    RegionLiberated {
        /// The liberated region.
        region: RegionId,
        /// The liberating faction.
        by: FactionId,
        /// The occupier that was expelled, if any.
        from: Option<FactionId>,
    },

    /// A non-core cell was captured and is now held by force.
    CellCaptured {
        /// The captured cell.
        cell: Coord,
        /// The new holder.
        by: FactionId,
        /// The owning faction of the cell's region, if any.
        from: Option<FactionId>,
    },

    /// A non-core cell was recovered by its own side.
    CellLiberated {
        /// The liberated cell.
        cell: Coord,
        /// The liberating faction.
        by: FactionId,
        /// The faction dislodged from the cell, if any.
        from: Option<FactionId>,
    },
}

impl ConquestEvent {
    /// Returns the cell this event is anchored to, if it concerns a single
    /// cell.
    #[must_use]
    pub const fn cell(&self) -> Option<Coord> {
        match self {
            Self::AttackStarted { cell, .. }
            | Self::AttackCancelled { cell, .. }
            | Self::CellCaptured { cell, .. }
            | Self::CellLiberated { cell, .. } => Some(*cell),
            Self::RegionCaptured { .. } | Self::RegionLiberated { .. } => None,
        }
    }
}
