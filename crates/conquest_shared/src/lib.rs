//! # CONQUEST Shared Types
//!
//! Leaf types shared between the conquest engine and its collaborators:
//!
//! - **Coordinates**: cell grid coordinates and world block positions
//! - **Identifiers**: newtypes for players, factions, federations, regions
//!   and attacks
//! - **Events**: the outbound event queue payloads drained by messaging/UI
//!   collaborators
//! - **Snapshot**: the persisted war snapshot wire format
//!
//! Collaborators on either side of the engine (command layer, messaging,
//! persistence) must agree on these definitions, so nothing in this crate
//! may depend on engine internals.

pub mod coord;
pub mod event;
pub mod id;
pub mod snapshot;

pub use coord::{BlockPos, Coord, CELL_SIZE};
pub use event::{CancelReason, ConquestEvent};
pub use id::{AttackId, FactionId, FederationId, PlayerId, RegionId};
pub use snapshot::{AttackRecord, WarSnapshot};
