//! # Engine Error Types
//!
//! Two distinct taxonomies:
//!
//! - [`LegalityError`]: user-caused, expected, reported to the initiating
//!   player verbatim. Never logged as a fault.
//! - [`PersistenceError`]: snapshot I/O failed. Logged and recovered from
//!   (cold start on read, retry on write), never fatal.
//!
//! Internal inconsistencies (a region vanishing under an in-flight attack)
//! are not errors at the API surface; the engine logs a warning and treats
//! them as implicit cancellation.

use thiserror::Error;

/// Reasons an attack may not be started.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegalityError {
    /// War mode is currently disabled.
    #[error("war is not enabled")]
    WarDisabled,

    /// The target region has no owning faction.
    #[error("target region has no owner and cannot be attacked")]
    NotEnemyTerritory,

    /// The target faction is on the global blacklist.
    #[error("this faction cannot be attacked")]
    FactionBlocked,

    /// Whitelist mode is active and the target (or the attacker) is not on
    /// it.
    #[error("this faction is not on the war whitelist")]
    FactionNotWhitelisted,

    /// The cell already has an attack in progress.
    #[error("cell is already under attack")]
    AlreadyUnderAttack,

    /// The cell is already held by the attacker or its allies.
    #[error("cell is already captured by your faction or its allies")]
    AlreadyCaptured,

    /// The cell is not a legitimate enemy target.
    #[error("cell does not belong to an enemy")]
    NotEnemy,

    /// Border-only mode is active and the region is not a border region.
    #[error("only border regions can be attacked")]
    NotBorderRegion,

    /// No adjacent cell is ungoverned or favorable to the attacker.
    #[error("cell is not at an attackable edge")]
    CellNotAtEdge,

    /// No vertical room for the marker stack at the anchor.
    #[error("marker placement is too high")]
    PlacementTooHigh,

    /// The marker anchor has no unobstructed sky access.
    #[error("marker must be able to see the sky")]
    SkyBlocked,

    /// The player is already running the maximum number of concurrent
    /// attacks.
    #[error("you cannot attack any more cells at the same time")]
    TooManyAttacks,

    /// An external rule vetoed the attack.
    #[error("attack was cancelled by an external rule")]
    CustomVeto,
}

/// Result type for legality decisions.
pub type LegalityResult<T> = Result<T, LegalityError>;

/// Errors raised by snapshot save/load.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Reading or writing the snapshot file failed.
    #[error("snapshot io failed: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot file exists but does not parse.
    #[error("malformed snapshot: {0}")]
    Malformed(String),
}

/// Result type for persistence operations.
pub type PersistenceResult<T> = Result<T, PersistenceError>;
