//! # CONQUEST Core Engine
//!
//! Territorial conquest for a persistent shared world: a player plants a
//! marker in a contested cell to start a timed attack; if the marker
//! survives for the required duration, the cell - and, when the cell is a
//! region's core, the whole region - falls to the attacker's faction.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────────────────────┐
//!                 │      ConquestEngine          │
//!                 │  (authoritative thread only) │
//!                 │                              │
//!                 │  WorldMap  FactionDirectory  │
//!                 │  attack indexes  occupied set│
//!                 │  event queue   dirty flag    │
//!                 └──────┬──────────────▲────────┘
//!                        │ spawn        │ EngineTask
//!                        ▼              │ (crossbeam channel)
//!                 ┌──────────────┐      │
//!                 │ attack timers│──────┘
//!                 │ (one thread  │   FinishAttack / RepaintMarker
//!                 │  per attack) │
//!                 └──────────────┘
//!                        ┌──────────────┐   ┌───────────────┐
//!                        │ save debounce│──▶│ snapshot      │
//!                        │ thread       │   │ writer thread │
//!                        └──────────────┘   └───────────────┘
//! ```
//!
//! ## Threading Rules
//!
//! 1. **One writer**: all domain state (regions, cells, factions, attack
//!    indexes) is owned by [`ConquestEngine`] and mutated only on the
//!    thread that calls [`ConquestEngine::pump`].
//! 2. **Timers send tasks**: a timer thread never touches domain state; it
//!    increments its attack's progress atomics and submits work over the
//!    task channel.
//! 3. **Copy then hand off**: persistence works from a snapshot copied on
//!    the authoritative thread, never from live references.

pub mod attack;
pub mod config;
pub mod engine;
pub mod error;
pub mod faction;
pub mod legality;
pub mod marker;
pub mod persist;
pub mod scheduler;
pub mod territory;

pub use attack::{Attack, ExclusionVolume};
pub use config::WarConfig;
pub use engine::{AttackHook, ConquestEngine, WarState, WarStatus};
pub use error::{LegalityError, LegalityResult, PersistenceError, PersistenceResult};
pub use faction::{Faction, FactionDirectory, Federation};
pub use marker::{MarkerBackend, OpenSkyMarker};
pub use scheduler::{EngineTask, TimerHandle, TimerState, PROGRESS_STAGES};
pub use territory::{CellState, Region, WorldMap};
