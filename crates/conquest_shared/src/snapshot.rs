//! Persisted war snapshot wire format.
//!
//! This is the external interface of the persistence layer: a single
//! self-describing JSON document holding the war mode flags, every occupied
//! cell grouped by the occupying faction's name, and every in-flight attack
//! with its progress. Saving and then loading must reproduce an equivalent
//! in-memory state, modulo records whose backing region no longer exists.
//!
//! Document layout:
//!
//! ```json
//! {
//!   "warEnabled": true,
//!   "annexationAllowed": false,
//!   "borderOnly": false,
//!   "destructionAllowed": false,
//!   "occupied": { "veldt": [0, 1, 2, 3] },
//!   "attacks": [
//!     { "attackerId": 77, "cellCoord": [2, 3],
//!       "markerCoord": [40, 64, 55], "progressTicks": 120 }
//!   ]
//! }
//! ```
//!
//! Occupied cell lists are interleaved `[x0, z0, x1, z1, ...]` pairs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::coord::Coord;

/// One in-flight attack, as persisted.
///
/// Only primary state is stored; required duration and the no-build volume
/// are recomputed from the region and marker position on load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackRecord {
    /// Attacking player's raw id. The player's faction is resolved through
    /// the faction directory on load.
    pub attacker_id: u64,
    /// Target cell `[x, z]`.
    pub cell_coord: [i32; 2],
    /// Marker anchor block `[x, y, z]`.
    pub marker_coord: [i32; 3],
    /// Elapsed progress in scheduler ticks.
    pub progress_ticks: u64,
}

/// The complete persisted war state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarSnapshot {
    /// Whether war was enabled when the snapshot was taken.
    pub war_enabled: bool,
    /// Whether captured regions may be annexed.
    pub annexation_allowed: bool,
    /// Whether only border regions may be attacked.
    pub border_only: bool,
    /// Whether block destruction is permitted during war.
    pub destruction_allowed: bool,
    /// Occupied cells per occupying faction name, as interleaved
    /// `[x, z]` coordinate pairs. A `BTreeMap` keeps the document stable
    /// across saves.
    #[serde(default)]
    pub occupied: BTreeMap<String, Vec<i32>>,
    /// Every in-flight attack.
    #[serde(default)]
    pub attacks: Vec<AttackRecord>,
}

impl WarSnapshot {
    /// Appends an occupied cell under the given faction name.
    pub fn push_occupied(&mut self, faction: &str, cell: Coord) {
        let list = self.occupied.entry(faction.to_owned()).or_default();
        list.push(cell.x);
        list.push(cell.z);
    }

    /// Iterates the occupied cells recorded for one faction. Trailing
    /// unpaired values (a truncated document) are ignored.
    pub fn occupied_cells(&self, faction: &str) -> impl Iterator<Item = Coord> + '_ {
        self.occupied
            .get(faction)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .chunks_exact(2)
            .map(|pair| Coord::new(pair[0], pair[1]))
    }

    /// Total number of occupied cells across all factions.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.occupied.values().map(|list| list.len() / 2).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupied_interleaving() {
        let mut snap = WarSnapshot::default();
        snap.push_occupied("veldt", Coord::new(0, 1));
        snap.push_occupied("veldt", Coord::new(2, 3));
        snap.push_occupied("mire", Coord::new(-4, 5));

        assert_eq!(snap.occupied["veldt"], vec![0, 1, 2, 3]);
        assert_eq!(snap.occupied_count(), 3);
        let cells: Vec<Coord> = snap.occupied_cells("veldt").collect();
        assert_eq!(cells, vec![Coord::new(0, 1), Coord::new(2, 3)]);
    }

    #[test]
    fn test_document_round_trip() {
        let mut snap = WarSnapshot {
            war_enabled: true,
            annexation_allowed: true,
            border_only: false,
            destruction_allowed: false,
            ..WarSnapshot::default()
        };
        snap.push_occupied("veldt", Coord::new(7, -2));
        snap.attacks.push(AttackRecord {
            attacker_id: 42,
            cell_coord: [2, 3],
            marker_coord: [40, 64, 55],
            progress_ticks: 120,
        });

        let text = serde_json::to_string(&snap).unwrap();
        let back: WarSnapshot = serde_json::from_str(&text).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn test_field_names_are_camel_case() {
        let snap = WarSnapshot {
            war_enabled: true,
            ..WarSnapshot::default()
        };
        let text = serde_json::to_string(&snap).unwrap();
        assert!(text.contains("\"warEnabled\""));
        assert!(text.contains("\"annexationAllowed\""));
        assert!(text.contains("\"borderOnly\""));
        assert!(text.contains("\"destructionAllowed\""));
    }

    #[test]
    fn test_missing_sections_default_empty() {
        let back: WarSnapshot = serde_json::from_str(
            "{\"warEnabled\":false,\"annexationAllowed\":false,\
             \"borderOnly\":false,\"destructionAllowed\":false}",
        )
        .unwrap();
        assert!(back.occupied.is_empty());
        assert!(back.attacks.is_empty());
    }
}
