//! War configuration.
//!
//! Loaded once at startup from a TOML file; every field has a default so a
//! partial file (or none at all) still yields a working engine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PersistenceError, PersistenceResult};

/// Tunable parameters for the conquest engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WarConfig {
    /// Base attack duration, in scheduler ticks.
    pub cell_attack_ticks: u64,

    /// Duration multiplier for regions bordering ungoverned space.
    pub frontier_multiplier: f64,

    /// Duration multiplier for a faction's home region.
    pub home_multiplier: f64,

    /// Real-time length of one scheduler tick, in milliseconds.
    pub tick_period_ms: u64,

    /// Maximum concurrent attacks per player.
    pub max_attacks_per_player: usize,

    /// Horizontal half-extent of the no-build volume around a marker.
    pub no_build_distance: i32,

    /// Building is blocked above `marker.y + no_build_y_offset` inside the
    /// no-build volume.
    pub no_build_y_offset: i32,

    /// Highest block Y at which a marker anchor still leaves room for the
    /// marker stack above it.
    pub max_marker_y: i32,

    /// Faction names that can never be attacked.
    pub blacklist: Vec<String>,

    /// When non-empty, only these faction names can be attacked.
    pub whitelist: Vec<String>,

    /// When whitelist mode is active, also require the attacker to be
    /// whitelisted.
    pub only_whitelist_attacks: bool,

    /// Where the war snapshot is written.
    pub snapshot_path: PathBuf,

    /// How often the save debounce thread checks the dirty flag, in
    /// milliseconds.
    pub save_period_ms: u64,
}

impl Default for WarConfig {
    fn default() -> Self {
        Self {
            cell_attack_ticks: 200,
            frontier_multiplier: 2.0,
            home_multiplier: 2.0,
            tick_period_ms: 1000,
            max_attacks_per_player: 1,
            no_build_distance: 1,
            no_build_y_offset: -1,
            max_marker_y: 253,
            blacklist: Vec::new(),
            whitelist: Vec::new(),
            only_whitelist_attacks: true,
            snapshot_path: PathBuf::from("war.json"),
            save_period_ms: 1000,
        }
    }
}

impl WarConfig {
    /// Loads configuration from a TOML file. Missing keys fall back to
    /// their defaults.
    pub fn load(path: &Path) -> PersistenceResult<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| PersistenceError::Malformed(e.to_string()))
    }

    /// Whether blacklist filtering is active.
    #[must_use]
    pub fn use_blacklist(&self) -> bool {
        !self.blacklist.is_empty()
    }

    /// Whether whitelist filtering is active.
    #[must_use]
    pub fn use_whitelist(&self) -> bool {
        !self.whitelist.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_baseline() {
        let config = WarConfig::default();
        assert_eq!(config.cell_attack_ticks, 200);
        assert_eq!(config.max_attacks_per_player, 1);
        assert!(!config.use_blacklist());
        assert!(!config.use_whitelist());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: WarConfig =
            toml::from_str("cell_attack_ticks = 50\nmax_attacks_per_player = 3\n").unwrap();
        assert_eq!(config.cell_attack_ticks, 50);
        assert_eq!(config.max_attacks_per_player, 3);
        assert_eq!(config.home_multiplier, 2.0);
        assert_eq!(config.snapshot_path, PathBuf::from("war.json"));
    }

    #[test]
    fn test_list_modes_follow_contents() {
        let config: WarConfig = toml::from_str("whitelist = [\"veldt\"]\n").unwrap();
        assert!(config.use_whitelist());
        assert!(!config.use_blacklist());
    }
}
