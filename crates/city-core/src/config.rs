//! Configuration loading for the simulation core.
//!
//! Tuning knobs are loaded from a TOML file; every table and field is
//! optional and falls back to its default.

use serde::{Deserialize, Serialize};
use std::path::Path;

use city_model::DEFAULT_HISTORY_LIMIT;

use crate::error::ConfigError;

/// Complete core configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Event engine tuning
    #[serde(default)]
    pub events: EventTuning,
    /// Diplomacy engine tuning
    #[serde(default)]
    pub diplomacy: DiplomacyTuning,
    /// War tuning
    #[serde(default)]
    pub war: WarTuning,
}

impl CoreConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serializes this configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Event engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventTuning {
    /// Difficulty scaling applied to every composed event probability
    pub frequency_multiplier: f64,
    /// Resolved events kept in saves
    pub history_limit: usize,
}

impl Default for EventTuning {
    fn default() -> Self {
        Self {
            frequency_multiplier: 1.0,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Diplomacy engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiplomacyTuning {
    /// Player's global diplomatic reputation at game start
    pub starting_reputation: i32,
    /// Missions and wars kept in saves
    pub history_limit: usize,
    /// Seed for rival generation; the turn RNG is used when absent
    pub roster_seed: Option<u64>,
}

impl Default for DiplomacyTuning {
    fn default() -> Self {
        Self {
            starting_reputation: 50,
            history_limit: DEFAULT_HISTORY_LIMIT,
            roster_seed: None,
        }
    }
}

/// War tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WarTuning {
    /// Player strength before the population bonus
    pub player_base_strength: f64,
    /// Turns between battles
    pub battle_interval_turns: u32,
    /// Wars longer than this end automatically
    pub max_duration_turns: u32,
    /// Wars with exhaustion above this end automatically
    pub exhaustion_limit: f64,
    /// Exhaustion added by every battle
    pub exhaustion_per_battle: f64,
}

impl Default for WarTuning {
    fn default() -> Self {
        Self {
            player_base_strength: 1000.0,
            battle_interval_turns: 3,
            max_duration_turns: 50,
            exhaustion_limit: 0.8,
            exhaustion_per_battle: 0.05,
        }
    }
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# City simulation core configuration

[events]
frequency_multiplier = 1.0
history_limit = 50

[diplomacy]
starting_reputation = 50
history_limit = 50
# roster_seed = 7

[war]
player_base_strength = 1000.0
battle_interval_turns = 3
max_duration_turns = 50
exhaustion_limit = 0.8
exhaustion_per_battle = 0.05
"#
    .to_string()
}
