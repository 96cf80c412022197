//! Saved-State Records
//!
//! Serialization structs handed to the save/load collaborator. Field names and
//! numeric ranges here are the contract external tooling relies on for round
//! trips, so renames must keep the serialized names stable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::effects::EffectMap;
use crate::kinds::{
    EventCategory, EventSeverity, MissionStatus, MissionType, RelationshipStatus, WarEndReason,
    WarType,
};
use crate::Turn;

/// Default number of history entries kept in a save.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Keeps only the most recent `limit` entries of a history list.
pub fn most_recent<T: Clone>(history: &[T], limit: usize) -> Vec<T> {
    let start = history.len().saturating_sub(limit);
    history[start..].to_vec()
}

/// Appends `entry` and drops the oldest entries beyond `limit`.
pub fn push_bounded<T>(history: &mut Vec<T>, entry: T, limit: usize) {
    history.push(entry);
    let excess = history.len().saturating_sub(limit);
    if excess > 0 {
        history.drain(..excess);
    }
}

/// Complete save for both engines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveGame {
    pub turn: Turn,
    pub events: EventLedger,
    pub diplomacy: DiplomacyState,
}

impl SaveGame {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// How an event instance left the active list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOutcome {
    /// The player picked a choice
    Chosen,
    /// The player resolved without picking a choice
    Declined,
    /// Remaining turns ran out before the player acted
    Expired,
}

/// An event that is still waiting for the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEventRecord {
    pub instance_id: String,
    pub definition_id: String,
    pub activated_turn: Turn,
    pub remaining_turns: u32,
}

/// A finished event, as kept in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEvent {
    pub instance_id: String,
    pub definition_id: String,
    pub title: String,
    pub category: EventCategory,
    pub severity: EventSeverity,
    pub activated_turn: Turn,
    pub resolved_turn: Turn,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_id: Option<String>,
    pub outcome: EventOutcome,
    /// Effects handed back to the driver at resolution
    #[serde(default)]
    pub effects: EffectMap,
}

/// Saved state of the event engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLedger {
    pub snapshot_id: Uuid,
    #[serde(default)]
    pub active_events: Vec<ActiveEventRecord>,
    /// Most recent resolutions, oldest first
    #[serde(default)]
    pub event_history: Vec<ResolvedEvent>,
    /// Accumulated choice modifiers per event definition
    #[serde(default)]
    pub probability_adjustments: BTreeMap<String, f64>,
}

// ---------------------------------------------------------------------------
// Diplomacy
// ---------------------------------------------------------------------------

/// Saved per-rival state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    /// Clamped to [-100, 100]
    pub relationship_points: i32,
    /// Derived; written for tooling, recomputed on load
    pub relationship_status: RelationshipStatus,
    pub trade_volume: f64,
    /// Clamped to [0, 100]
    pub reputation: i32,
    pub at_war: bool,
    #[serde(default)]
    pub alliance_expires_turn: Option<Turn>,
    #[serde(default)]
    pub war_started_turn: Option<Turn>,
    #[serde(default)]
    pub last_interaction_turn: Turn,
}

/// How and when a war ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarEnding {
    pub turn: Turn,
    pub reason: WarEndReason,
}

/// Saved war state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarRecord {
    pub id: String,
    pub enemy_city: String,
    pub war_type: WarType,
    pub started_turn: Turn,
    #[serde(default)]
    pub duration_turns: u32,
    pub our_strength: f64,
    pub enemy_strength: f64,
    pub casualties_us: u32,
    pub casualties_enemy: u32,
    pub economic_cost: f64,
    /// Clamped to [0, 1]
    pub war_exhaustion: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended: Option<WarEnding>,
}

/// Saved mission summary (history only; active missions are not persisted
/// mid-flight by the save collaborator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionRecord {
    pub id: String,
    pub target_city: String,
    pub mission_type: MissionType,
    pub status: MissionStatus,
    pub cost: f64,
    pub started_turn: Turn,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_turn: Option<Turn>,
}

/// Saved state of the diplomacy engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiplomacyState {
    pub snapshot_id: Uuid,
    /// Player's global diplomatic reputation, clamped to [0, 100]
    pub diplomatic_reputation: i32,
    pub cities: BTreeMap<String, CityRecord>,
    #[serde(default)]
    pub active_wars: Vec<WarRecord>,
    #[serde(default)]
    pub war_history: Vec<WarRecord>,
    /// City id -> turn the treaty expires
    #[serde(default)]
    pub peace_treaties: BTreeMap<String, Turn>,
    #[serde(default)]
    pub mission_history: Vec<MissionRecord>,
}
