//! Shared data types for the city event and diplomacy simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for the core crate and for save/load tooling.

pub mod effects;
pub mod ids;
pub mod kinds;
pub mod saved;
pub mod snapshot;

/// Simulation turn number.
pub type Turn = u32;

// Re-export effect types
pub use effects::{keys, EffectMap};

// Re-export id generators
pub use ids::{
    generate_event_instance_id, generate_mission_id, generate_war_id, mission_sequence,
};

// Re-export closed variants
pub use kinds::{
    EventCategory, EventSeverity, MissionStatus, MissionType, RelationshipStatus,
    Specialization, WarEndReason, WarType,
};

// Re-export saved-state records
pub use saved::{
    most_recent, push_bounded, ActiveEventRecord, CityRecord, DiplomacyState, EventLedger,
    EventOutcome, MissionRecord, ResolvedEvent, SaveGame, WarEnding, WarRecord,
    DEFAULT_HISTORY_LIMIT,
};

// Re-export snapshot type
pub use snapshot::CitySnapshot;
