//! Rival cities, diplomatic missions, and wars.

pub mod city;
pub mod engine;
pub mod mission;
pub mod war;

pub use city::{generate_roster, RivalCity, RivalProfile, ROSTER};
pub use engine::{DiplomacyEngine, DiplomacySummary, DiplomacyTurnReport};
pub use mission::{
    mission_profile, DiplomaticMission, MissionEffect, MissionHandle, MissionProfile,
    MissionResult,
};
pub use war::{BattleOutcome, PeaceTerms, War, WarEnded};
