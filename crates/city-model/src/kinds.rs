//! Closed Variants
//!
//! Every category, severity, and type the simulation keys tables on.
//! Tables elsewhere `match` on these exhaustively, so adding a variant is a
//! compile error until every table handles it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad category of a random city event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Disaster,
    Economic,
    Social,
    Political,
    Technological,
    Environmental,
    Crime,
    Health,
}

impl EventCategory {
    /// Returns all category variants.
    pub fn all() -> &'static [EventCategory] {
        &[
            EventCategory::Disaster,
            EventCategory::Economic,
            EventCategory::Social,
            EventCategory::Political,
            EventCategory::Technological,
            EventCategory::Environmental,
            EventCategory::Crime,
            EventCategory::Health,
        ]
    }

    /// Stable snake_case name, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            EventCategory::Disaster => "disaster",
            EventCategory::Economic => "economic",
            EventCategory::Social => "social",
            EventCategory::Political => "political",
            EventCategory::Technological => "technological",
            EventCategory::Environmental => "environmental",
            EventCategory::Crime => "crime",
            EventCategory::Health => "health",
        }
    }

    /// Categories whose likelihood grows with city size.
    pub fn scales_with_population(self) -> bool {
        matches!(
            self,
            EventCategory::Crime | EventCategory::Social | EventCategory::Environmental
        )
    }

    /// Categories that become more likely when the treasury runs dry.
    pub fn worsens_with_scarcity(self) -> bool {
        matches!(self, EventCategory::Crime | EventCategory::Health)
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How hard an event hits the city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSeverity {
    Minor,
    Moderate,
    Major,
    Catastrophic,
}

impl EventSeverity {
    pub fn all() -> &'static [EventSeverity] {
        &[
            EventSeverity::Minor,
            EventSeverity::Moderate,
            EventSeverity::Major,
            EventSeverity::Catastrophic,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventSeverity::Minor => "minor",
            EventSeverity::Moderate => "moderate",
            EventSeverity::Major => "major",
            EventSeverity::Catastrophic => "catastrophic",
        }
    }
}

impl fmt::Display for EventSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived bilateral relationship status.
///
/// Never stored on its own: always computed from relationship points and the
/// at-war flag (see [`RelationshipStatus::derive`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
    Hostile,
    #[default]
    Neutral,
    Friendly,
    Allied,
    AtWar,
}

impl RelationshipStatus {
    /// Points at or above which a city counts as allied.
    pub const ALLIED_THRESHOLD: i32 = 80;
    /// Points at or above which a city counts as friendly.
    pub const FRIENDLY_THRESHOLD: i32 = 40;
    /// Points at or below which a city counts as hostile.
    pub const HOSTILE_THRESHOLD: i32 = -40;

    /// Derives the status from points and the at-war flag. War always wins.
    pub fn derive(points: i32, at_war: bool) -> Self {
        if at_war {
            RelationshipStatus::AtWar
        } else if points >= Self::ALLIED_THRESHOLD {
            RelationshipStatus::Allied
        } else if points >= Self::FRIENDLY_THRESHOLD {
            RelationshipStatus::Friendly
        } else if points <= Self::HOSTILE_THRESHOLD {
            RelationshipStatus::Hostile
        } else {
            RelationshipStatus::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipStatus::Hostile => "hostile",
            RelationshipStatus::Neutral => "neutral",
            RelationshipStatus::Friendly => "friendly",
            RelationshipStatus::Allied => "allied",
            RelationshipStatus::AtWar => "at_war",
        }
    }
}

impl fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of diplomatic mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionType {
    TradeAgreement,
    AllianceProposal,
    PeaceTreaty,
    Spy,
    CulturalExchange,
    EconomicAid,
    MilitarySupport,
}

impl MissionType {
    pub fn all() -> &'static [MissionType] {
        &[
            MissionType::TradeAgreement,
            MissionType::AllianceProposal,
            MissionType::PeaceTreaty,
            MissionType::Spy,
            MissionType::CulturalExchange,
            MissionType::EconomicAid,
            MissionType::MilitarySupport,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MissionType::TradeAgreement => "trade_agreement",
            MissionType::AllianceProposal => "alliance_proposal",
            MissionType::PeaceTreaty => "peace_treaty",
            MissionType::Spy => "spy",
            MissionType::CulturalExchange => "cultural_exchange",
            MissionType::EconomicAid => "economic_aid",
            MissionType::MilitarySupport => "military_support",
        }
    }
}

impl fmt::Display for MissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a mission. Everything but `Active` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    #[default]
    Active,
    Completed,
    Failed,
    Cancelled,
}

impl MissionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, MissionStatus::Active)
    }
}

/// Casus belli of a war.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarType {
    Trade,
    Territorial,
    Resource,
    Ideological,
}

impl WarType {
    pub fn all() -> &'static [WarType] {
        &[
            WarType::Trade,
            WarType::Territorial,
            WarType::Resource,
            WarType::Ideological,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WarType::Trade => "trade",
            WarType::Territorial => "territorial",
            WarType::Resource => "resource",
            WarType::Ideological => "ideological",
        }
    }
}

impl fmt::Display for WarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a war stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarEndReason {
    /// Exhaustion crossed the limit
    Exhaustion,
    /// The war ran past its maximum duration
    Duration,
    /// A direct peace proposal was accepted
    PeaceAccepted,
    /// A peace-treaty mission succeeded
    PeaceTreaty,
}

/// Economic focus of a rival city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialization {
    Agricultural,
    Industrial,
    Energy,
    Luxury,
    Technology,
    Services,
    Military,
    Cultural,
}

impl Specialization {
    pub fn as_str(self) -> &'static str {
        match self {
            Specialization::Agricultural => "agricultural",
            Specialization::Industrial => "industrial",
            Specialization::Energy => "energy",
            Specialization::Luxury => "luxury",
            Specialization::Technology => "technology",
            Specialization::Services => "services",
            Specialization::Military => "military",
            Specialization::Cultural => "cultural",
        }
    }
}

impl fmt::Display for Specialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
