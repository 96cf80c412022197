//! Rival Cities
//!
//! One rival per roster entry. Relationship points and reputation are kept
//! private so every change goes through a clamped update, and the status is
//! always derived from points plus the at-war flag.

use serde::Serialize;

use city_model::{CityRecord, RelationshipStatus, Specialization, Turn};

use crate::odds::bounded_add;
use crate::rng::RandomSource;

/// Relationship and reputation bounds
pub mod city_constants {
    pub const MIN_RELATIONSHIP: i32 = -100;
    pub const MAX_RELATIONSHIP: i32 = 100;
    pub const MIN_REPUTATION: i32 = 0;
    pub const MAX_REPUTATION: i32 = 100;
    pub const STARTING_REPUTATION: i32 = 50;

    pub const ECONOMIC_STRENGTH_WEIGHT: f64 = 0.1;
    pub const POPULATION_STRENGTH_WEIGHT: f64 = 0.001;
}

use city_constants::*;

/// The fixed rival roster: id, display name, specialization.
pub const ROSTER: [(&str, &str, Specialization); 8] = [
    ("agropolis", "Agropolis", Specialization::Agricultural),
    ("steelburg", "Steelburg", Specialization::Industrial),
    ("energyville", "Energyville", Specialization::Energy),
    ("luxuria", "Luxuria", Specialization::Luxury),
    ("techcity", "TechCity", Specialization::Technology),
    ("servicetown", "ServiceTown", Specialization::Services),
    ("militaria", "Militaria", Specialization::Military),
    ("culturalis", "Culturalis", Specialization::Cultural),
];

/// Static, generator-seeded traits of a rival.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RivalProfile {
    pub military_strength: f64,
    pub economic_power: f64,
    pub population: u32,
    pub aggression: f64,
    pub cooperation: f64,
    pub economic_focus: f64,
}

impl RivalProfile {
    /// Draws a profile: three integer draws then three uniform draws.
    pub fn generate<R: RandomSource + ?Sized>(rng: &mut R) -> Self {
        Self {
            military_strength: rng.range_inclusive(500, 1500) as f64,
            economic_power: rng.range_inclusive(1000, 5000) as f64,
            population: rng.range_inclusive(10_000, 100_000) as u32,
            aggression: rng.uniform(0.2, 0.8),
            cooperation: rng.uniform(0.3, 0.9),
            economic_focus: rng.uniform(0.4, 1.0),
        }
    }
}

/// A rival city and the player's standing with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RivalCity {
    pub id: String,
    pub name: String,
    pub specialization: Specialization,
    pub profile: RivalProfile,
    pub trade_volume: f64,
    relationship_points: i32,
    reputation: i32,
    at_war: bool,
    alliance_expires_turn: Option<Turn>,
    war_started_turn: Option<Turn>,
    peace_treaty_expires_turn: Option<Turn>,
    last_interaction_turn: Turn,
}

impl RivalCity {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        specialization: Specialization,
        profile: RivalProfile,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            specialization,
            profile,
            trade_volume: 0.0,
            relationship_points: 0,
            reputation: STARTING_REPUTATION,
            at_war: false,
            alliance_expires_turn: None,
            war_started_turn: None,
            peace_treaty_expires_turn: None,
            last_interaction_turn: 0,
        }
    }

    pub fn relationship_points(&self) -> i32 {
        self.relationship_points
    }

    pub fn reputation(&self) -> i32 {
        self.reputation
    }

    pub fn is_at_war(&self) -> bool {
        self.at_war
    }

    pub fn alliance_expires_turn(&self) -> Option<Turn> {
        self.alliance_expires_turn
    }

    pub fn war_started_turn(&self) -> Option<Turn> {
        self.war_started_turn
    }

    pub fn peace_treaty_expires_turn(&self) -> Option<Turn> {
        self.peace_treaty_expires_turn
    }

    pub fn last_interaction_turn(&self) -> Turn {
        self.last_interaction_turn
    }

    /// Derived status; at-war always wins.
    pub fn status(&self) -> RelationshipStatus {
        RelationshipStatus::derive(self.relationship_points, self.at_war)
    }

    /// Adds `delta` to the relationship, clamped to [-100, 100].
    pub fn adjust_relationship(&mut self, delta: i32, turn: Turn) {
        self.relationship_points = bounded_add(
            self.relationship_points,
            delta,
            MIN_RELATIONSHIP,
            MAX_RELATIONSHIP,
        );
        self.last_interaction_turn = turn;
    }

    /// Adds `delta` to the city-local reputation, clamped to [0, 100].
    pub fn adjust_reputation(&mut self, delta: i32) {
        self.reputation = bounded_add(self.reputation, delta, MIN_REPUTATION, MAX_REPUTATION);
    }

    pub fn has_live_alliance(&self, turn: Turn) -> bool {
        self.alliance_expires_turn.is_some_and(|t| t > turn)
    }

    pub fn has_peace_treaty(&self, turn: Turn) -> bool {
        self.peace_treaty_expires_turn.is_some_and(|t| t > turn)
    }

    /// Not at war, not allied, and no alliance still running.
    pub fn can_declare_war(&self, turn: Turn) -> bool {
        !self.at_war
            && self.status() != RelationshipStatus::Allied
            && !self.has_live_alliance(turn)
    }

    /// Military strength plus economic and population bonuses.
    pub fn war_strength(&self) -> f64 {
        self.profile.military_strength
            + ECONOMIC_STRENGTH_WEIGHT * self.profile.economic_power
            + POPULATION_STRENGTH_WEIGHT * self.profile.population as f64
    }

    /// Raises points to at least the allied threshold and records the expiry.
    pub(crate) fn grant_alliance(&mut self, turn: Turn, duration: u32) {
        self.relationship_points = self
            .relationship_points
            .max(RelationshipStatus::ALLIED_THRESHOLD);
        self.alliance_expires_turn = Some(turn.saturating_add(duration));
        self.last_interaction_turn = turn;
    }

    pub(crate) fn register_peace_treaty(&mut self, turn: Turn, duration: u32) {
        self.peace_treaty_expires_turn = Some(turn.saturating_add(duration));
        self.last_interaction_turn = turn;
    }

    /// Enters a war. Any alliance or treaty is void from here on.
    pub(crate) fn enter_war(&mut self, turn: Turn) {
        self.at_war = true;
        self.war_started_turn = Some(turn);
        self.alliance_expires_turn = None;
        self.peace_treaty_expires_turn = None;
        self.last_interaction_turn = turn;
    }

    pub(crate) fn leave_war(&mut self, turn: Turn) {
        self.at_war = false;
        self.war_started_turn = None;
        self.last_interaction_turn = turn;
    }

    /// Clears an alliance whose expiry is at or before `turn`.
    pub(crate) fn expire_alliance(&mut self, turn: Turn) -> bool {
        match self.alliance_expires_turn {
            Some(t) if t <= turn => {
                self.alliance_expires_turn = None;
                true
            }
            _ => false,
        }
    }

    /// Clears a peace treaty whose expiry is at or before `turn`.
    pub(crate) fn expire_peace_treaty(&mut self, turn: Turn) -> bool {
        match self.peace_treaty_expires_turn {
            Some(t) if t <= turn => {
                self.peace_treaty_expires_turn = None;
                true
            }
            _ => false,
        }
    }

    pub fn to_record(&self) -> CityRecord {
        CityRecord {
            relationship_points: self.relationship_points,
            relationship_status: self.status(),
            trade_volume: self.trade_volume,
            reputation: self.reputation,
            at_war: self.at_war,
            alliance_expires_turn: self.alliance_expires_turn,
            war_started_turn: self.war_started_turn,
            last_interaction_turn: self.last_interaction_turn,
        }
    }

    /// Restores saved standing. Out-of-range values are clamped and the
    /// stored status is ignored in favour of the derived one.
    pub(crate) fn apply_record(&mut self, record: &CityRecord, peace_treaty: Option<Turn>) {
        self.relationship_points = record
            .relationship_points
            .clamp(MIN_RELATIONSHIP, MAX_RELATIONSHIP);
        self.reputation = record.reputation.clamp(MIN_REPUTATION, MAX_REPUTATION);
        self.trade_volume = if record.trade_volume.is_finite() {
            record.trade_volume
        } else {
            0.0
        };
        self.at_war = record.at_war;
        self.alliance_expires_turn = if record.at_war {
            None
        } else {
            record.alliance_expires_turn
        };
        self.war_started_turn = record.war_started_turn.filter(|_| record.at_war);
        self.peace_treaty_expires_turn = peace_treaty;
        self.last_interaction_turn = record.last_interaction_turn;
    }
}

/// Generates the eight-city roster, in roster order.
pub fn generate_roster<R: RandomSource + ?Sized>(rng: &mut R) -> Vec<RivalCity> {
    ROSTER
        .iter()
        .map(|(id, name, specialization)| {
            RivalCity::new(*id, *name, *specialization, RivalProfile::generate(rng))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedRng, SimRng};

    fn profile() -> RivalProfile {
        RivalProfile {
            military_strength: 1000.0,
            economic_power: 2000.0,
            population: 50_000,
            aggression: 0.5,
            cooperation: 0.5,
            economic_focus: 0.5,
        }
    }

    fn rival() -> RivalCity {
        RivalCity::new("steelburg", "Steelburg", Specialization::Industrial, profile())
    }

    #[test]
    fn test_new_city_is_neutral() {
        let city = rival();
        assert_eq!(city.relationship_points(), 0);
        assert_eq!(city.reputation(), 50);
        assert_eq!(city.status(), RelationshipStatus::Neutral);
        assert!(city.can_declare_war(1));
    }

    #[test]
    fn test_relationship_is_clamped() {
        let mut city = rival();
        city.adjust_relationship(250, 3);
        assert_eq!(city.relationship_points(), 100);
        assert_eq!(city.status(), RelationshipStatus::Allied);
        assert_eq!(city.last_interaction_turn(), 3);

        city.adjust_relationship(-500, 4);
        assert_eq!(city.relationship_points(), -100);
        assert_eq!(city.status(), RelationshipStatus::Hostile);
    }

    #[test]
    fn test_reputation_is_clamped() {
        let mut city = rival();
        city.adjust_reputation(80);
        assert_eq!(city.reputation(), 100);
        city.adjust_reputation(-300);
        assert_eq!(city.reputation(), 0);
    }

    #[test]
    fn test_at_war_overrides_points() {
        let mut city = rival();
        city.adjust_relationship(95, 1);
        city.enter_war(2);
        assert_eq!(city.status(), RelationshipStatus::AtWar);
        assert!(!city.can_declare_war(2));

        city.leave_war(5);
        assert_eq!(city.status(), RelationshipStatus::Allied);
        assert_eq!(city.war_started_turn(), None);
    }

    #[test]
    fn test_alliance_blocks_war_until_expiry() {
        let mut city = rival();
        city.grant_alliance(10, 50);
        assert_eq!(city.relationship_points(), 80);
        assert!(!city.can_declare_war(20));

        city.adjust_relationship(-60, 21);
        assert_eq!(city.status(), RelationshipStatus::Neutral);
        assert!(!city.can_declare_war(21));

        assert!(!city.expire_alliance(59));
        assert!(city.expire_alliance(60));
        assert_eq!(city.alliance_expires_turn(), None);
        assert!(city.can_declare_war(60));
    }

    #[test]
    fn test_grant_alliance_keeps_higher_points() {
        let mut city = rival();
        city.adjust_relationship(95, 1);
        city.grant_alliance(1, 50);
        assert_eq!(city.relationship_points(), 95);
    }

    #[test]
    fn test_war_strength() {
        // 1000 + 0.1 * 2000 + 0.001 * 50_000
        assert!((rival().war_strength() - 1250.0).abs() < 1e-9);
    }

    #[test]
    fn test_peace_treaty_expiry() {
        let mut city = rival();
        city.register_peace_treaty(5, 30);
        assert!(city.has_peace_treaty(34));
        assert!(!city.expire_peace_treaty(34));
        assert!(city.expire_peace_treaty(35));
        assert!(!city.has_peace_treaty(35));
    }

    #[test]
    fn test_record_round_trip_clamps() {
        let mut city = rival();
        let mut record = city.to_record();
        record.relationship_points = 400;
        record.reputation = -20;
        record.relationship_status = RelationshipStatus::Hostile;

        city.apply_record(&record, Some(12));
        assert_eq!(city.relationship_points(), 100);
        assert_eq!(city.reputation(), 0);
        assert_eq!(city.status(), RelationshipStatus::Allied);
        assert_eq!(city.peace_treaty_expires_turn(), Some(12));
    }

    #[test]
    fn test_generate_roster_ranges() {
        let roster = generate_roster(&mut SimRng::seeded(11));
        assert_eq!(roster.len(), 8);
        assert_eq!(roster[6].id, "militaria");

        for city in &roster {
            let p = city.profile;
            assert!((500.0..=1500.0).contains(&p.military_strength));
            assert!((1000.0..=5000.0).contains(&p.economic_power));
            assert!((10_000..=100_000).contains(&p.population));
            assert!((0.2..0.8).contains(&p.aggression));
            assert!((0.3..0.9).contains(&p.cooperation));
            assert!((0.4..1.0).contains(&p.economic_focus));
        }
    }

    #[test]
    fn test_profile_draw_order() {
        let mut rng = ScriptedRng::new([0.0, 0.0, 0.0, 0.5, 0.5, 0.5]);
        let p = RivalProfile::generate(&mut rng);
        assert_eq!(p.military_strength, 500.0);
        assert_eq!(p.economic_power, 1000.0);
        assert_eq!(p.population, 10_000);
        assert!((p.aggression - 0.5).abs() < 1e-12);
        assert!((p.cooperation - 0.6).abs() < 1e-12);
        assert!((p.economic_focus - 0.7).abs() < 1e-12);
    }
}
