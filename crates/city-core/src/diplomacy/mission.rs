//! Diplomatic Missions
//!
//! Timed, probabilistic contracts with a rival city. Every per-type table is
//! an exhaustive match, so adding a mission type fails to compile until each
//! table covers it.

use serde::Serialize;

use city_model::{keys, EffectMap, MissionRecord, MissionStatus, MissionType, Turn};

use crate::diplomacy::city::RivalCity;
use crate::error::DiplomacyError;
use crate::odds::{clamp_between, roll};
use crate::rng::RandomSource;

/// Mission success constants
pub mod mission_constants {
    /// Investment that buys the full success bonus, per unit of bonus
    pub const INVESTMENT_SCALE: f64 = 10_000.0;
    pub const INVESTMENT_BONUS_CAP: f64 = 0.3;

    pub const GOOD_RELATIONS_ABOVE: i32 = 50;
    pub const GOOD_RELATIONS_BONUS: f64 = 0.2;
    pub const BAD_RELATIONS_BELOW: i32 = -50;
    pub const BAD_RELATIONS_PENALTY: f64 = 0.3;

    pub const REPUTATION_PIVOT: f64 = 50.0;
    pub const REPUTATION_WEIGHT: f64 = 0.1;

    pub const MIN_SUCCESS: f64 = 0.1;
    pub const MAX_SUCCESS: f64 = 0.9;
}

use mission_constants::*;

/// Static per-type parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissionProfile {
    pub cost: f64,
    pub duration_turns: u32,
    pub success_rate: f64,
    /// Added at resolution time
    pub difficulty: f64,
}

pub fn mission_profile(mission_type: MissionType) -> MissionProfile {
    let (cost, duration_turns, success_rate, difficulty) = match mission_type {
        MissionType::TradeAgreement => (2000.0, 3, 0.7, 0.0),
        MissionType::AllianceProposal => (5000.0, 5, 0.4, -0.2),
        MissionType::PeaceTreaty => (3000.0, 4, 0.6, -0.3),
        MissionType::Spy => (1500.0, 2, 0.3, -0.4),
        MissionType::CulturalExchange => (1000.0, 4, 0.8, 0.1),
        MissionType::EconomicAid => (4000.0, 3, 0.9, -0.1),
        MissionType::MilitarySupport => (6000.0, 6, 0.5, -0.3),
    };
    MissionProfile {
        cost,
        duration_turns,
        success_rate,
        difficulty,
    }
}

/// One entry of a reward or penalty table.
#[derive(Debug, Clone, PartialEq)]
pub enum MissionEffect {
    Relationship(i32),
    /// Player's global diplomatic reputation
    Reputation(i32),
    Alliance { turns: u32 },
    EndWar,
    PeaceTreaty { turns: u32 },
    /// Chance that the target declares an ideological war
    WarRisk(f64),
    /// Handed to the driver untouched
    Economy { key: String, value: f64 },
}

fn economy(key: &str, value: f64) -> MissionEffect {
    MissionEffect::Economy {
        key: key.to_string(),
        value,
    }
}

/// Effects applied when the mission succeeds.
pub fn mission_rewards(
    mission_type: MissionType,
    target: &RivalCity,
    investment: f64,
) -> Vec<MissionEffect> {
    use MissionEffect::*;

    match mission_type {
        MissionType::TradeAgreement => vec![
            Relationship(20),
            economy(keys::TRADE_BONUS, 0.2),
            economy(keys::MONEY, investment * 0.5),
        ],
        MissionType::AllianceProposal => vec![
            Relationship(40),
            Alliance { turns: 50 },
            economy("military_support", target.profile.military_strength * 0.1),
            economy(keys::TRADE_BONUS, 0.3),
        ],
        MissionType::PeaceTreaty => vec![EndWar, Relationship(30), PeaceTreaty { turns: 30 }],
        MissionType::Spy => vec![
            economy("intelligence", 1.0),
            economy("enemy_weakness", 1.0),
            economy("technology_steal", 0.1),
        ],
        MissionType::CulturalExchange => vec![
            Relationship(15),
            economy("happiness_bonus", 5.0),
            economy("tourism_income", 1000.0),
        ],
        MissionType::EconomicAid => vec![
            Relationship(25),
            Reputation(5),
            economy(keys::TRADE_BONUS, 0.15),
        ],
        MissionType::MilitarySupport => vec![
            Relationship(30),
            economy("military_alliance", 1.0),
            economy("defense_bonus", 0.2),
        ],
    }
}

/// Effects applied when the mission fails.
pub fn mission_penalties(mission_type: MissionType, investment: f64) -> Vec<MissionEffect> {
    use MissionEffect::*;

    match mission_type {
        MissionType::TradeAgreement => vec![Relationship(-5), Reputation(-2)],
        MissionType::AllianceProposal => vec![Relationship(-15), Reputation(-5)],
        MissionType::PeaceTreaty => vec![
            Relationship(-10),
            Reputation(-3),
            economy(keys::MONEY, -5000.0),
        ],
        MissionType::Spy => vec![Relationship(-30), Reputation(-10), WarRisk(0.3)],
        MissionType::CulturalExchange => vec![Relationship(-3)],
        MissionType::EconomicAid => vec![economy(keys::MONEY, -investment), Relationship(-5)],
        MissionType::MilitarySupport => {
            vec![Relationship(-10), economy(keys::MONEY, -investment * 0.5)]
        }
    }
}

pub fn mission_description(mission_type: MissionType, city_name: &str) -> String {
    match mission_type {
        MissionType::TradeAgreement => format!("Negotiate favourable trade terms with {city_name}"),
        MissionType::AllianceProposal => format!("Propose a military alliance to {city_name}"),
        MissionType::PeaceTreaty => format!("Negotiate a peace treaty with {city_name}"),
        MissionType::Spy => format!("Run a covert intelligence operation in {city_name}"),
        MissionType::CulturalExchange => format!("Organise a cultural exchange with {city_name}"),
        MissionType::EconomicAid => format!("Send economic aid to {city_name}"),
        MissionType::MilitarySupport => format!("Offer military support to {city_name}"),
    }
}

/// A diplomatic mission, from creation through its single resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct DiplomaticMission {
    pub id: String,
    pub target_city: String,
    pub mission_type: MissionType,
    pub description: String,
    pub cost: f64,
    pub duration_turns: u32,
    /// Fixed at creation
    pub success_chance: f64,
    pub rewards: Vec<MissionEffect>,
    pub penalties: Vec<MissionEffect>,
    pub started_turn: Turn,
    status: MissionStatus,
    remaining_turns: u32,
    resolved_turn: Option<Turn>,
}

impl DiplomaticMission {
    /// Builds a mission against `target`. Negative or non-finite investment
    /// counts as none.
    pub fn new(id: String, target: &RivalCity, mission_type: MissionType, investment: f64) -> Self {
        let investment = if investment.is_finite() {
            investment.max(0.0)
        } else {
            0.0
        };
        let profile = mission_profile(mission_type);
        let bonus = (investment / INVESTMENT_SCALE).min(INVESTMENT_BONUS_CAP);

        Self {
            id,
            target_city: target.id.clone(),
            mission_type,
            description: mission_description(mission_type, &target.name),
            cost: profile.cost + investment,
            duration_turns: profile.duration_turns,
            success_chance: profile.success_rate + bonus,
            rewards: mission_rewards(mission_type, target, investment),
            penalties: mission_penalties(mission_type, investment),
            started_turn: 0,
            status: MissionStatus::Active,
            remaining_turns: profile.duration_turns,
            resolved_turn: None,
        }
    }

    pub fn status(&self) -> MissionStatus {
        self.status
    }

    pub fn remaining_turns(&self) -> u32 {
        self.remaining_turns
    }

    pub fn resolved_turn(&self) -> Option<Turn> {
        self.resolved_turn
    }

    /// Chance of success given the target's standing and the player's
    /// reputation, in `[0.1, 0.9]`.
    pub fn success_probability(&self, relationship_points: i32, reputation: i32) -> f64 {
        let mut chance = self.success_chance;

        if relationship_points > GOOD_RELATIONS_ABOVE {
            chance += GOOD_RELATIONS_BONUS;
        } else if relationship_points < BAD_RELATIONS_BELOW {
            chance -= BAD_RELATIONS_PENALTY;
        }

        chance += (reputation as f64 - REPUTATION_PIVOT) / 100.0 * REPUTATION_WEIGHT;
        chance += mission_profile(self.mission_type).difficulty;

        clamp_between(chance, MIN_SUCCESS, MAX_SUCCESS)
    }

    /// Counts one turn down. True once the mission is due.
    pub(crate) fn countdown(&mut self) -> bool {
        self.remaining_turns = self.remaining_turns.saturating_sub(1);
        self.remaining_turns == 0
    }

    /// Draws the outcome once. A second call is a stale-mission error and
    /// takes no draw.
    pub(crate) fn resolve<R: RandomSource + ?Sized>(
        &mut self,
        relationship_points: i32,
        reputation: i32,
        turn: Turn,
        rng: &mut R,
    ) -> Result<(bool, f64), DiplomacyError> {
        if self.status.is_terminal() {
            return Err(DiplomacyError::StaleMission(self.id.clone()));
        }

        let p = self.success_probability(relationship_points, reputation);
        let success = roll(rng, p);
        self.status = if success {
            MissionStatus::Completed
        } else {
            MissionStatus::Failed
        };
        self.resolved_turn = Some(turn);

        Ok((success, p))
    }

    pub fn to_record(&self) -> MissionRecord {
        MissionRecord {
            id: self.id.clone(),
            target_city: self.target_city.clone(),
            mission_type: self.mission_type,
            status: self.status,
            cost: self.cost,
            started_turn: self.started_turn,
            resolved_turn: self.resolved_turn,
        }
    }
}

/// A created but not yet started mission. Consumed by `start_mission`.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionHandle {
    pub(crate) mission: DiplomaticMission,
}

impl MissionHandle {
    pub fn id(&self) -> &str {
        &self.mission.id
    }

    pub fn cost(&self) -> f64 {
        self.mission.cost
    }

    pub fn mission(&self) -> &DiplomaticMission {
        &self.mission
    }
}

/// What happened to a mission this turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionResult {
    pub mission_id: String,
    pub target_city: String,
    pub mission_type: MissionType,
    pub status: MissionStatus,
    /// Chance used for the draw
    pub success_probability: f64,
    /// Economy-side effects for the driver to apply
    pub effects: EffectMap,
    /// Set when a failed mission provoked a war
    pub war_declared: Option<String>,
    pub message: String,
}

impl MissionResult {
    pub fn succeeded(&self) -> bool {
        self.status == MissionStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diplomacy::city::RivalProfile;
    use crate::rng::ScriptedRng;
    use city_model::Specialization;

    fn target() -> RivalCity {
        RivalCity::new(
            "steelburg",
            "Steelburg",
            Specialization::Industrial,
            RivalProfile {
                military_strength: 1200.0,
                economic_power: 2000.0,
                population: 40_000,
                aggression: 0.5,
                cooperation: 0.5,
                economic_focus: 0.5,
            },
        )
    }

    fn mission(mission_type: MissionType, investment: f64) -> DiplomaticMission {
        DiplomaticMission::new("m1".into(), &target(), mission_type, investment)
    }

    #[test]
    fn test_profile_table() {
        let trade = mission_profile(MissionType::TradeAgreement);
        assert_eq!(trade.cost, 2000.0);
        assert_eq!(trade.duration_turns, 3);
        assert_eq!(trade.success_rate, 0.7);

        let spy = mission_profile(MissionType::Spy);
        assert_eq!(spy.duration_turns, 2);
        assert_eq!(spy.difficulty, -0.4);

        for t in MissionType::all() {
            let p = mission_profile(*t);
            assert!(p.cost > 0.0 && p.duration_turns > 0);
        }
    }

    #[test]
    fn test_investment_raises_cost_and_chance() {
        let m = mission(MissionType::AllianceProposal, 1500.0);
        assert_eq!(m.cost, 6500.0);
        assert!((m.success_chance - 0.55).abs() < 1e-12);

        let capped = mission(MissionType::AllianceProposal, 50_000.0);
        assert!((capped.success_chance - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_negative_investment_ignored() {
        let m = mission(MissionType::TradeAgreement, -900.0);
        assert_eq!(m.cost, 2000.0);
        assert_eq!(m.success_chance, 0.7);

        let m = mission(MissionType::TradeAgreement, f64::NAN);
        assert_eq!(m.cost, 2000.0);
    }

    #[test]
    fn test_success_probability_modifiers() {
        let trade = mission(MissionType::TradeAgreement, 0.0);
        assert!((trade.success_probability(90, 50) - 0.9).abs() < 1e-12);
        assert!((trade.success_probability(0, 50) - 0.7).abs() < 1e-12);
        assert!((trade.success_probability(-60, 50) - 0.4).abs() < 1e-12);
        assert!((trade.success_probability(0, 100) - 0.75).abs() < 1e-12);
        // boundaries are strict
        assert!((trade.success_probability(50, 50) - 0.7).abs() < 1e-12);
        assert!((trade.success_probability(-50, 50) - 0.7).abs() < 1e-12);

        let spy = mission(MissionType::Spy, 0.0);
        assert_eq!(spy.success_probability(-100, 0), 0.1);

        let aid = mission(MissionType::EconomicAid, 0.0);
        assert_eq!(aid.success_probability(100, 100), 0.9);
    }

    #[test]
    fn test_reward_tables() {
        let alliance = mission_rewards(MissionType::AllianceProposal, &target(), 0.0);
        assert!(alliance.contains(&MissionEffect::Alliance { turns: 50 }));
        assert!(alliance.contains(&economy("military_support", 1200.0 * 0.1)));

        let trade = mission_rewards(MissionType::TradeAgreement, &target(), 1000.0);
        assert!(trade.contains(&economy(keys::MONEY, 500.0)));

        let peace = mission_rewards(MissionType::PeaceTreaty, &target(), 0.0);
        assert_eq!(peace[0], MissionEffect::EndWar);
    }

    #[test]
    fn test_penalty_tables() {
        let spy = mission_penalties(MissionType::Spy, 0.0);
        assert!(spy.contains(&MissionEffect::WarRisk(0.3)));

        let aid = mission_penalties(MissionType::EconomicAid, 2000.0);
        assert!(aid.contains(&economy(keys::MONEY, -2000.0)));
    }

    #[test]
    fn test_countdown_and_single_resolution() {
        let mut m = mission(MissionType::Spy, 0.0);
        assert!(!m.countdown());
        assert!(m.countdown());

        let mut rng = ScriptedRng::new([0.05]);
        let (success, p) = m.resolve(0, 50, 4, &mut rng).unwrap();
        assert!(success);
        assert_eq!(p, 0.1);
        assert!(m.status().is_terminal());
        assert_eq!(m.resolved_turn(), Some(4));

        let again = m.resolve(0, 50, 5, &mut rng);
        assert_eq!(again, Err(DiplomacyError::StaleMission("m1".into())));
        assert_eq!(rng.consumed(), 1);
        assert_eq!(m.resolved_turn(), Some(4));
    }

    #[test]
    fn test_record() {
        let m = mission(MissionType::CulturalExchange, 0.0);
        let record = m.to_record();
        assert_eq!(record.target_city, "steelburg");
        assert_eq!(record.status, MissionStatus::Active);
        assert_eq!(record.cost, 1000.0);
    }
}
