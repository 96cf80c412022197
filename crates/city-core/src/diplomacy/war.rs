//! Wars and Battles
//!
//! A war is a run of periodic stochastic battles. Exhaustion only ever grows
//! while the war is active, and is capped at 1.0.

use serde::{Deserialize, Serialize};

use city_model::{Turn, WarEndReason, WarEnding, WarRecord, WarType};

use crate::odds::{clamp_between, clamp_unit, roll};
use crate::rng::RandomSource;

/// Battle and peace constants
pub mod war_constants {
    pub const WIN_CHANCE_BASE: f64 = 0.5;
    pub const STRENGTH_RATIO_WEIGHT: f64 = 0.2;
    pub const MIN_WIN_CHANCE: f64 = 0.1;
    pub const MAX_WIN_CHANCE: f64 = 0.9;

    pub const MIN_BASE_CASUALTIES: i64 = 10;
    pub const MAX_BASE_CASUALTIES: i64 = 50;
    /// Winner loses 30% of the base roll, loser 120%; in tenths
    pub const WINNER_LOSS_TENTHS: u32 = 3;
    pub const LOSER_LOSS_TENTHS: u32 = 12;

    pub const MIN_BATTLE_COST: i64 = 1000;
    pub const MAX_BATTLE_COST: i64 = 5000;

    pub const PEACE_BASE_CHANCE: f64 = 0.3;
    pub const WEARY_EXHAUSTION_ABOVE: f64 = 0.5;
    pub const WEARY_BONUS: f64 = 0.3;
    pub const CASUALTY_ADVANTAGE_RATIO: f64 = 1.5;
    pub const CASUALTY_ADVANTAGE_BONUS: f64 = 0.2;
    pub const REPARATIONS_PENALTY: f64 = 0.2;
    pub const TERRITORY_PENALTY: f64 = 0.3;

    pub const DECLARATION_RELATIONSHIP: i32 = -50;
    pub const DECLARATION_REPUTATION: i32 = -10;
    pub const PEACE_ACCEPTED_RELATIONSHIP: i32 = 20;
    pub const PEACE_REJECTED_RELATIONSHIP: i32 = -10;
}

use war_constants::*;

/// Conditions attached to a peace proposal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeaceTerms {
    /// Money demanded from the enemy; any positive amount counts
    #[serde(default)]
    pub reparations: f64,
    #[serde(default)]
    pub territory: bool,
}

impl PeaceTerms {
    pub fn white_peace() -> Self {
        Self::default()
    }

    /// Net change to the acceptance chance from the demands alone.
    pub fn demand_penalty(&self) -> f64 {
        let mut penalty = 0.0;
        if self.reparations > 0.0 {
            penalty += REPARATIONS_PENALTY;
        }
        if self.territory {
            penalty += TERRITORY_PENALTY;
        }
        penalty
    }
}

/// Result of one battle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleOutcome {
    pub war_id: String,
    pub enemy_city: String,
    pub turn: Turn,
    pub victory: bool,
    pub win_chance: f64,
    pub base_casualties: u32,
    pub our_casualties: u32,
    pub enemy_casualties: u32,
    pub cost: f64,
    pub war_exhaustion: f64,
}

/// Summary of a war that just ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarEnded {
    pub war_id: String,
    pub enemy_city: String,
    pub turn: Turn,
    pub reason: WarEndReason,
    pub duration_turns: u32,
    pub casualties_us: u32,
    pub casualties_enemy: u32,
    pub economic_cost: f64,
    pub war_exhaustion: f64,
}

/// An ongoing or finished war against one rival.
#[derive(Debug, Clone, PartialEq)]
pub struct War {
    pub id: String,
    pub enemy_city: String,
    pub war_type: WarType,
    pub started_turn: Turn,
    pub our_strength: f64,
    pub enemy_strength: f64,
    duration_turns: u32,
    casualties_us: u32,
    casualties_enemy: u32,
    economic_cost: f64,
    exhaustion: f64,
    ended: Option<WarEnding>,
}

impl War {
    pub fn new(
        id: String,
        enemy_city: impl Into<String>,
        war_type: WarType,
        started_turn: Turn,
        our_strength: f64,
        enemy_strength: f64,
    ) -> Self {
        Self {
            id,
            enemy_city: enemy_city.into(),
            war_type,
            started_turn,
            our_strength,
            enemy_strength,
            duration_turns: 0,
            casualties_us: 0,
            casualties_enemy: 0,
            economic_cost: 0.0,
            exhaustion: 0.0,
            ended: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.ended.is_none()
    }

    pub fn ended(&self) -> Option<WarEnding> {
        self.ended
    }

    pub fn duration_turns(&self) -> u32 {
        self.duration_turns
    }

    pub fn casualties_us(&self) -> u32 {
        self.casualties_us
    }

    pub fn casualties_enemy(&self) -> u32 {
        self.casualties_enemy
    }

    pub fn economic_cost(&self) -> f64 {
        self.economic_cost
    }

    pub fn exhaustion(&self) -> f64 {
        self.exhaustion
    }

    pub fn strength_ratio(&self) -> f64 {
        self.our_strength / self.enemy_strength.max(1.0)
    }

    /// `0.5 + (ratio - 1) * 0.2`, clamped to `[0.1, 0.9]`.
    pub fn win_chance(&self) -> f64 {
        clamp_between(
            WIN_CHANCE_BASE + (self.strength_ratio() - 1.0) * STRENGTH_RATIO_WEIGHT,
            MIN_WIN_CHANCE,
            MAX_WIN_CHANCE,
        )
    }

    /// Updates the elapsed duration.
    pub(crate) fn accrue(&mut self, turn: Turn) {
        self.duration_turns = turn.saturating_sub(self.started_turn);
    }

    /// Resolves one battle. Draws in order: victory, base casualties, cost.
    pub fn fight_battle<R: RandomSource + ?Sized>(
        &mut self,
        turn: Turn,
        exhaustion_step: f64,
        rng: &mut R,
    ) -> BattleOutcome {
        let win_chance = self.win_chance();
        let victory = roll(rng, win_chance);
        let base = rng.range_inclusive(MIN_BASE_CASUALTIES, MAX_BASE_CASUALTIES) as u32;

        let (ours, theirs) = if victory {
            (base * WINNER_LOSS_TENTHS / 10, base * LOSER_LOSS_TENTHS / 10)
        } else {
            (base * LOSER_LOSS_TENTHS / 10, base * WINNER_LOSS_TENTHS / 10)
        };
        self.casualties_us = self.casualties_us.saturating_add(ours);
        self.casualties_enemy = self.casualties_enemy.saturating_add(theirs);

        self.add_exhaustion(exhaustion_step);

        let cost = rng.range_inclusive(MIN_BATTLE_COST, MAX_BATTLE_COST) as f64;
        self.economic_cost += cost;

        BattleOutcome {
            war_id: self.id.clone(),
            enemy_city: self.enemy_city.clone(),
            turn,
            victory,
            win_chance,
            base_casualties: base,
            our_casualties: ours,
            enemy_casualties: theirs,
            cost,
            war_exhaustion: self.exhaustion,
        }
    }

    /// Raises exhaustion by a non-negative step, capped at 1.0.
    fn add_exhaustion(&mut self, step: f64) {
        let step = if step.is_finite() { step.max(0.0) } else { 0.0 };
        self.exhaustion = clamp_unit(self.exhaustion + step).max(self.exhaustion);
    }

    /// Chance the enemy accepts `terms` right now, in `[0, 1]`.
    pub fn peace_acceptance(&self, terms: &PeaceTerms) -> f64 {
        let mut chance = PEACE_BASE_CHANCE;
        if self.exhaustion > WEARY_EXHAUSTION_ABOVE {
            chance += WEARY_BONUS;
        }
        if self.casualties_enemy as f64 > self.casualties_us as f64 * CASUALTY_ADVANTAGE_RATIO {
            chance += CASUALTY_ADVANTAGE_BONUS;
        }
        clamp_unit(chance - terms.demand_penalty())
    }

    /// Marks the war finished.
    pub(crate) fn end(&mut self, turn: Turn, reason: WarEndReason) -> WarEnded {
        self.accrue(turn);
        self.ended = Some(WarEnding { turn, reason });
        WarEnded {
            war_id: self.id.clone(),
            enemy_city: self.enemy_city.clone(),
            turn,
            reason,
            duration_turns: self.duration_turns,
            casualties_us: self.casualties_us,
            casualties_enemy: self.casualties_enemy,
            economic_cost: self.economic_cost,
            war_exhaustion: self.exhaustion,
        }
    }

    pub fn to_record(&self) -> WarRecord {
        WarRecord {
            id: self.id.clone(),
            enemy_city: self.enemy_city.clone(),
            war_type: self.war_type,
            started_turn: self.started_turn,
            duration_turns: self.duration_turns,
            our_strength: self.our_strength,
            enemy_strength: self.enemy_strength,
            casualties_us: self.casualties_us,
            casualties_enemy: self.casualties_enemy,
            economic_cost: self.economic_cost,
            war_exhaustion: self.exhaustion,
            ended: self.ended,
        }
    }

    /// Rebuilds a war from a saved record, clamping exhaustion.
    pub fn from_record(record: &WarRecord) -> Self {
        Self {
            id: record.id.clone(),
            enemy_city: record.enemy_city.clone(),
            war_type: record.war_type,
            started_turn: record.started_turn,
            our_strength: record.our_strength,
            enemy_strength: record.enemy_strength,
            duration_turns: record.duration_turns,
            casualties_us: record.casualties_us,
            casualties_enemy: record.casualties_enemy,
            economic_cost: if record.economic_cost.is_finite() {
                record.economic_cost
            } else {
                0.0
            },
            exhaustion: clamp_unit(record.war_exhaustion),
            ended: record.ended,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;

    fn war(ours: f64, theirs: f64) -> War {
        War::new("war_3_militaria".into(), "militaria", WarType::Territorial, 3, ours, theirs)
    }

    #[test]
    fn test_win_chance() {
        assert!((war(2000.0, 1000.0).win_chance() - 0.7).abs() < 1e-12);
        assert_eq!(war(1000.0, 1000.0).win_chance(), 0.5);
        assert_eq!(war(10_000.0, 1000.0).win_chance(), 0.9);
        assert_eq!(war(100.0, 1000.0).win_chance(), 0.1);
        // enemy strength floors at 1
        assert_eq!(war(1.0, 0.0).strength_ratio(), 1.0);
    }

    #[test]
    fn test_victory_split() {
        let mut w = war(2000.0, 1000.0);
        let mut rng = ScriptedRng::new([0.5, 0.5, 0.0]);
        let battle = w.fight_battle(6, 0.05, &mut rng);

        assert!(battle.victory);
        assert_eq!(battle.base_casualties, 30);
        assert_eq!(battle.our_casualties, 9);
        assert_eq!(battle.enemy_casualties, 36);
        assert_eq!(battle.cost, 1000.0);
        assert!((w.exhaustion() - 0.05).abs() < 1e-12);
        assert_eq!(w.casualties_us(), 9);
        assert_eq!(w.economic_cost(), 1000.0);
    }

    #[test]
    fn test_defeat_split() {
        let mut w = war(1000.0, 1000.0);
        let mut rng = ScriptedRng::new([0.6, 0.0, 0.99999]);
        let battle = w.fight_battle(6, 0.05, &mut rng);

        assert!(!battle.victory);
        assert_eq!(battle.our_casualties, 12);
        assert_eq!(battle.enemy_casualties, 3);
        assert_eq!(battle.cost, 5000.0);
    }

    #[test]
    fn test_exhaustion_capped_and_monotonic() {
        let mut w = war(1000.0, 1000.0);
        let mut rng = ScriptedRng::constant(0.3);
        let mut last = 0.0;
        for turn in 0..40 {
            w.fight_battle(turn, 0.05, &mut rng);
            assert!(w.exhaustion() >= last);
            last = w.exhaustion();
        }
        assert_eq!(w.exhaustion(), 1.0);

        w.fight_battle(41, -0.5, &mut rng);
        assert_eq!(w.exhaustion(), 1.0);
    }

    #[test]
    fn test_peace_acceptance() {
        let mut w = war(1000.0, 1000.0);
        assert!((w.peace_acceptance(&PeaceTerms::white_peace()) - 0.3).abs() < 1e-12);

        w.exhaustion = 0.6;
        let territory = PeaceTerms {
            reparations: 0.0,
            territory: true,
        };
        assert!((w.peace_acceptance(&territory) - 0.3).abs() < 1e-12);

        w.casualties_enemy = 31;
        w.casualties_us = 20;
        assert!((w.peace_acceptance(&PeaceTerms::white_peace()) - 0.8).abs() < 1e-12);

        let harsh = PeaceTerms {
            reparations: 5000.0,
            territory: true,
        };
        w.exhaustion = 0.0;
        w.casualties_enemy = 0;
        assert_eq!(w.peace_acceptance(&harsh), 0.0);
    }

    #[test]
    fn test_end_and_record() {
        let mut w = war(1000.0, 1200.0);
        let ended = w.end(20, WarEndReason::PeaceAccepted);

        assert!(!w.is_active());
        assert_eq!(ended.duration_turns, 17);
        assert_eq!(w.to_record().ended.unwrap().reason, WarEndReason::PeaceAccepted);
    }

    #[test]
    fn test_from_record_clamps() {
        let mut record = war(1000.0, 1200.0).to_record();
        record.war_exhaustion = 1.7;
        record.economic_cost = f64::NAN;
        let w = War::from_record(&record);
        assert_eq!(w.exhaustion(), 1.0);
        assert_eq!(w.economic_cost(), 0.0);
        assert!(w.is_active());
    }
}
