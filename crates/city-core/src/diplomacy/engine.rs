//! Diplomacy Engine
//!
//! Owns the rival roster, the mission lists, and the war lists. Every
//! mutation happens inside `tick` or one of the explicit player commands.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use city_model::{
    generate_mission_id, generate_war_id, keys, mission_sequence, most_recent, push_bounded,
    CitySnapshot, DiplomacyState, EffectMap, MissionRecord, MissionType, RelationshipStatus, Turn,
    WarEndReason, WarType,
};

use crate::config::{CoreConfig, DiplomacyTuning, WarTuning};
use crate::diplomacy::city::{city_constants, generate_roster, RivalCity};
use crate::diplomacy::mission::{DiplomaticMission, MissionEffect, MissionHandle, MissionResult};
use crate::diplomacy::war::{war_constants, BattleOutcome, PeaceTerms, War, WarEnded};
use crate::economy::Treasury;
use crate::error::DiplomacyError;
use crate::odds::{bounded_add, clamp_unit, roll};
use crate::rng::{RandomSource, SimRng};

/// Everything the diplomacy tick produced, for the driver to apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiplomacyTurnReport {
    pub turn: Turn,
    pub expired_alliances: Vec<String>,
    pub expired_treaties: Vec<String>,
    pub missions: Vec<MissionResult>,
    pub battles: Vec<BattleOutcome>,
    pub wars_ended: Vec<WarEnded>,
}

impl DiplomacyTurnReport {
    pub fn is_quiet(&self) -> bool {
        self.expired_alliances.is_empty()
            && self.expired_treaties.is_empty()
            && self.missions.is_empty()
            && self.battles.is_empty()
            && self.wars_ended.is_empty()
    }
}

/// Headline numbers for the diplomacy screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiplomacySummary {
    pub reputation: i32,
    pub active_missions: usize,
    pub active_wars: usize,
    pub allies: usize,
    pub friendly: usize,
    pub neutral: usize,
    pub enemies: usize,
    pub at_war: usize,
    pub peace_treaties: usize,
}

/// Effects of one reward or penalty table, after application.
#[derive(Debug, Default)]
struct AppliedEffects {
    economy: EffectMap,
    war_declared: Option<String>,
    war_ended: Option<WarEnded>,
}

#[derive(Debug, Clone)]
pub struct DiplomacyEngine {
    tuning: DiplomacyTuning,
    war_tuning: WarTuning,
    reputation: i32,
    cities: BTreeMap<String, RivalCity>,
    active_missions: Vec<DiplomaticMission>,
    mission_history: Vec<MissionRecord>,
    active_wars: Vec<War>,
    war_history: Vec<War>,
    player_strength: f64,
    next_mission_seq: u64,
}

impl DiplomacyEngine {
    /// Creates the engine with a freshly generated roster. The roster uses
    /// `roster_seed` when configured, otherwise draws from `rng`.
    pub fn new<R: RandomSource + ?Sized>(config: &CoreConfig, rng: &mut R) -> Self {
        let roster = match config.diplomacy.roster_seed {
            Some(seed) => generate_roster(&mut SimRng::seeded(seed)),
            None => generate_roster(rng),
        };
        Self::with_cities(config, roster)
    }

    /// Creates the engine around an explicit set of rivals.
    pub fn with_cities(config: &CoreConfig, cities: impl IntoIterator<Item = RivalCity>) -> Self {
        let reputation = config.diplomacy.starting_reputation.clamp(
            city_constants::MIN_REPUTATION,
            city_constants::MAX_REPUTATION,
        );
        Self {
            tuning: config.diplomacy.clone(),
            war_tuning: config.war.clone(),
            reputation,
            cities: cities.into_iter().map(|c| (c.id.clone(), c)).collect(),
            active_missions: Vec::new(),
            mission_history: Vec::new(),
            active_wars: Vec::new(),
            war_history: Vec::new(),
            player_strength: config.war.player_base_strength,
            next_mission_seq: 1,
        }
    }

    /// Player's global diplomatic reputation, 0-100.
    pub fn reputation(&self) -> i32 {
        self.reputation
    }

    pub fn player_strength(&self) -> f64 {
        self.player_strength
    }

    pub fn city(&self, city_id: &str) -> Option<&RivalCity> {
        self.cities.get(city_id)
    }

    /// Mutable access for scripted setups. Standing still goes through the
    /// clamped setters.
    pub fn city_mut(&mut self, city_id: &str) -> Option<&mut RivalCity> {
        self.cities.get_mut(city_id)
    }

    pub fn cities(&self) -> impl Iterator<Item = &RivalCity> {
        self.cities.values()
    }

    pub fn active_missions(&self) -> &[DiplomaticMission] {
        &self.active_missions
    }

    pub fn mission_history(&self) -> &[MissionRecord] {
        &self.mission_history
    }

    pub fn active_wars(&self) -> &[War] {
        &self.active_wars
    }

    pub fn war_history(&self) -> &[War] {
        &self.war_history
    }

    pub fn war_with(&self, city_id: &str) -> Option<&War> {
        self.active_wars.iter().find(|w| w.enemy_city == city_id)
    }

    /// City id to treaty expiry turn.
    pub fn peace_treaties(&self) -> BTreeMap<String, Turn> {
        self.cities
            .values()
            .filter_map(|c| c.peace_treaty_expires_turn().map(|t| (c.id.clone(), t)))
            .collect()
    }

    fn adjust_reputation(&mut self, delta: i32) {
        self.reputation = bounded_add(
            self.reputation,
            delta,
            city_constants::MIN_REPUTATION,
            city_constants::MAX_REPUTATION,
        );
    }

    /// Refreshes the player's war strength from the city snapshot.
    pub fn refresh_player_strength(&mut self, snapshot: &CitySnapshot) {
        self.player_strength =
            self.war_tuning.player_base_strength + 0.001 * snapshot.population as f64;
        for war in &mut self.active_wars {
            war.our_strength = self.player_strength;
        }
    }

    /// Advances one turn: expiries, then missions, then wars.
    pub fn tick<R: RandomSource + ?Sized>(
        &mut self,
        turn: Turn,
        snapshot: &CitySnapshot,
        rng: &mut R,
    ) -> DiplomacyTurnReport {
        self.refresh_player_strength(snapshot);

        let mut report = DiplomacyTurnReport {
            turn,
            ..DiplomacyTurnReport::default()
        };

        for city in self.cities.values_mut() {
            if city.expire_alliance(turn) {
                info!(turn, city = %city.id, "alliance expired");
                report.expired_alliances.push(city.id.clone());
            }
            if city.expire_peace_treaty(turn) {
                info!(turn, city = %city.id, "peace treaty expired");
                report.expired_treaties.push(city.id.clone());
            }
        }

        let (missions, mut ended_by_missions) = self.update_missions(turn, rng);
        report.missions = missions;

        let (battles, ended) = self.process_wars(turn, rng);
        report.battles = battles;
        report.wars_ended.append(&mut ended_by_missions);
        report.wars_ended.extend(ended);

        report
    }

    // -----------------------------------------------------------------------
    // Missions
    // -----------------------------------------------------------------------

    /// Prepares a mission. Returns `None` for an unknown target, or when the
    /// target is at war and the mission is not a peace treaty.
    pub fn create_mission(
        &mut self,
        city_id: &str,
        mission_type: MissionType,
        investment: f64,
    ) -> Option<MissionHandle> {
        let Some(city) = self.cities.get(city_id) else {
            warn!(city = %city_id, "mission rejected: unknown city");
            return None;
        };
        if city.is_at_war() && mission_type != MissionType::PeaceTreaty {
            warn!(city = %city_id, mission = %mission_type, "mission rejected: city is at war");
            return None;
        }

        let id = generate_mission_id(self.next_mission_seq, city_id);
        self.next_mission_seq += 1;

        Some(MissionHandle {
            mission: DiplomaticMission::new(id, city, mission_type, investment),
        })
    }

    /// Debits the mission cost and, only if that succeeds, makes the mission
    /// active. Returns the mission id.
    pub fn start_mission<T: Treasury + ?Sized>(
        &mut self,
        handle: MissionHandle,
        turn: Turn,
        treasury: &mut T,
    ) -> Result<String, DiplomacyError> {
        let mut mission = handle.mission;

        if !treasury.can_afford(mission.cost) {
            let err = DiplomacyError::InsufficientFunds {
                needed: mission.cost,
                available: treasury.balance(),
            };
            warn!(mission = %mission.id, error = %err, "mission not started");
            return Err(err);
        }

        treasury.spend(mission.cost);
        mission.started_turn = turn;

        info!(
            turn,
            mission = %mission.id,
            kind = %mission.mission_type,
            city = %mission.target_city,
            cost = mission.cost,
            "mission started"
        );

        let id = mission.id.clone();
        self.active_missions.push(mission);
        Ok(id)
    }

    /// Counts every active mission down and resolves the ones that are due.
    pub fn update_missions<R: RandomSource + ?Sized>(
        &mut self,
        turn: Turn,
        rng: &mut R,
    ) -> (Vec<MissionResult>, Vec<WarEnded>) {
        let mut results = Vec::new();
        let mut wars_ended = Vec::new();
        let mut still_active = Vec::new();
        let limit = self.tuning.history_limit;

        for mut mission in std::mem::take(&mut self.active_missions) {
            if !mission.countdown() {
                still_active.push(mission);
                continue;
            }

            match self.resolve_mission(&mut mission, turn, rng) {
                Ok((result, ended)) => {
                    results.push(result);
                    wars_ended.extend(ended);
                    push_bounded(&mut self.mission_history, mission.to_record(), limit);
                }
                Err(err) => {
                    error!(mission = %mission.id, error = %err, "mission dropped unresolved");
                }
            }
        }

        self.active_missions = still_active;

        (results, wars_ended)
    }

    fn resolve_mission<R: RandomSource + ?Sized>(
        &mut self,
        mission: &mut DiplomaticMission,
        turn: Turn,
        rng: &mut R,
    ) -> Result<(MissionResult, Option<WarEnded>), DiplomacyError> {
        let points = self
            .cities
            .get(&mission.target_city)
            .map(|c| c.relationship_points())
            .ok_or_else(|| DiplomacyError::UnknownCity(mission.target_city.clone()))?;

        let (success, p) = mission.resolve(points, self.reputation, turn, rng)?;
        let table = if success {
            mission.rewards.clone()
        } else {
            mission.penalties.clone()
        };
        let applied = self.apply_effects(&mission.target_city, &table, turn, rng);

        let city_name = self
            .cities
            .get(&mission.target_city)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| mission.target_city.clone());
        let message = if success {
            format!("{} mission to {} succeeded", mission.mission_type, city_name)
        } else {
            format!("{} mission to {} failed", mission.mission_type, city_name)
        };

        info!(
            turn,
            mission = %mission.id,
            success,
            p,
            "mission resolved"
        );

        Ok((
            MissionResult {
                mission_id: mission.id.clone(),
                target_city: mission.target_city.clone(),
                mission_type: mission.mission_type,
                status: mission.status(),
                success_probability: p,
                effects: applied.economy,
                war_declared: applied.war_declared,
                message,
            },
            applied.war_ended,
        ))
    }

    fn apply_effects<R: RandomSource + ?Sized>(
        &mut self,
        city_id: &str,
        effects: &[MissionEffect],
        turn: Turn,
        rng: &mut R,
    ) -> AppliedEffects {
        let mut applied = AppliedEffects::default();

        for effect in effects {
            // checked per effect: a treaty's EndWar lifts the war before its gains
            let at_war = self.cities.get(city_id).map_or(true, |c| c.is_at_war());

            match effect {
                MissionEffect::Relationship(delta) if *delta > 0 && at_war => {
                    debug!(turn, city = %city_id, delta, "relationship gain withheld during war");
                }
                MissionEffect::Relationship(delta) => {
                    if let Some(city) = self.cities.get_mut(city_id) {
                        city.adjust_relationship(*delta, turn);
                    }
                }
                MissionEffect::Reputation(delta) => self.adjust_reputation(*delta),
                MissionEffect::Alliance { .. } if at_war => {
                    debug!(turn, city = %city_id, "alliance withheld during war");
                }
                MissionEffect::Alliance { turns } => {
                    if let Some(city) = self.cities.get_mut(city_id) {
                        city.grant_alliance(turn, *turns);
                        info!(turn, city = %city_id, expires = turn + turns, "alliance formed");
                    }
                }
                MissionEffect::EndWar => {
                    if let Some(ended) = self.end_war(city_id, turn, WarEndReason::PeaceTreaty) {
                        applied.war_ended = Some(ended);
                    }
                }
                MissionEffect::PeaceTreaty { turns } => {
                    if let Some(city) = self.cities.get_mut(city_id) {
                        city.register_peace_treaty(turn, *turns);
                    }
                }
                MissionEffect::WarRisk(chance) => {
                    if !at_war && roll(rng, *chance) {
                        warn!(turn, city = %city_id, "failed mission provoked a war");
                        applied.war_declared =
                            self.start_war(city_id, WarType::Ideological, turn);
                    }
                }
                MissionEffect::Economy { key, value } => {
                    applied.economy.add(key.clone(), *value);
                    if key == keys::TRADE_BONUS {
                        if let Some(city) = self.cities.get_mut(city_id) {
                            city.trade_volume += value;
                        }
                    }
                }
            }
        }

        applied
    }

    // -----------------------------------------------------------------------
    // Wars
    // -----------------------------------------------------------------------

    /// Declares war on a rival that is not at war, not allied, and not bound
    /// by a live alliance. Returns the war id.
    pub fn declare_war(
        &mut self,
        city_id: &str,
        war_type: WarType,
        turn: Turn,
    ) -> Result<String, DiplomacyError> {
        let Some(city) = self.cities.get(city_id) else {
            warn!(city = %city_id, "war declaration rejected: unknown city");
            return Err(DiplomacyError::UnknownCity(city_id.to_string()));
        };
        if !city.can_declare_war(turn) {
            warn!(
                city = %city_id,
                status = %city.status(),
                "war declaration rejected"
            );
            return Err(DiplomacyError::CannotDeclareWar(city_id.to_string()));
        }

        self.start_war(city_id, war_type, turn)
            .ok_or_else(|| DiplomacyError::UnknownCity(city_id.to_string()))
    }

    /// Opens a war without the eligibility check. Used for declarations and
    /// for wars provoked by failed missions.
    fn start_war(&mut self, city_id: &str, war_type: WarType, turn: Turn) -> Option<String> {
        let player_strength = self.player_strength;
        let city = self.cities.get_mut(city_id)?;

        let war = War::new(
            generate_war_id(turn, city_id),
            city_id,
            war_type,
            turn,
            player_strength,
            city.war_strength(),
        );

        city.enter_war(turn);
        city.adjust_relationship(war_constants::DECLARATION_RELATIONSHIP, turn);

        info!(
            turn,
            war = %war.id,
            kind = %war_type,
            our_strength = war.our_strength,
            enemy_strength = war.enemy_strength,
            "war declared"
        );

        let id = war.id.clone();
        self.active_wars.push(war);
        self.adjust_reputation(war_constants::DECLARATION_REPUTATION);
        Some(id)
    }

    /// Closes the active war with `city_id`, if any.
    fn end_war(&mut self, city_id: &str, turn: Turn, reason: WarEndReason) -> Option<WarEnded> {
        let position = self.active_wars.iter().position(|w| w.enemy_city == city_id)?;
        let mut war = self.active_wars.remove(position);
        let ended = war.end(turn, reason);

        if let Some(city) = self.cities.get_mut(city_id) {
            city.leave_war(turn);
        }

        info!(
            turn,
            war = %war.id,
            reason = ?reason,
            duration = ended.duration_turns,
            "war ended"
        );
        push_bounded(&mut self.war_history, war, self.tuning.history_limit);
        Some(ended)
    }

    /// Accrues duration for every active war, fights the battles that are
    /// due, and ends wars past the exhaustion or duration limit.
    pub fn process_wars<R: RandomSource + ?Sized>(
        &mut self,
        turn: Turn,
        rng: &mut R,
    ) -> (Vec<BattleOutcome>, Vec<WarEnded>) {
        let interval = self.war_tuning.battle_interval_turns.max(1);
        let mut battles = Vec::new();
        let mut finished = Vec::new();

        for war in &mut self.active_wars {
            war.accrue(turn);
            let elapsed = turn.saturating_sub(war.started_turn);

            if elapsed > 0 && elapsed % interval == 0 {
                let battle = war.fight_battle(turn, self.war_tuning.exhaustion_per_battle, rng);
                debug!(
                    turn,
                    war = %war.id,
                    victory = battle.victory,
                    exhaustion = battle.war_exhaustion,
                    "battle fought"
                );
                battles.push(battle);
            }

            if war.exhaustion() > self.war_tuning.exhaustion_limit {
                finished.push((war.enemy_city.clone(), WarEndReason::Exhaustion));
            } else if war.duration_turns() > self.war_tuning.max_duration_turns {
                finished.push((war.enemy_city.clone(), WarEndReason::Duration));
            }
        }

        let ended = finished
            .into_iter()
            .filter_map(|(city_id, reason)| self.end_war(&city_id, turn, reason))
            .collect();

        (battles, ended)
    }

    /// Offers peace. Acceptance ends the war and improves relations;
    /// rejection sours them. Takes exactly one draw.
    pub fn propose_peace<R: RandomSource + ?Sized>(
        &mut self,
        city_id: &str,
        terms: &PeaceTerms,
        turn: Turn,
        rng: &mut R,
    ) -> Result<bool, DiplomacyError> {
        let Some(city) = self.cities.get(city_id) else {
            return Err(DiplomacyError::UnknownCity(city_id.to_string()));
        };
        if !city.is_at_war() {
            warn!(city = %city_id, "peace proposal rejected: not at war");
            return Err(DiplomacyError::NotAtWar(city_id.to_string()));
        }

        let chance = match self.war_with(city_id) {
            Some(war) => war.peace_acceptance(terms),
            None => clamp_unit(war_constants::PEACE_BASE_CHANCE - terms.demand_penalty()),
        };
        let accepted = roll(rng, chance);

        if accepted {
            if self.end_war(city_id, turn, WarEndReason::PeaceAccepted).is_none() {
                if let Some(city) = self.cities.get_mut(city_id) {
                    city.leave_war(turn);
                }
            }
        }

        let delta = if accepted {
            war_constants::PEACE_ACCEPTED_RELATIONSHIP
        } else {
            war_constants::PEACE_REJECTED_RELATIONSHIP
        };
        if let Some(city) = self.cities.get_mut(city_id) {
            city.adjust_relationship(delta, turn);
        }

        info!(turn, city = %city_id, chance, accepted, "peace proposed");
        Ok(accepted)
    }

    // -----------------------------------------------------------------------
    // Queries and persistence
    // -----------------------------------------------------------------------

    pub fn summary(&self) -> DiplomacySummary {
        let mut summary = DiplomacySummary {
            reputation: self.reputation,
            active_missions: self.active_missions.len(),
            active_wars: self.active_wars.len(),
            ..DiplomacySummary::default()
        };

        for city in self.cities.values() {
            match city.status() {
                RelationshipStatus::Allied => summary.allies += 1,
                RelationshipStatus::Friendly => summary.friendly += 1,
                RelationshipStatus::Neutral => summary.neutral += 1,
                RelationshipStatus::Hostile => summary.enemies += 1,
                RelationshipStatus::AtWar => summary.at_war += 1,
            }
            if city.peace_treaty_expires_turn().is_some() {
                summary.peace_treaties += 1;
            }
        }

        summary
    }

    /// Serializable state with bounded histories.
    pub fn save_state(&self) -> DiplomacyState {
        let limit = self.tuning.history_limit;
        let war_history: Vec<_> = self.war_history.iter().map(War::to_record).collect();

        DiplomacyState {
            snapshot_id: Uuid::new_v4(),
            diplomatic_reputation: self.reputation,
            cities: self
                .cities
                .values()
                .map(|c| (c.id.clone(), c.to_record()))
                .collect(),
            active_wars: self.active_wars.iter().map(War::to_record).collect(),
            war_history: most_recent(&war_history, limit),
            peace_treaties: self.peace_treaties(),
            mission_history: most_recent(&self.mission_history, limit),
        }
    }

    /// Restores saved standing onto the current roster. Cities not in the
    /// roster are skipped, and each city's at-war flag follows the saved
    /// active wars.
    pub fn load_state(&mut self, state: DiplomacyState) {
        self.reputation = state.diplomatic_reputation.clamp(
            city_constants::MIN_REPUTATION,
            city_constants::MAX_REPUTATION,
        );

        for (city_id, record) in &state.cities {
            match self.cities.get_mut(city_id) {
                Some(city) => {
                    city.apply_record(record, state.peace_treaties.get(city_id).copied())
                }
                None => warn!(city = %city_id, "skipping saved city not in roster"),
            }
        }

        self.active_wars = state
            .active_wars
            .iter()
            .filter(|w| w.ended.is_none() && self.cities.contains_key(&w.enemy_city))
            .map(War::from_record)
            .collect();
        let limit = self.tuning.history_limit;
        self.war_history = most_recent(&state.war_history, limit)
            .iter()
            .map(War::from_record)
            .collect();
        self.mission_history = most_recent(&state.mission_history, limit);
        self.active_missions.clear();

        // ids handed out before the save must not be reused
        if let Some(last) = state
            .mission_history
            .iter()
            .filter_map(|m| mission_sequence(&m.id))
            .max()
        {
            self.next_mission_seq = self.next_mission_seq.max(last + 1);
        }

        for city in self.cities.values_mut() {
            let war = self.active_wars.iter().find(|w| w.enemy_city == city.id);
            match (city.is_at_war(), war) {
                (false, Some(w)) => {
                    warn!(city = %city.id, "saved war without at-war flag");
                    city.enter_war(w.started_turn);
                }
                (true, None) => {
                    warn!(city = %city.id, "saved at-war flag without a war");
                    city.leave_war(city.last_interaction_turn());
                }
                _ => {}
            }
        }

        info!(
            snapshot = %state.snapshot_id,
            wars = self.active_wars.len(),
            reputation = self.reputation,
            "diplomacy state loaded"
        );
    }
}
