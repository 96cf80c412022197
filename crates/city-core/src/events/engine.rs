//! Event Engine
//!
//! Samples at most one event per turn from the catalog, keeps the active
//! instances until the player resolves them or they run out of turns, and
//! records every resolution in history.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use city_model::{
    generate_event_instance_id, keys, most_recent, push_bounded, ActiveEventRecord, CitySnapshot,
    EffectMap, EventCategory, EventLedger, EventOutcome, EventSeverity, ResolvedEvent, Turn,
};

use crate::config::EventTuning;
use crate::error::EventError;
use crate::events::catalog::EventCatalog;
use crate::events::definition::{EventChoice, EventDefinition};
use crate::events::probability::{compose_probability, ProbabilityContext};
use crate::rng::RandomSource;

/// A newly activated event, handed to the driver for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivatedEvent {
    pub instance_id: String,
    pub definition_id: String,
    pub title: String,
    pub description: String,
    pub category: EventCategory,
    pub severity: EventSeverity,
    pub turn: Turn,
    pub remaining_turns: u32,
    /// Applied by the driver once, now
    pub auto_effects: EffectMap,
    pub choices: Vec<EventChoice>,
}

/// A choice as shown to the player, with affordability computed at read time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceView {
    pub id: String,
    pub label: String,
    pub description: String,
    pub cost: f64,
    pub requirements: BTreeMap<String, f64>,
    pub can_afford: bool,
}

impl ChoiceView {
    fn from_choice(choice: &EventChoice, treasury: f64) -> Self {
        Self {
            id: choice.id.clone(),
            label: choice.label.clone(),
            description: choice.description.clone(),
            cost: choice.cost,
            requirements: choice.requirements.clone(),
            can_afford: choice.affordable(treasury),
        }
    }
}

/// Aggregate counts over resolved events.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventStats {
    pub total: usize,
    pub active: usize,
    pub by_category: BTreeMap<EventCategory, usize>,
    pub by_severity: BTreeMap<EventSeverity, usize>,
    pub most_common_category: Option<EventCategory>,
}

/// Owns the catalog and the active and resolved event lists.
#[derive(Debug, Clone)]
pub struct EventEngine {
    catalog: EventCatalog,
    tuning: EventTuning,
    active: Vec<ActiveEventRecord>,
    history: Vec<ResolvedEvent>,
    adjustments: BTreeMap<String, f64>,
    /// Running counts over every resolution, including trimmed history
    totals: EventStats,
}

impl Default for EventEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl EventEngine {
    pub fn new(catalog: EventCatalog, tuning: EventTuning) -> Self {
        Self {
            catalog,
            tuning,
            active: Vec::new(),
            history: Vec::new(),
            adjustments: BTreeMap::new(),
            totals: EventStats::default(),
        }
    }

    /// Builtin catalog with default tuning.
    pub fn with_defaults() -> Self {
        Self::new(EventCatalog::builtin(), EventTuning::default())
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn active(&self) -> &[ActiveEventRecord] {
        &self.active
    }

    /// Most recent resolved events, oldest first, bounded by the history limit.
    pub fn history(&self) -> &[ResolvedEvent] {
        &self.history
    }

    /// Accumulated choice modifier for a definition.
    pub fn adjustment(&self, definition_id: &str) -> f64 {
        self.adjustments.get(definition_id).copied().unwrap_or(0.0)
    }

    fn context_for(&self, definition_id: &str) -> ProbabilityContext {
        ProbabilityContext {
            frequency_multiplier: self.tuning.frequency_multiplier,
            adjustment: self.adjustment(definition_id),
        }
    }

    /// This turn's chance for one definition, or `None` if it is not in the
    /// catalog.
    pub fn probability_of(&self, definition_id: &str, snapshot: &CitySnapshot) -> Option<f64> {
        self.catalog
            .get(definition_id)
            .map(|d| compose_probability(d, snapshot, self.context_for(&d.id)))
    }

    fn is_active(&self, definition_id: &str) -> bool {
        self.active.iter().any(|a| a.definition_id == definition_id)
    }

    /// Advances one turn: expires overdue instances, then samples.
    ///
    /// One draw is taken per definition with a non-zero chance, in catalog
    /// order, and one more to pick among several hits.
    pub fn tick<R: RandomSource + ?Sized>(
        &mut self,
        turn: Turn,
        snapshot: &CitySnapshot,
        rng: &mut R,
    ) -> Option<ActivatedEvent> {
        self.expire_overdue(turn);

        let mut hits: Vec<&EventDefinition> = Vec::new();
        for definition in self.catalog.iter() {
            if !definition.recurring && self.is_active(&definition.id) {
                continue;
            }
            let p = compose_probability(definition, snapshot, self.context_for(&definition.id));
            if p <= 0.0 {
                continue;
            }
            let draw = rng.next_f64();
            debug!(turn, event = %definition.id, p, draw, "event sampled");
            if draw < p {
                hits.push(definition);
            }
        }

        if hits.is_empty() {
            return None;
        }

        let index = rng.pick_index(hits.len()).min(hits.len() - 1);
        let picked = hits[index];
        let activated = ActivatedEvent {
            instance_id: generate_event_instance_id(&picked.id, turn),
            definition_id: picked.id.clone(),
            title: picked.title.clone(),
            description: picked.description.clone(),
            category: picked.category,
            severity: picked.severity,
            turn,
            remaining_turns: picked.duration_turns,
            auto_effects: picked.auto_effects.clone(),
            choices: picked.choices.clone(),
        };

        info!(
            turn,
            event = %activated.instance_id,
            category = %activated.category,
            severity = %activated.severity,
            candidates = hits.len(),
            "event activated"
        );

        self.active.push(ActiveEventRecord {
            instance_id: activated.instance_id.clone(),
            definition_id: activated.definition_id.clone(),
            activated_turn: turn,
            remaining_turns: activated.remaining_turns,
        });

        Some(activated)
    }

    /// Counts down instances activated before `turn`; those reaching zero
    /// move to history without re-applying their automatic effects.
    fn expire_overdue(&mut self, turn: Turn) {
        let mut still_active = Vec::with_capacity(self.active.len());
        let mut expired = Vec::new();

        for mut instance in self.active.drain(..) {
            if instance.activated_turn < turn {
                instance.remaining_turns = instance.remaining_turns.saturating_sub(1);
            }
            if instance.remaining_turns == 0 {
                expired.push(instance);
            } else {
                still_active.push(instance);
            }
        }
        self.active = still_active;

        for instance in expired {
            info!(turn, event = %instance.instance_id, "event expired without a choice");
            self.record(instance, turn, None, EventOutcome::Expired, EffectMap::new());
        }
    }

    /// Choices for an active instance, with affordability against `treasury`.
    pub fn choices(&self, instance_id: &str, treasury: f64) -> Result<Vec<ChoiceView>, EventError> {
        let instance = self
            .active
            .iter()
            .find(|a| a.instance_id == instance_id)
            .ok_or_else(|| self.missing_instance(instance_id))?;
        let definition = self
            .catalog
            .get(&instance.definition_id)
            .ok_or_else(|| EventError::UnknownEvent(instance_id.to_string()))?;

        Ok(definition
            .choices
            .iter()
            .map(|c| ChoiceView::from_choice(c, treasury))
            .collect())
    }

    fn missing_instance(&self, instance_id: &str) -> EventError {
        if self.history.iter().any(|h| h.instance_id == instance_id) {
            EventError::StaleEvent(instance_id.to_string())
        } else {
            EventError::UnknownEvent(instance_id.to_string())
        }
    }

    /// Resolves an active instance and returns the effects for the driver.
    ///
    /// A known choice yields its effects plus its cost as a negative money
    /// delta. An unknown choice falls back to the automatic effects. `None`
    /// accepts what already happened and yields nothing further.
    pub fn resolve(
        &mut self,
        instance_id: &str,
        choice_id: Option<&str>,
        turn: Turn,
    ) -> Result<EffectMap, EventError> {
        let Some(position) = self.active.iter().position(|a| a.instance_id == instance_id) else {
            let err = self.missing_instance(instance_id);
            warn!(event = %instance_id, error = %err, "event resolution rejected");
            return Err(err);
        };

        let Some(definition) = self.catalog.get(&self.active[position].definition_id) else {
            warn!(event = %instance_id, "active event has no catalog definition");
            return Err(EventError::UnknownEvent(instance_id.to_string()));
        };

        let (effects, chosen, outcome, modifier) = match choice_id {
            Some(id) => match definition.choice(id) {
                Some(choice) => {
                    let mut effects = choice.effects.clone();
                    if choice.cost > 0.0 {
                        effects.add(keys::MONEY, -choice.cost);
                    }
                    (
                        effects,
                        Some(choice.id.clone()),
                        EventOutcome::Chosen,
                        choice.probability_modifier,
                    )
                }
                None => {
                    warn!(event = %instance_id, choice = %id, "unknown choice, using automatic effects");
                    (
                        definition.auto_effects.clone(),
                        None,
                        EventOutcome::Declined,
                        0.0,
                    )
                }
            },
            None => (EffectMap::new(), None, EventOutcome::Declined, 0.0),
        };

        if modifier != 0.0 && modifier.is_finite() {
            *self
                .adjustments
                .entry(definition.id.clone())
                .or_insert(0.0) += modifier;
        }

        let instance = self.active.remove(position);
        info!(
            turn,
            event = %instance.instance_id,
            choice = chosen.as_deref().unwrap_or("-"),
            "event resolved"
        );
        self.record(instance, turn, chosen, outcome, effects.clone());

        Ok(effects)
    }

    fn record(
        &mut self,
        instance: ActiveEventRecord,
        turn: Turn,
        choice_id: Option<String>,
        outcome: EventOutcome,
        effects: EffectMap,
    ) {
        let (title, category, severity) = match self.catalog.get(&instance.definition_id) {
            Some(d) => (d.title.clone(), d.category, d.severity),
            None => (
                instance.definition_id.clone(),
                EventCategory::Social,
                EventSeverity::Minor,
            ),
        };

        self.totals.total += 1;
        *self.totals.by_category.entry(category).or_insert(0) += 1;
        *self.totals.by_severity.entry(severity).or_insert(0) += 1;

        let resolved = ResolvedEvent {
            instance_id: instance.instance_id,
            definition_id: instance.definition_id,
            title,
            category,
            severity,
            activated_turn: instance.activated_turn,
            resolved_turn: turn,
            choice_id,
            outcome,
            effects,
        };
        push_bounded(&mut self.history, resolved, self.tuning.history_limit);
    }

    /// Counts over every resolution so far, plus the number still active.
    pub fn stats(&self) -> EventStats {
        let mut stats = EventStats {
            active: self.active.len(),
            ..self.totals.clone()
        };

        let mut best: Option<(EventCategory, usize)> = None;
        for (category, count) in &stats.by_category {
            if best.map_or(true, |(_, n)| *count > n) {
                best = Some((*category, *count));
            }
        }
        stats.most_common_category = best.map(|(c, _)| c);

        stats
    }

    /// Serializable state with a bounded history.
    pub fn save_state(&self) -> EventLedger {
        EventLedger {
            snapshot_id: Uuid::new_v4(),
            active_events: self.active.clone(),
            event_history: most_recent(&self.history, self.tuning.history_limit),
            probability_adjustments: self.adjustments.clone(),
        }
    }

    /// Restores saved state. Active instances whose definition is not in
    /// this catalog are dropped.
    pub fn load_state(&mut self, ledger: EventLedger) {
        let (known, unknown): (Vec<_>, Vec<_>) = ledger
            .active_events
            .into_iter()
            .partition(|a| self.catalog.get(&a.definition_id).is_some());

        for dropped in &unknown {
            warn!(event = %dropped.instance_id, "dropping saved event with unknown definition");
        }

        self.active = known;
        self.history = most_recent(&ledger.event_history, self.tuning.history_limit);
        self.totals = EventStats::default();
        for resolved in &self.history {
            self.totals.total += 1;
            *self.totals.by_category.entry(resolved.category).or_insert(0) += 1;
            *self.totals.by_severity.entry(resolved.severity).or_insert(0) += 1;
        }
        self.adjustments = ledger
            .probability_adjustments
            .into_iter()
            .filter(|(_, v)| v.is_finite())
            .collect();

        info!(
            snapshot = %ledger.snapshot_id,
            active = self.active.len(),
            history = self.history.len(),
            "event state loaded"
        );
    }
}
