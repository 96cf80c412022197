//! Event Definitions
//!
//! Immutable catalog entries: what an event is, when it may occur, and the
//! options the player gets when it does.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use city_model::{CitySnapshot, EffectMap, EventCategory, EventSeverity};

use crate::odds::clamp_unit;

/// One option the player may pick when an event fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventChoice {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    /// Money the driver debits when this choice is taken
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub requirements: BTreeMap<String, f64>,
    #[serde(default)]
    pub effects: EffectMap,
    /// Added to this event's probability on every later turn
    #[serde(default)]
    pub probability_modifier: f64,
}

impl EventChoice {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: description.into(),
            cost: 0.0,
            requirements: BTreeMap::new(),
            effects: EffectMap::new(),
            probability_modifier: 0.0,
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost.max(0.0);
        self
    }

    pub fn with_effect(mut self, key: impl Into<String>, value: f64) -> Self {
        self.effects.add(key, value);
        self
    }

    pub fn with_requirement(mut self, key: impl Into<String>, value: f64) -> Self {
        self.requirements.insert(key.into(), value);
        self
    }

    pub fn with_probability_modifier(mut self, modifier: f64) -> Self {
        self.probability_modifier = modifier;
        self
    }

    /// Whether the choice's cost fits in `treasury`.
    pub fn affordable(&self, treasury: f64) -> bool {
        treasury >= self.cost
    }
}

/// Eligibility bounds checked against the city snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventGate {
    pub min_population: u32,
    pub max_population: u32,
    pub min_money: f64,
    pub min_satisfaction: f64,
    pub max_satisfaction: f64,
    pub required_structures: Vec<String>,
    pub required_capabilities: Vec<String>,
}

impl Default for EventGate {
    fn default() -> Self {
        Self {
            min_population: 0,
            max_population: 999_999,
            min_money: 0.0,
            min_satisfaction: 0.0,
            max_satisfaction: 100.0,
            required_structures: Vec::new(),
            required_capabilities: Vec::new(),
        }
    }
}

impl EventGate {
    /// True when every bound holds for `snapshot`.
    pub fn allows(&self, snapshot: &CitySnapshot) -> bool {
        if !(self.min_population..=self.max_population).contains(&snapshot.population) {
            return false;
        }
        if snapshot.treasury < self.min_money {
            return false;
        }
        if !(snapshot.satisfaction >= self.min_satisfaction
            && snapshot.satisfaction <= self.max_satisfaction)
        {
            return false;
        }
        self.required_structures
            .iter()
            .all(|s| snapshot.has_structure(s))
            && self
                .required_capabilities
                .iter()
                .all(|c| snapshot.has_capability(c))
    }
}

fn default_duration() -> u32 {
    1
}

/// A catalog entry describing one kind of random event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: EventCategory,
    pub severity: EventSeverity,
    /// Chance per turn before modifiers, 0-1
    pub base_probability: f64,
    #[serde(default)]
    pub choices: Vec<EventChoice>,
    #[serde(default)]
    pub gate: EventGate,
    /// Applied once, when the event activates
    #[serde(default)]
    pub auto_effects: EffectMap,
    #[serde(default = "default_duration")]
    pub duration_turns: u32,
    #[serde(default)]
    pub recurring: bool,
}

impl EventDefinition {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        category: EventCategory,
        severity: EventSeverity,
        base_probability: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            category,
            severity,
            base_probability: clamp_unit(base_probability),
            choices: Vec::new(),
            gate: EventGate::default(),
            auto_effects: EffectMap::new(),
            duration_turns: default_duration(),
            recurring: false,
        }
    }

    pub fn with_choice(mut self, choice: EventChoice) -> Self {
        self.choices.push(choice);
        self
    }

    pub fn with_auto_effect(mut self, key: impl Into<String>, value: f64) -> Self {
        self.auto_effects.add(key, value);
        self
    }

    pub fn with_population_range(mut self, min: u32, max: u32) -> Self {
        self.gate.min_population = min;
        self.gate.max_population = max;
        self
    }

    pub fn with_min_population(mut self, min: u32) -> Self {
        self.gate.min_population = min;
        self
    }

    pub fn with_min_money(mut self, min: f64) -> Self {
        self.gate.min_money = min;
        self
    }

    pub fn with_satisfaction_range(mut self, min: f64, max: f64) -> Self {
        self.gate.min_satisfaction = min;
        self.gate.max_satisfaction = max;
        self
    }

    pub fn requires_structure(mut self, structure: impl Into<String>) -> Self {
        self.gate.required_structures.push(structure.into());
        self
    }

    pub fn requires_capability(mut self, capability: impl Into<String>) -> Self {
        self.gate.required_capabilities.push(capability.into());
        self
    }

    pub fn with_duration(mut self, turns: u32) -> Self {
        self.duration_turns = turns.max(1);
        self
    }

    pub fn recurring(mut self) -> Self {
        self.recurring = true;
        self
    }

    /// Eligibility check against the current city.
    pub fn can_occur(&self, snapshot: &CitySnapshot) -> bool {
        self.gate.allows(snapshot)
    }

    pub fn choice(&self, choice_id: &str) -> Option<&EventChoice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }
}
