//! Event Probability
//!
//! Composes a definition's per-turn chance from its base probability and the
//! city snapshot. Ineligible definitions always compose to zero.

use city_model::{CitySnapshot, EventCategory};

use crate::events::definition::EventDefinition;
use crate::odds::clamp_unit;

/// Probability constants
pub mod probability_constants {
    /// Population at which population-driven categories reach their base rate
    pub const POPULATION_REFERENCE: f64 = 5000.0;
    /// Cap on the population multiplier
    pub const POPULATION_FACTOR_CAP: f64 = 2.0;
    /// Satisfaction below which social unrest becomes more likely
    pub const DISSATISFACTION_PIVOT: f64 = 50.0;
    /// Treasury below which crime and health events worsen
    pub const SCARCITY_THRESHOLD: f64 = 5000.0;
    /// Multiplier applied under scarcity
    pub const SCARCITY_FACTOR: f64 = 1.5;
}

use probability_constants::*;

/// Difficulty and history inputs layered on top of the snapshot factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityContext {
    /// Scales the composed chance; 1.0 leaves it untouched
    pub frequency_multiplier: f64,
    /// Accumulated choice modifiers for this definition
    pub adjustment: f64,
}

impl Default for ProbabilityContext {
    fn default() -> Self {
        Self {
            frequency_multiplier: 1.0,
            adjustment: 0.0,
        }
    }
}

/// Multiplier from population size, for categories that grow with the city.
pub fn population_factor(category: EventCategory, population: u32) -> f64 {
    if category.scales_with_population() {
        (population as f64 / POPULATION_REFERENCE).min(POPULATION_FACTOR_CAP)
    } else {
        1.0
    }
}

/// Multiplier from low satisfaction; only social events react.
pub fn dissatisfaction_factor(category: EventCategory, satisfaction: f64) -> f64 {
    if category == EventCategory::Social && satisfaction < DISSATISFACTION_PIVOT {
        1.0 + (DISSATISFACTION_PIVOT - satisfaction) / 100.0
    } else {
        1.0
    }
}

/// Multiplier from an empty treasury.
pub fn scarcity_factor(category: EventCategory, treasury: f64) -> f64 {
    if category.worsens_with_scarcity() && treasury < SCARCITY_THRESHOLD {
        SCARCITY_FACTOR
    } else {
        1.0
    }
}

/// Chance this turn that `definition` fires, in `[0, 1]`.
///
/// Factors apply in a fixed order: population, dissatisfaction, scarcity,
/// difficulty multiplier, then the accumulated choice adjustment, then the
/// final clamp.
pub fn compose_probability(
    definition: &EventDefinition,
    snapshot: &CitySnapshot,
    context: ProbabilityContext,
) -> f64 {
    if !definition.can_occur(snapshot) {
        return 0.0;
    }

    let category = definition.category;
    let mut p = definition.base_probability;
    p *= population_factor(category, snapshot.population);
    p *= dissatisfaction_factor(category, snapshot.satisfaction);
    p *= scarcity_factor(category, snapshot.treasury);
    p *= context.frequency_multiplier.max(0.0);
    p += context.adjustment;

    clamp_unit(p)
}
