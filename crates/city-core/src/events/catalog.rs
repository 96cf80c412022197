//! Event Catalog
//!
//! The static, ordered set of event definitions the engine samples from.
//! Order is significant: sampling walks definitions in catalog order, so a
//! seeded run depends on it.

use serde::Deserialize;
use std::collections::HashSet;

use city_model::{keys, EventCategory, EventSeverity};

use crate::error::CatalogError;
use crate::events::definition::{EventChoice, EventDefinition};
use crate::odds::clamp_unit;

/// Ordered collection of event definitions with unique ids.
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    definitions: Vec<EventDefinition>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "event")]
    events: Vec<EventDefinition>,
}

impl EventCatalog {
    /// Builds a catalog, rejecting duplicate definition ids and blank choice ids.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = EventDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for mut definition in definitions {
            if !seen.insert(definition.id.clone()) {
                return Err(CatalogError::DuplicateId(definition.id));
            }
            if definition.choices.iter().any(|c| c.id.trim().is_empty()) {
                return Err(CatalogError::EmptyChoiceId(definition.id));
            }
            definition.base_probability = clamp_unit(definition.base_probability);
            definition.duration_turns = definition.duration_turns.max(1);
            out.push(definition);
        }

        Ok(Self { definitions: out })
    }

    /// Parses a catalog from `[[event]]` TOML tables.
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::from_definitions(file.events)
    }

    /// The catalog shipped with the game.
    pub fn builtin() -> Self {
        let mut definitions = advanced_events();
        definitions.extend(classic_events());
        Self { definitions }
    }

    pub fn get(&self, id: &str) -> Option<&EventDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Large, multi-option events with automatic effects.
fn advanced_events() -> Vec<EventDefinition> {
    vec![
        EventDefinition::new(
            "earthquake",
            "Earthquake",
            "A powerful earthquake has struck the city, destroying buildings and infrastructure.",
            EventCategory::Disaster,
            EventSeverity::Catastrophic,
            0.02,
        )
        .with_min_population(500)
        .with_auto_effect(keys::BUILDING_DAMAGE, 0.4)
        .with_auto_effect(keys::CASUALTIES, 100.0)
        .with_auto_effect(keys::SATISFACTION, -20.0)
        .with_choice(
            EventChoice::new(
                "emergency_response",
                "Immediate rescue operation",
                "Mobilize every emergency service",
            )
            .with_cost(5000.0)
            .with_effect(keys::SATISFACTION, 10.0)
            .with_effect(keys::CASUALTIES, -50.0),
        )
        .with_choice(
            EventChoice::new(
                "minimal_response",
                "Minimal response",
                "Save money and respond only to the worst cases",
            )
            .with_cost(1000.0)
            .with_effect(keys::SATISFACTION, -15.0)
            .with_effect(keys::CASUALTIES, 20.0),
        ),
        EventDefinition::new(
            "flood",
            "Great Flood",
            "The river has burst its banks, flooding a large part of the city.",
            EventCategory::Disaster,
            EventSeverity::Major,
            0.03,
        )
        .with_auto_effect(keys::BUILDING_DAMAGE, 0.2)
        .with_auto_effect(keys::CASUALTIES, 50.0)
        .with_auto_effect(keys::SATISFACTION, -10.0)
        .with_choice(
            EventChoice::new(
                "build_barriers",
                "Build flood barriers",
                "Raise temporary barriers quickly",
            )
            .with_cost(8000.0)
            .with_effect("flood_damage", -0.5)
            .with_effect(keys::SATISFACTION, 5.0),
        )
        .with_choice(
            EventChoice::new("evacuate", "Evacuate residents", "Run a mass evacuation")
                .with_cost(3000.0)
                .with_effect(keys::CASUALTIES, -80.0)
                .with_effect(keys::SATISFACTION, -5.0),
        ),
        EventDefinition::new(
            "economic_boom",
            "Economic Boom",
            "The region is enjoying unprecedented growth. The city can take advantage of it.",
            EventCategory::Economic,
            EventSeverity::Major,
            0.04,
        )
        .with_duration(10)
        .with_choice(
            EventChoice::new(
                "attract_business",
                "Attract business",
                "Invest in infrastructure for companies",
            )
            .with_cost(8000.0)
            .with_effect("income_multiplier", 0.3)
            .with_effect("population_growth", 0.2),
        )
        .with_choice(
            EventChoice::new(
                "conservative_approach",
                "Conservative approach",
                "Change nothing and keep things stable",
            )
            .with_effect(keys::SATISFACTION, 5.0),
        ),
        EventDefinition::new(
            "protests",
            "Social Protests",
            "Residents have taken to the streets to protest city policy.",
            EventCategory::Social,
            EventSeverity::Moderate,
            0.05,
        )
        .with_satisfaction_range(0.0, 60.0)
        .with_choice(
            EventChoice::new("negotiate", "Negotiate", "Meet the protest leaders")
                .with_cost(2000.0)
                .with_effect(keys::SATISFACTION, 15.0)
                .with_effect("policy_change", 1.0),
        )
        .with_choice(
            EventChoice::new(
                "ignore_protests",
                "Ignore the protests",
                "Wait for the protests to die down",
            )
            .with_effect(keys::SATISFACTION, -10.0)
            .with_effect("unrest", 0.2)
            .with_probability_modifier(0.02),
        ),
    ]
}

/// Builds a three-way choice from a money delta: spending becomes the cost,
/// income stays an effect.
fn classic_choice(id: &str, label: &str, money: f64, effects: &[(&str, f64)]) -> EventChoice {
    let mut choice = EventChoice::new(id, label, "");
    if money < 0.0 {
        choice = choice.with_cost(-money);
    } else if money > 0.0 {
        choice = choice.with_effect(keys::MONEY, money);
    }
    for (key, value) in effects {
        choice = choice.with_effect(*key, *value);
    }
    choice
}

/// Smaller everyday events.
fn classic_events() -> Vec<EventDefinition> {
    use city_model::keys::{MONEY, POPULATION, SATISFACTION};

    vec![
        EventDefinition::new(
            "district_fire",
            "District Fire",
            "A fire broke out in a residential district. The fire brigade asks for orders.",
            EventCategory::Disaster,
            EventSeverity::Moderate,
            0.04,
        )
        .with_auto_effect(POPULATION, -30.0)
        .with_auto_effect(SATISFACTION, -15.0)
        .with_choice(classic_choice(
            "send_all_units",
            "Send every fire unit",
            -500.0,
            &[(POPULATION, -10.0), (SATISFACTION, 5.0)],
        ))
        .with_choice(classic_choice(
            "evacuate_residents",
            "Evacuate residents",
            -200.0,
            &[(POPULATION, -5.0), (SATISFACTION, -5.0)],
        ))
        .with_choice(classic_choice(
            "ignore",
            "Ignore it",
            0.0,
            &[(POPULATION, -50.0), (SATISFACTION, -25.0)],
        ))
        .recurring(),
        EventDefinition::new(
            "flu_epidemic",
            "Flu Epidemic",
            "A flu epidemic is spreading through the city.",
            EventCategory::Health,
            EventSeverity::Major,
            0.03,
        )
        .with_auto_effect(POPULATION, -80.0)
        .with_auto_effect(SATISFACTION, -20.0)
        .with_choice(classic_choice(
            "quarantine",
            "Impose a quarantine",
            -1000.0,
            &[(POPULATION, -20.0), (SATISFACTION, -10.0)],
        ))
        .with_choice(classic_choice(
            "fund_hospitals",
            "Increase hospital funding",
            -1500.0,
            &[(POPULATION, -40.0), (SATISFACTION, 5.0)],
        ))
        .with_choice(classic_choice(
            "ignore",
            "Ignore it",
            0.0,
            &[(POPULATION, -120.0), (SATISFACTION, -35.0)],
        )),
        EventDefinition::new(
            "economic_crisis",
            "Economic Crisis",
            "A regional downturn is hitting local businesses and households.",
            EventCategory::Economic,
            EventSeverity::Moderate,
            0.03,
        )
        .with_auto_effect(MONEY, -800.0)
        .with_auto_effect(SATISFACTION, -15.0)
        .with_choice(classic_choice(
            "welfare_program",
            "Launch a welfare program",
            -1200.0,
            &[(SATISFACTION, 15.0)],
        ))
        .with_choice(classic_choice(
            "cut_taxes",
            "Cut taxes",
            -600.0,
            &[(SATISFACTION, 10.0)],
        ))
        .with_choice(classic_choice(
            "do_nothing",
            "Do nothing",
            0.0,
            &[(SATISFACTION, -20.0)],
        )),
        EventDefinition::new(
            "worker_strike",
            "Worker Strike",
            "Municipal workers have gone on strike demanding higher wages.",
            EventCategory::Social,
            EventSeverity::Moderate,
            0.03,
        )
        .with_auto_effect(SATISFACTION, -20.0)
        .with_choice(classic_choice(
            "meet_demands",
            "Meet the demands",
            -1500.0,
            &[(SATISFACTION, 20.0)],
        ))
        .with_choice(classic_choice(
            "negotiate_compromise",
            "Negotiate a compromise",
            -700.0,
            &[(SATISFACTION, 5.0)],
        ))
        .with_choice(
            classic_choice(
                "reject_demands",
                "Reject the demands",
                0.0,
                &[(SATISFACTION, -30.0)],
            )
            .with_probability_modifier(0.01),
        ),
        EventDefinition::new(
            "government_grant",
            "Government Grant",
            "The national government has awarded the city a development grant.",
            EventCategory::Political,
            EventSeverity::Minor,
            0.03,
        )
        .with_satisfaction_range(60.0, 100.0)
        .with_auto_effect(MONEY, 3000.0)
        .with_auto_effect(SATISFACTION, 10.0)
        .with_choice(classic_choice(
            "invest_in_transport",
            "Invest in transport",
            1000.0,
            &[(SATISFACTION, 15.0)],
        ))
        .with_choice(classic_choice(
            "build_parks",
            "Build parks",
            1500.0,
            &[(SATISFACTION, 20.0)],
        ))
        .with_choice(classic_choice(
            "save_for_later",
            "Save it for later",
            3000.0,
            &[(SATISFACTION, 5.0)],
        )),
        EventDefinition::new(
            "city_festival",
            "City Festival",
            "Residents propose a city-wide festival.",
            EventCategory::Social,
            EventSeverity::Minor,
            0.04,
        )
        .with_min_money(5000.0)
        .with_auto_effect(SATISFACTION, 5.0)
        .with_choice(classic_choice(
            "fund_festival",
            "Fund the festival",
            -1500.0,
            &[(SATISFACTION, 25.0), (POPULATION, 10.0)],
        ))
        .with_choice(classic_choice(
            "partial_support",
            "Partial support",
            -500.0,
            &[(SATISFACTION, 15.0)],
        ))
        .with_choice(classic_choice(
            "refuse",
            "Refuse",
            0.0,
            &[(SATISFACTION, -10.0)],
        ))
        .recurring(),
        EventDefinition::new(
            "new_company",
            "New Company",
            "A large company wants to open a branch in the city.",
            EventCategory::Economic,
            EventSeverity::Minor,
            0.03,
        )
        .with_auto_effect(POPULATION, 25.0)
        .with_auto_effect(SATISFACTION, 10.0)
        .with_choice(classic_choice(
            "tax_relief",
            "Offer tax relief",
            -500.0,
            &[(POPULATION, 40.0), (SATISFACTION, 15.0)],
        ))
        .with_choice(classic_choice(
            "standard_terms",
            "Standard terms",
            500.0,
            &[(POPULATION, 25.0), (SATISFACTION, 10.0)],
        ))
        .with_choice(classic_choice(
            "reject_offer",
            "Reject the offer",
            0.0,
            &[(SATISFACTION, -5.0)],
        )),
        EventDefinition::new(
            "earth_day",
            "Earth Day",
            "Environmental groups ask the city to back green initiatives.",
            EventCategory::Environmental,
            EventSeverity::Minor,
            0.02,
        )
        .with_auto_effect(SATISFACTION, 5.0)
        .with_choice(classic_choice(
            "fund_initiatives",
            "Fund the initiatives",
            -1000.0,
            &[(SATISFACTION, 20.0)],
        ))
        .with_choice(classic_choice(
            "symbolic_support",
            "Symbolic support",
            -200.0,
            &[(SATISFACTION, 10.0)],
        ))
        .with_choice(classic_choice(
            "no_support",
            "No support",
            0.0,
            &[(SATISFACTION, -10.0)],
        )),
        EventDefinition::new(
            "tech_innovation",
            "Technological Innovation",
            "Local researchers are close to a breakthrough and ask for funding.",
            EventCategory::Technological,
            EventSeverity::Minor,
            0.02,
        )
        .with_auto_effect(SATISFACTION, 5.0)
        .with_choice(classic_choice(
            "fund_research",
            "Fund the research",
            -2000.0,
            &[(SATISFACTION, 15.0)],
        ))
        .with_choice(classic_choice(
            "partial_support",
            "Partial support",
            -800.0,
            &[(SATISFACTION, 8.0)],
        ))
        .with_choice(classic_choice(
            "refuse",
            "Refuse",
            0.0,
            &[(SATISFACTION, -5.0)],
        )),
        EventDefinition::new(
            "harsh_winter",
            "Harsh Winter",
            "An unusually cold winter is straining heating and roads.",
            EventCategory::Environmental,
            EventSeverity::Moderate,
            0.02,
        )
        .with_auto_effect(MONEY, -1200.0)
        .with_auto_effect(SATISFACTION, -15.0)
        .with_choice(classic_choice(
            "increase_aid",
            "Increase social aid",
            -2000.0,
            &[(SATISFACTION, 10.0)],
        ))
        .with_choice(classic_choice(
            "standard_measures",
            "Standard measures",
            -1200.0,
            &[(SATISFACTION, -15.0)],
        ))
        .with_choice(classic_choice(
            "austerity",
            "Cut back on everything",
            -500.0,
            &[(SATISFACTION, -30.0)],
        )),
        EventDefinition::new(
            "heat_wave",
            "Heat Wave",
            "A heat wave is pushing the water and power networks to their limits.",
            EventCategory::Environmental,
            EventSeverity::Moderate,
            0.02,
        )
        .with_auto_effect(MONEY, -800.0)
        .with_auto_effect(SATISFACTION, -10.0)
        .with_choice(classic_choice(
            "emergency_systems",
            "Start emergency systems",
            -1500.0,
            &[(SATISFACTION, 5.0)],
        ))
        .with_choice(classic_choice(
            "ration_resources",
            "Ration resources",
            -400.0,
            &[(SATISFACTION, -20.0)],
        ))
        .with_choice(classic_choice(
            "do_nothing",
            "Do nothing",
            0.0,
            &[(SATISFACTION, -25.0), (POPULATION, -20.0)],
        )),
        EventDefinition::new(
            "crime_wave",
            "Crime Wave",
            "Burglaries and street crime are rising across several districts.",
            EventCategory::Crime,
            EventSeverity::Moderate,
            0.03,
        )
        .with_min_population(2000)
        .with_duration(3)
        .with_auto_effect(SATISFACTION, -10.0)
        .with_choice(classic_choice(
            "more_patrols",
            "Fund extra patrols",
            -1500.0,
            &[(SATISFACTION, 8.0)],
        ))
        .with_choice(classic_choice(
            "community_programs",
            "Community programs",
            -800.0,
            &[(SATISFACTION, 4.0)],
        ))
        .with_choice(
            classic_choice("ignore", "Ignore it", 0.0, &[(SATISFACTION, -15.0)])
                .with_probability_modifier(0.02),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_unique_and_categories_covered() {
        let catalog = EventCatalog::builtin();

        let ids: HashSet<_> = catalog.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.len(), catalog.len());

        for category in EventCategory::all() {
            assert!(
                catalog.iter().any(|d| d.category == *category),
                "no builtin event for {category}"
            );
        }
    }

    #[test]
    fn test_builtin_revalidates() {
        let catalog = EventCatalog::builtin();
        let rebuilt = EventCatalog::from_definitions(catalog.iter().cloned()).unwrap();
        assert_eq!(rebuilt.len(), catalog.len());
    }

    #[test]
    fn test_earthquake_definition() {
        let catalog = EventCatalog::builtin();
        let quake = catalog.get("earthquake").unwrap();

        assert_eq!(quake.gate.min_population, 500);
        assert_eq!(quake.severity, EventSeverity::Catastrophic);
        assert_eq!(quake.auto_effects.value(keys::CASUALTIES), 100.0);
        assert_eq!(quake.choice("emergency_response").unwrap().cost, 5000.0);
    }

    #[test]
    fn test_classic_spending_becomes_cost() {
        let catalog = EventCatalog::builtin();
        let fire = catalog.get("district_fire").unwrap();

        let send = fire.choice("send_all_units").unwrap();
        assert_eq!(send.cost, 500.0);
        assert!(send.effects.get(keys::MONEY).is_none());

        let grant = catalog.get("government_grant").unwrap();
        let save = grant.choice("save_for_later").unwrap();
        assert_eq!(save.cost, 0.0);
        assert_eq!(save.effects.value(keys::MONEY), 3000.0);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let def = EventDefinition::new(
            "twin",
            "Twin",
            "",
            EventCategory::Social,
            EventSeverity::Minor,
            0.1,
        );
        let err = EventCatalog::from_definitions([def.clone(), def]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(id) if id == "twin"));
    }

    #[test]
    fn test_from_toml_str() {
        let toml = r#"
            [[event]]
            id = "meteor"
            title = "Meteor Shower"
            description = "Rocks from the sky."
            category = "disaster"
            severity = "major"
            base_probability = 1.5
            duration_turns = 0

            [event.gate]
            min_population = 1000

            [event.auto_effects]
            building_damage = 0.1

            [[event.choices]]
            id = "shelter"
            label = "Open shelters"
            cost = 400.0

            [event.choices.effects]
            satisfaction = 5.0
        "#;

        let catalog = EventCatalog::from_toml_str(toml).unwrap();
        let meteor = catalog.get("meteor").unwrap();

        assert_eq!(meteor.base_probability, 1.0);
        assert_eq!(meteor.duration_turns, 1);
        assert_eq!(meteor.gate.min_population, 1000);
        assert_eq!(meteor.gate.max_population, 999_999);
        assert!(!meteor.recurring);
        assert_eq!(meteor.choice("shelter").unwrap().effects.value("satisfaction"), 5.0);
    }

    #[test]
    fn test_from_toml_bad_category() {
        let toml = r#"
            [[event]]
            id = "x"
            title = "X"
            description = ""
            category = "weather"
            severity = "minor"
            base_probability = 0.1
        "#;
        assert!(matches!(
            EventCatalog::from_toml_str(toml),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_choice_id_rejected() {
        let def = EventDefinition::new(
            "blank",
            "Blank",
            "",
            EventCategory::Social,
            EventSeverity::Minor,
            0.1,
        )
        .with_choice(EventChoice::new(" ", "Nothing", ""));
        assert!(matches!(
            EventCatalog::from_definitions([def]),
            Err(CatalogError::EmptyChoiceId(_))
        ));
    }
}
