//! Property-based tests for the clamping and monotonicity invariants.
//!
//! Run with: cargo test --release prop_

use proptest::prelude::*;

use city_core::diplomacy::{generate_roster, DiplomaticMission, RivalCity, RivalProfile, War};
use city_core::events::{compose_probability, ProbabilityContext};
use city_core::{CoreConfig, DiplomacyEngine, EventDefinition, PeaceTerms, SimRng};
use city_model::{
    CitySnapshot, EventCategory, EventSeverity, MissionType, RelationshipStatus, Specialization,
    WarType,
};

fn rival() -> RivalCity {
    RivalCity::new(
        "luxuria",
        "Luxuria",
        Specialization::Luxury,
        RivalProfile {
            military_strength: 900.0,
            economic_power: 3000.0,
            population: 40_000,
            aggression: 0.4,
            cooperation: 0.6,
            economic_focus: 0.7,
        },
    )
}

/// One scripted player command.
#[derive(Debug, Clone)]
enum Command {
    Mission(usize, usize, f64),
    Declare(usize),
    Peace(usize, bool),
    Nudge(usize, i32),
    Wait,
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        (0usize..8, 0usize..7, 0.0f64..20_000.0).prop_map(|(c, m, i)| Command::Mission(c, m, i)),
        (0usize..8).prop_map(Command::Declare),
        (0usize..8, any::<bool>()).prop_map(|(c, t)| Command::Peace(c, t)),
        (0usize..8, -300i32..300).prop_map(|(c, d)| Command::Nudge(c, d)),
        Just(Command::Wait),
    ]
}

fn assert_engine_bounded(engine: &DiplomacyEngine) -> Result<(), TestCaseError> {
    prop_assert!((0..=100).contains(&engine.reputation()));
    for city in engine.cities() {
        prop_assert!((-100..=100).contains(&city.relationship_points()));
        prop_assert!((0..=100).contains(&city.reputation()));
        if city.is_at_war() {
            prop_assert_eq!(city.status(), RelationshipStatus::AtWar);
        }
        prop_assert_eq!(city.is_at_war(), engine.war_with(&city.id).is_some());
    }
    for war in engine.active_wars() {
        prop_assert!((0.0..=1.0).contains(&war.exhaustion()));
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Relationship points stay in range under any sequence of deltas.
    #[test]
    fn prop_relationship_bounded(deltas in prop::collection::vec(any::<i32>(), 0..50)) {
        let mut city = rival();
        for (turn, delta) in deltas.into_iter().enumerate() {
            city.adjust_relationship(delta, turn as u32);
            prop_assert!((-100..=100).contains(&city.relationship_points()));
        }
    }

    /// The derived status always follows the points, and war overrides it.
    #[test]
    fn prop_status_derivation(points in -100i32..=100, at_war in any::<bool>()) {
        let status = RelationshipStatus::derive(points, at_war);
        if at_war {
            prop_assert_eq!(status, RelationshipStatus::AtWar);
        } else {
            prop_assert_ne!(status, RelationshipStatus::AtWar);
            prop_assert_eq!(status == RelationshipStatus::Allied, points >= 80);
        }
    }

    /// Composed event chances are always probabilities.
    #[test]
    fn prop_event_probability_is_unit(
        base in -1.0f64..2.0,
        population in 0u32..200_000,
        treasury in -50_000.0f64..100_000.0,
        satisfaction in -20.0f64..120.0,
        multiplier in -2.0f64..5.0,
        adjustment in -1.0f64..1.0,
        category in prop::sample::select(EventCategory::all().to_vec()),
    ) {
        let definition = EventDefinition::new(
            "probe", "Probe", "", category, EventSeverity::Moderate, base,
        );
        let snapshot = CitySnapshot::new(population, treasury, satisfaction);
        let ctx = ProbabilityContext { frequency_multiplier: multiplier, adjustment };
        let p = compose_probability(&definition, &snapshot, ctx);
        prop_assert!((0.0..=1.0).contains(&p));
    }

    /// Mission odds stay inside the success band for any standing.
    #[test]
    fn prop_mission_odds_banded(
        kind in prop::sample::select(MissionType::all().to_vec()),
        investment in -10_000.0f64..1_000_000.0,
        points in -100i32..=100,
        reputation in 0i32..=100,
    ) {
        let mission = DiplomaticMission::new("m".into(), &rival(), kind, investment);
        prop_assert!(mission.cost >= 0.0);
        let p = mission.success_probability(points, reputation);
        prop_assert!((0.1..=0.9).contains(&p));
    }

    /// Exhaustion never decreases and never leaves [0, 1].
    #[test]
    fn prop_exhaustion_monotonic(
        seed in any::<u64>(),
        steps in prop::collection::vec(-1.0f64..1.0, 1..40),
    ) {
        let mut rng = SimRng::seeded(seed);
        let mut war = War::new("w".into(), "luxuria", WarType::Trade, 0, 1000.0, 1500.0);
        let mut last = war.exhaustion();
        for (turn, step) in steps.into_iter().enumerate() {
            let battle = war.fight_battle(turn as u32, step, &mut rng);
            prop_assert!(battle.war_exhaustion >= last);
            prop_assert!(battle.war_exhaustion <= 1.0);
            prop_assert!((0.1..=0.9).contains(&battle.win_chance));
            last = battle.war_exhaustion;
        }
        let terms = PeaceTerms { reparations: 5.0, territory: true };
        prop_assert!((0.0..=1.0).contains(&war.peace_acceptance(&terms)));
    }

    /// Arbitrary command sequences never push the engine out of range.
    #[test]
    fn prop_engine_stays_bounded(
        seed in any::<u64>(),
        commands in prop::collection::vec(command(), 1..60),
    ) {
        let mut rng = SimRng::seeded(seed);
        let roster = generate_roster(&mut rng);
        let ids: Vec<String> = roster.iter().map(|c| c.id.clone()).collect();
        let mut engine = DiplomacyEngine::with_cities(&CoreConfig::default(), roster);
        let mut coffers = city_core::Coffers::new(1_000_000.0);
        let snapshot = CitySnapshot::new(20_000, 1_000_000.0, 50.0);

        for (i, command) in commands.into_iter().enumerate() {
            let turn = i as u32 + 1;
            match command {
                Command::Mission(c, m, investment) => {
                    let kind = MissionType::all()[m];
                    if let Some(handle) = engine.create_mission(&ids[c], kind, investment) {
                        let _ = engine.start_mission(handle, turn, &mut coffers);
                    }
                }
                Command::Declare(c) => {
                    let _ = engine.declare_war(&ids[c], WarType::Territorial, turn);
                }
                Command::Peace(c, territory) => {
                    let terms = PeaceTerms { reparations: 0.0, territory };
                    let _ = engine.propose_peace(&ids[c], &terms, turn, &mut rng);
                }
                Command::Nudge(c, delta) => {
                    if let Some(city) = engine.city_mut(&ids[c]) {
                        city.adjust_relationship(delta, turn);
                    }
                }
                Command::Wait => {}
            }
            engine.tick(turn, &snapshot, &mut rng);
            assert_engine_bounded(&engine)?;
        }
    }
}
