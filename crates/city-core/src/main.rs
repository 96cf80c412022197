//! Headless City Simulation Driver
//!
//! Runs a seeded campaign against both engines: events are answered with the
//! cheapest affordable choice, and a steady stream of trade and cultural
//! missions keeps the diplomacy side busy.

use clap::Parser;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::prelude::*;

use city_core::{
    default_config_toml, ActivatedEvent, Coffers, CoreConfig, DiplomacyEngine,
    DiplomacyTurnReport, EventCatalog, EventEngine, SimRng, Treasury,
};
use city_model::{keys, CitySnapshot, EffectMap, MissionType, SaveGame, Turn};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "city_sim")]
#[command(about = "Headless city event and diplomacy simulation")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of turns to simulate
    #[arg(long, default_value_t = 100)]
    turns: u32,

    /// Tuning file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Starting population
    #[arg(long, default_value_t = 5000)]
    population: u32,

    /// Starting treasury
    #[arg(long, default_value_t = 50_000.0)]
    treasury: f64,

    /// Write the final save state as JSON
    #[arg(long)]
    save: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

/// Turns between mission dispatches.
const MISSION_INTERVAL: Turn = 5;

/// The toy city the campaign mutates.
struct Campaign {
    snapshot: CitySnapshot,
    coffers: Coffers,
    events: EventEngine,
    diplomacy: DiplomacyEngine,
    rng: SimRng,
}

impl Campaign {
    fn new(args: &Args, config: &CoreConfig) -> Self {
        let mut rng = SimRng::seeded(args.seed);
        let diplomacy = DiplomacyEngine::new(config, &mut rng);
        Self {
            snapshot: CitySnapshot::new(args.population, args.treasury, 50.0),
            coffers: Coffers::new(args.treasury),
            events: EventEngine::new(EventCatalog::builtin(), config.events.clone()),
            diplomacy,
            rng,
        }
    }

    fn run_turn(&mut self, turn: Turn) {
        self.snapshot.treasury = self.coffers.balance();

        if let Some(event) = self.events.tick(turn, &self.snapshot, &mut self.rng) {
            self.answer_event(&event, turn);
        }

        if turn % MISSION_INTERVAL == 0 {
            self.dispatch_mission(turn);
        }

        let report = self.diplomacy.tick(turn, &self.snapshot, &mut self.rng);
        self.apply_report(&report);
    }

    /// Applies the automatic effects, then resolves with the cheapest
    /// affordable choice, or declines when nothing is affordable.
    fn answer_event(&mut self, event: &ActivatedEvent, turn: Turn) {
        self.apply_effects(&event.auto_effects);

        let choice = match self.events.choices(&event.instance_id, self.coffers.balance()) {
            Ok(views) => views
                .into_iter()
                .filter(|v| v.can_afford)
                .min_by(|a, b| a.cost.total_cmp(&b.cost))
                .map(|v| v.id),
            Err(err) => {
                warn!(event = %event.instance_id, error = %err, "no choices available");
                None
            }
        };

        match self.events.resolve(&event.instance_id, choice.as_deref(), turn) {
            Ok(effects) => self.apply_effects(&effects),
            Err(err) => warn!(event = %event.instance_id, error = %err, "event not resolved"),
        }
    }

    /// Sends a mission to the least friendly rival still at peace.
    fn dispatch_mission(&mut self, turn: Turn) {
        let mission_type = if (turn / MISSION_INTERVAL) % 2 == 0 {
            MissionType::TradeAgreement
        } else {
            MissionType::CulturalExchange
        };

        let target = self
            .diplomacy
            .cities()
            .filter(|c| !c.is_at_war())
            .filter(|c| {
                !self
                    .diplomacy
                    .active_missions()
                    .iter()
                    .any(|m| m.target_city == c.id)
            })
            .min_by_key(|c| c.relationship_points())
            .map(|c| c.id.clone());

        let Some(target) = target else {
            debug!(turn, "no rival available for a mission");
            return;
        };
        let Some(handle) = self.diplomacy.create_mission(&target, mission_type, 0.0) else {
            return;
        };
        if let Err(err) = self.diplomacy.start_mission(handle, turn, &mut self.coffers) {
            debug!(turn, error = %err, "mission skipped");
        }
    }

    fn apply_report(&mut self, report: &DiplomacyTurnReport) {
        for result in &report.missions {
            self.apply_effects(&result.effects);
        }
        for battle in &report.battles {
            self.coffers.spend(battle.cost);
            self.snapshot.population =
                self.snapshot.population.saturating_sub(battle.our_casualties);
        }
    }

    /// Folds the effect keys the toy city understands into its state.
    fn apply_effects(&mut self, effects: &EffectMap) {
        for (key, value) in effects.iter() {
            match key {
                keys::MONEY => self.coffers.deposit(value),
                keys::POPULATION => {
                    let population = self.snapshot.population as f64 + value;
                    self.snapshot.population = population.clamp(0.0, u32::MAX as f64) as u32;
                }
                keys::CASUALTIES => {
                    self.snapshot.population =
                        self.snapshot.population.saturating_sub(value.max(0.0) as u32);
                }
                keys::SATISFACTION | "happiness_bonus" => {
                    self.snapshot.satisfaction =
                        (self.snapshot.satisfaction + value).clamp(0.0, 100.0);
                }
                other => debug!(key = other, value, "effect left to other systems"),
            }
        }
        self.snapshot.treasury = self.coffers.balance();
    }

    fn save_game(&self, turn: Turn) -> SaveGame {
        SaveGame {
            turn,
            events: self.events.save_state(),
            diplomacy: self.diplomacy.save_state(),
        }
    }
}

fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => CoreConfig::from_file(path)?,
        None => CoreConfig::default(),
    };

    info!(
        seed = args.seed,
        turns = args.turns,
        population = args.population,
        treasury = args.treasury,
        "starting campaign"
    );

    let mut campaign = Campaign::new(&args, &config);

    for turn in 1..=args.turns {
        campaign.run_turn(turn);

        if turn % 10 == 0 {
            let summary = campaign.diplomacy.summary();
            info!(
                turn,
                population = campaign.snapshot.population,
                treasury = campaign.coffers.balance(),
                satisfaction = campaign.snapshot.satisfaction,
                reputation = summary.reputation,
                wars = summary.active_wars,
                "progress"
            );
        }
    }

    let stats = campaign.events.stats();
    let summary = campaign.diplomacy.summary();
    info!(
        events = stats.total,
        most_common = ?stats.most_common_category,
        allies = summary.allies,
        friendly = summary.friendly,
        enemies = summary.enemies,
        at_war = summary.at_war,
        "campaign complete"
    );

    if let Some(path) = &args.save {
        let save = campaign.save_game(args.turns);
        fs::write(path, save.to_json()?)?;
        info!(path = %path.display(), "wrote save state");
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", default_config_toml());
        return;
    }

    init_logging();

    if let Err(err) = run(args) {
        tracing::error!(error = %err, "campaign failed");
        std::process::exit(1);
    }
}
