//! Core simulation logic: the event engine and the diplomacy engine.
//!
//! Both engines are driven once per turn by the caller and draw every random
//! number through an injected [`RandomSource`].

pub mod config;
pub mod diplomacy;
pub mod economy;
pub mod error;
pub mod events;
pub mod odds;
pub mod rng;

pub use config::{default_config_toml, CoreConfig, DiplomacyTuning, EventTuning, WarTuning};
pub use diplomacy::{
    DiplomacyEngine, DiplomacySummary, DiplomacyTurnReport, MissionHandle, MissionResult,
    PeaceTerms, RivalCity,
};
pub use economy::{Coffers, Treasury};
pub use error::{CatalogError, ConfigError, DiplomacyError, EventError};
pub use events::{ActivatedEvent, EventCatalog, EventDefinition, EventEngine, EventStats};
pub use rng::{RandomSource, ScriptedRng, SimRng};
