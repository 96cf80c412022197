//! Random event system: catalog, gating, probability, and resolution.

pub mod catalog;
pub mod definition;
pub mod engine;
pub mod probability;

pub use catalog::EventCatalog;
pub use definition::{EventChoice, EventDefinition, EventGate};
pub use engine::{ActivatedEvent, ChoiceView, EventEngine, EventStats};
pub use probability::{compose_probability, ProbabilityContext};
