//! Error types for the event and diplomacy engines.

use thiserror::Error;

/// Errors from resolving events.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EventError {
    /// No active or historical instance has this id
    #[error("unknown event instance '{0}'")]
    UnknownEvent(String),
    /// The instance was already resolved or expired
    #[error("event instance '{0}' was already resolved")]
    StaleEvent(String),
}

/// Errors from diplomacy commands.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiplomacyError {
    #[error("unknown city '{0}'")]
    UnknownCity(String),
    /// Already at war, allied, or bound by a live alliance
    #[error("cannot declare war on '{0}'")]
    CannotDeclareWar(String),
    #[error("insufficient funds: need {needed:.2}, have {available:.2}")]
    InsufficientFunds { needed: f64, available: f64 },
    #[error("not at war with '{0}'")]
    NotAtWar(String),
    /// The mission already reached a terminal status
    #[error("mission '{0}' was already resolved")]
    StaleMission(String),
}

/// Errors from loading a data-driven event catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse event catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate event definition id '{0}'")]
    DuplicateId(String),
    #[error("event definition '{0}' has a choice with an empty id")]
    EmptyChoiceId(String),
}

/// Errors from loading or writing tuning configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
