//! Engine error taxonomy.
//!
//! Domain outcomes (ship destruction, zero-yield days) are modeled results,
//! not errors; only collaborator failures and caller bugs surface here.

use thiserror::Error;

use crate::config::ConfigError;

/// Kind of resource a store lookup can fail to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Ship,
    Asteroid,
    Mission,
    User,
    Config,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ship => write!(f, "ship"),
            Self::Asteroid => write!(f, "asteroid"),
            Self::Mission => write!(f, "mission"),
            Self::User => write!(f, "user"),
            Self::Config => write!(f, "config"),
        }
    }
}

/// Failures surfaced by a persistence collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{kind} '{name}' not found")]
    NotFound { kind: ResourceKind, name: String },
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },
}

impl StoreError {
    #[must_use]
    pub fn not_found(kind: ResourceKind, name: &str) -> Self {
        Self::NotFound {
            kind,
            name: name.to_string(),
        }
    }
}

/// Errors crossing the mission-engine boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Mining-globals configuration absent or invalid. Fatal, no retry.
    #[error("mining globals configuration unavailable")]
    Config(#[from] ConfigError),
    /// Referenced ship or asteroid missing. Recoverable by the caller.
    #[error("{kind} '{name}' not found")]
    NotFound { kind: ResourceKind, name: String },
    /// Persistence read/write failed. Retryable by the caller.
    #[error("store unavailable: {reason}")]
    TransientStore { reason: String },
    /// Caller asked to re-simulate an already recorded day.
    #[error("day {day} already simulated (mission has completed {simulated} days)")]
    DuplicateDay { day: u32, simulated: u32 },
    /// Caller asked to advance a mission that already reached a terminal state.
    #[error("mission '{mission_id}' is no longer active")]
    MissionNotActive { mission_id: String },
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, name } => Self::NotFound { kind, name },
            StoreError::Unavailable { reason } => Self::TransientStore { reason },
        }
    }
}
