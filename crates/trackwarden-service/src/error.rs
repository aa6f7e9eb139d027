//! Error types for service operations

use crate::ConfigError;
use thiserror::Error;
use trackwarden_classifier::ClassifierError;
use trackwarden_domain::{Outcome, RecordError};
use trackwarden_gatekeeper::GatekeeperError;

/// Errors that can occur while deciding on or persisting a trackback
///
/// Rule violations and spam verdicts are outcomes, not errors.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Validator collaborator failure (e.g. the article store is down)
    #[error("Validation error: {0}")]
    Gatekeeper(#[from] GatekeeperError),

    /// Classifier could not be built
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Record lifecycle violation
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// Opaque failure from the persistence collaborator
    #[error("Storage error: {0}")]
    Storage(String),

    /// Every GUID tried was already taken
    #[error("No unique GUID after {0} attempts")]
    GuidExhausted(u32),

    /// Only accepted and queued trackbacks may be stored
    #[error("Refusing to persist a {} trackback", .0.as_str())]
    NotPersistable(Outcome),
}
