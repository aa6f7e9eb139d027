//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] trackwarden_service::ConfigError),

    /// Service error
    #[error("Service error: {0}")]
    Service(#[from] trackwarden_service::ServiceError),

    /// Database error
    #[error("Database error: {0}")]
    Store(#[from] trackwarden_store::StoreError),

    /// Trackback store error
    #[error("Store error: {0}")]
    Persist(#[from] trackwarden_domain::traits::PersistError),

    /// Classifier error
    #[error("Classifier error: {0}")]
    Classifier(#[from] trackwarden_classifier::ClassifierError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML serialization error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}
