//! Gatekeeper error types

use thiserror::Error;

/// Errors that can occur during gatekeeper operations
///
/// Rule violations are not errors; they are reported through
/// [`ValidationResult`](crate::ValidationResult).
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// Article store failed while resolving the target article
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
