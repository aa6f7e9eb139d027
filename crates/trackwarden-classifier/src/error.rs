//! Classifier error types

use thiserror::Error;

/// Errors raised while building blacklists or classifier settings
///
/// Classification itself never fails; these only surface at load time.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// An IP blacklist entry is neither an address, a CIDR block, nor a range
    #[error("Invalid IP pattern '{0}'")]
    InvalidIpPattern(String),

    /// A regular expression pattern failed to compile
    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),
}
