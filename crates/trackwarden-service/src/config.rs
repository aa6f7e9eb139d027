//! Service configuration
//!
//! One TOML document covers the moderation policy, validation rules,
//! classifier tuning and the initial blacklists.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use trackwarden_classifier::{BlacklistSource, ClassifierConfig};
use trackwarden_domain::ModerationPolicy;
use trackwarden_gatekeeper::ValidationConfig;

/// Service configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Values parse but do not make sense
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for [`TrackbackService`](crate::TrackbackService)
///
/// # Examples
///
/// ```
/// use trackwarden_service::ServiceConfig;
/// use trackwarden_domain::ModerationPolicy;
///
/// let config = ServiceConfig::from_toml(r#"
///     policy = "reject_spam"
///
///     [blacklist]
///     domains = ["chinaaircatering.com"]
/// "#).unwrap();
///
/// assert_eq!(config.policy, ModerationPolicy::RejectSpam);
/// assert_eq!(config.max_excerpt_length, 250);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// What happens to valid trackbacks once classified
    #[serde(default)]
    pub policy: ModerationPolicy,

    /// Excerpts longer than this are cut at finalization; 0 keeps them whole
    #[serde(default = "default_max_excerpt_length")]
    pub max_excerpt_length: usize,

    /// Save attempts when the store reports a GUID collision
    #[serde(default = "default_max_guid_attempts")]
    pub max_guid_attempts: u32,

    /// Validation rules
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Classifier tuning
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Initial blacklist contents
    #[serde(default)]
    pub blacklist: BlacklistSource,
}

fn default_max_excerpt_length() -> usize {
    250
}

fn default_max_guid_attempts() -> u32 {
    3
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            policy: ModerationPolicy::default(),
            max_excerpt_length: default_max_excerpt_length(),
            max_guid_attempts: default_max_guid_attempts(),
            validation: ValidationConfig::default(),
            classifier: ClassifierConfig::default(),
            blacklist: BlacklistSource::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Strict preset: spam is rejected outright, DNS blocklists are consulted
    pub fn strict() -> Self {
        Self {
            policy: ModerationPolicy::RejectSpam,
            classifier: ClassifierConfig::strict(),
            ..Self::default()
        }
    }

    /// Permissive preset: any URL scheme, no article check, no external lookups
    pub fn permissive() -> Self {
        Self {
            validation: ValidationConfig::permissive(),
            classifier: ClassifierConfig::permissive(),
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_guid_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_guid_attempts must be at least 1".to_string(),
            ));
        }

        if self.max_excerpt_length > 0 && self.max_excerpt_length < 4 {
            return Err(ConfigError::Invalid(
                "max_excerpt_length must be 0 or at least 4".to_string(),
            ));
        }

        self.validation
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.classifier
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.blacklist
            .compile()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(())
    }
}
