//! Classifier configuration

use crate::ClassifierError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning for the classification pipeline
///
/// # Examples
///
/// ```
/// use trackwarden_classifier::ClassifierConfig;
///
/// let config = ClassifierConfig::default();
/// assert!(!config.enable_dnsbl);
///
/// let config = ClassifierConfig::strict();
/// assert!(config.enable_dnsbl);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Upper bound for a single reputation lookup (milliseconds)
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,

    /// Maximum number of links allowed in an excerpt; 0 disables the check
    #[serde(default)]
    pub max_links: usize,

    /// Consult DNS blocklists when the local lists are inconclusive
    #[serde(default)]
    pub enable_dnsbl: bool,

    /// DNSBL zones queried with reversed submitter IPs
    #[serde(default = "default_ip_zones")]
    pub ip_zones: Vec<String>,

    /// URI blocklist zones queried with registrable link domains
    #[serde(default = "default_host_zones")]
    pub host_zones: Vec<String>,
}

fn default_lookup_timeout_ms() -> u64 {
    1500
}

fn default_ip_zones() -> Vec<String> {
    vec!["sbl-xbl.spamhaus.org".to_string()]
}

fn default_host_zones() -> Vec<String> {
    vec!["multi.surbl.org".to_string()]
}

impl Default for ClassifierConfig {
    /// Local blacklists only, no link limit
    fn default() -> Self {
        Self {
            lookup_timeout_ms: default_lookup_timeout_ms(),
            max_links: 0,
            enable_dnsbl: false,
            ip_zones: default_ip_zones(),
            host_zones: default_host_zones(),
        }
    }
}

impl ClassifierConfig {
    /// Strict preset: DNS blocklists on, short timeout, few links allowed
    pub fn strict() -> Self {
        Self {
            lookup_timeout_ms: 1000,
            max_links: 3,
            enable_dnsbl: true,
            ..Self::default()
        }
    }

    /// Permissive preset: no external lookups, no link limit
    pub fn permissive() -> Self {
        Self {
            lookup_timeout_ms: 3000,
            ..Self::default()
        }
    }

    /// Get the lookup timeout as a Duration
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.lookup_timeout_ms == 0 {
            return Err(ClassifierError::Config(
                "lookup_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.enable_dnsbl && self.ip_zones.is_empty() && self.host_zones.is_empty() {
            return Err(ClassifierError::Config(
                "enable_dnsbl requires at least one ip or host zone".to_string(),
            ));
        }
        Ok(())
    }
}
