//! Gatekeeper configuration

use crate::GatekeeperError;
use serde::{Deserialize, Serialize};

/// Configuration for validation rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Check that the target article exists (requires an article store)
    #[serde(default = "default_true")]
    pub require_resolvable_article: bool,

    /// URL schemes accepted for the source URL
    #[serde(default = "default_schemes")]
    pub allowed_schemes: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_schemes() -> Vec<String> {
    vec!["http".to_string(), "https".to_string()]
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            require_resolvable_article: true,
            allowed_schemes: default_schemes(),
        }
    }
}

impl ValidationConfig {
    /// Create a permissive configuration (any scheme, no article lookup)
    pub fn permissive() -> Self {
        Self {
            require_resolvable_article: false,
            allowed_schemes: Vec::new(),
        }
    }

    /// Whether the scheme is acceptable; an empty list accepts any scheme
    pub fn allows_scheme(&self, scheme: &str) -> bool {
        self.allowed_schemes.is_empty()
            || self
                .allowed_schemes
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(scheme))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), GatekeeperError> {
        if self.allowed_schemes.iter().any(|s| s.trim().is_empty()) {
            return Err(GatekeeperError::Config(
                "allowed_schemes must not contain blank entries".to_string(),
            ));
        }
        Ok(())
    }
}
