//! Locating and loading the service configuration.

use crate::error::Result;
use std::path::{Path, PathBuf};
use trackwarden_service::ServiceConfig;

/// Default configuration file location (`<config dir>/trackwarden/config.toml`).
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("trackwarden").join("config.toml"))
}

/// Load the configuration.
///
/// An explicit path must exist. Without one, the default location is used
/// when present, and built-in defaults otherwise.
pub fn load(explicit: Option<&Path>) -> Result<ServiceConfig> {
    if let Some(path) = explicit {
        tracing::debug!("Loading configuration from {}", path.display());
        return Ok(ServiceConfig::from_file(path)?);
    }

    match default_path() {
        Some(path) if path.exists() => {
            tracing::debug!("Loading configuration from {}", path.display());
            Ok(ServiceConfig::from_file(path)?)
        }
        _ => {
            tracing::debug!("No configuration file, using defaults");
            Ok(ServiceConfig::default())
        }
    }
}

/// Render a configuration as TOML.
pub fn render(config: &ServiceConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}
