//! Trackwarden Gatekeeper
//!
//! Decides whether a trackback is structurally valid enough to persist.
//!
//! The Gatekeeper provides:
//! - Source URL validation (present, absolute, allowed scheme, has a host)
//! - Target article resolution through an injected article store
//! - Field-level error reporting
//!
//! # Examples
//!
//! ```no_run
//! use trackwarden_gatekeeper::{TrackbackValidator, ValidationConfig};
//!
//! let config = ValidationConfig::default();
//! let validator = TrackbackValidator::new(config);
//!
//! // Validate a trackback before classifying it
//! // let result = validator.validate(&record, Some(&articles))?;
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod validator;

pub use config::ValidationConfig;
pub use error::GatekeeperError;
pub use validator::{RejectionReason, TrackbackValidator, ValidationResult};
