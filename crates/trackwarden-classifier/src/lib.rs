//! Trackwarden Classifier
//!
//! Spam classification for trackbacks.
//!
//! The classifier provides:
//! - Case-insensitive substring matching against domain and keyword blacklists
//! - IP blacklists with single addresses, CIDR blocks, and ranges
//! - Link extraction from excerpt markup
//! - Optional DNS blocklist lookups, bounded by a timeout and never fatal
//! - Hot-swappable blacklist snapshots
//!
//! # Examples
//!
//! ```no_run
//! use trackwarden_classifier::{BlacklistSource, ClassifierConfig, ContentClassifier};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source: BlacklistSource = toml::from_str(r#"domains = ["spam.example"]"#)?;
//! let classifier = ContentClassifier::from_config(ClassifierConfig::default(), &source)?;
//!
//! // let classification = classifier.classify(&record).await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod blacklist;
mod classifier;
mod config;
mod dnsbl;
mod error;
pub mod links;

pub use blacklist::{BlacklistHandle, BlacklistMatcher, BlacklistSource, Blacklists, IpPattern};
pub use classifier::ContentClassifier;
pub use config::ClassifierConfig;
pub use dnsbl::{reverse_ip, DnsResolver, DnsblLookup, SystemResolver};
pub use error::ClassifierError;
