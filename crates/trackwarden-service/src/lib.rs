//! Trackwarden Service
//!
//! Decides what happens to a trackback submission.
//!
//! # Overview
//!
//! The service is responsible for:
//! - **Validation**: required fields and URL format, plus the target article
//! - **Classification**: spam signals from blacklists and reputation lookups
//! - **Routing**: accept, queue for moderation, or reject per moderation policy
//! - **Identity**: a GUID for every accepted or queued trackback
//! - **Persistence**: an explicit `persist` step that retries GUID collisions
//!
//! # Usage
//!
//! ```no_run
//! use trackwarden_service::{ServiceConfig, TrackbackService};
//! use trackwarden_store::SqliteStore;
//! use trackwarden_domain::{ArticleId, RawSubmission};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::from_file("trackwarden.toml")?;
//!     let service = TrackbackService::from_config(config)?;
//!     let mut store = SqliteStore::new("trackwarden.db")?;
//!
//!     let raw = RawSubmission {
//!         url: Some("http://example.org/post".to_string()),
//!         ..Default::default()
//!     };
//!     let mut decision = service
//!         .submit(raw, ArticleId::from("1"), service.policy(), Some(&store))
//!         .await?;
//!
//!     if decision.is_persistable() {
//!         service.persist(&mut store, &mut decision)?;
//!     }
//!     println!("{}", service.metrics().summary());
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! policy = "queue_spam"
//! max_excerpt_length = 250
//! max_guid_attempts = 3
//!
//! [validation]
//! require_resolvable_article = true
//! allowed_schemes = ["http", "https"]
//!
//! [classifier]
//! lookup_timeout_ms = 1500
//! max_links = 0
//! enable_dnsbl = false
//!
//! [blacklist]
//! domains = ["chinaaircatering.com"]
//! ips = ["212.42.230.207", "10.66.0.0/16"]
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod metrics;
mod service;

pub use config::{ConfigError, ServiceConfig};
pub use error::ServiceError;
pub use metrics::ServiceMetrics;
pub use service::{Decision, TrackbackService};
