//! Trackwarden Domain Layer
//!
//! This crate holds the data model of the trackback pipeline and the trait
//! interfaces for everything outside it. It carries no infrastructure code.
//!
//! ## Key Concepts
//!
//! - **TrackbackRecord**: submitted fields plus the derived GUID, verdict and validation state
//! - **Guid**: write-once identity assigned only to accepted or queued records
//! - **SpamVerdict**: `unclassified | ham | spam`, with the signals that produced it
//! - **ModerationPolicy**: blog-wide rule for what happens to flagged trackbacks
//!
//! ## Architecture
//!
//! - Pure data and lifecycle rules only
//! - Storage, article lookup and reputation lookups are traits
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod article;
pub mod guid;
pub mod policy;
pub mod record;
pub mod traits;
pub mod verdict;

// Re-exports for convenience
pub use article::ArticleId;
pub use guid::Guid;
pub use policy::{ModerationPolicy, Outcome};
pub use record::{RawSubmission, RecordError, TrackbackRecord, ValidationState};
pub use verdict::{Classification, Signal, SpamVerdict, TriggeredSignal};
