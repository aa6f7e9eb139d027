//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the decision pipeline and
//! infrastructure. Implementations live in other crates.

use crate::{ArticleId, Guid, TrackbackRecord};
use async_trait::async_trait;
use std::net::IpAddr;
use thiserror::Error;

/// Resolves article references
///
/// Implemented by the infrastructure layer (trackwarden-store)
pub trait ArticleStore {
    /// Error type for lookups
    type Error;

    /// Whether the referenced article exists
    fn resolve_article(&self, id: &ArticleId) -> Result<bool, Self::Error>;
}

/// Failure modes of [`TrackbackStore`] operations
#[derive(Error, Debug)]
pub enum PersistError {
    /// Another record already owns this GUID
    #[error("Duplicate GUID: {0}")]
    DuplicateGuid(Guid),

    /// Opaque storage failure
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Persists finalized trackbacks
///
/// Implemented by the infrastructure layer (trackwarden-store)
pub trait TrackbackStore {
    /// Save a record; GUID uniqueness is enforced here
    fn save(&mut self, record: &TrackbackRecord) -> Result<(), PersistError>;

    /// Get a record by GUID
    fn find_by_guid(&self, guid: Guid) -> Result<Option<TrackbackRecord>, PersistError>;

    /// All records attached to an article, oldest first
    fn list_for_article(&self, id: &ArticleId) -> Result<Vec<TrackbackRecord>, PersistError>;
}

/// Reputation of an address or domain according to an external source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reputation {
    /// The source had no usable answer
    Inconclusive,

    /// Known and not listed
    Trusted,

    /// Listed as abusive
    Suspicious,
}

/// Errors from a reputation source; callers degrade these to `Inconclusive`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The lookup did not finish in time
    #[error("Lookup timed out")]
    Timeout,

    /// Resolver or network failure
    #[error("Lookup failed: {0}")]
    Resolve(String),
}

/// External reputation / reverse-DNS source
///
/// Implemented by the classifier crate (`DnsblLookup`) or by test doubles.
/// Lookups may suspend; callers bound them with a timeout.
#[async_trait]
pub trait ReputationLookup: Send + Sync {
    /// Reputation of a submitter address
    async fn lookup_ip(&self, ip: IpAddr) -> Result<Reputation, LookupError>;

    /// Reputation of a registrable domain
    async fn lookup_domain(&self, _domain: &str) -> Result<Reputation, LookupError> {
        Ok(Reputation::Inconclusive)
    }
}

/// A reputation source that never knows anything
///
/// Used when external lookups are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReputation;

#[async_trait]
impl ReputationLookup for NoReputation {
    async fn lookup_ip(&self, _ip: IpAddr) -> Result<Reputation, LookupError> {
        Ok(Reputation::Inconclusive)
    }
}
