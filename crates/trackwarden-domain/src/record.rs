//! Trackback record - the entity flowing through validation and classification

use crate::{ArticleId, Classification, Guid, SpamVerdict};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Field values exactly as an upstream request handler parsed them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSubmission {
    /// Name of the remote blog (display only)
    #[serde(default)]
    pub blog_name: Option<String>,

    /// Title of the remote post
    #[serde(default)]
    pub title: Option<String>,

    /// Address of the remote post
    #[serde(default)]
    pub url: Option<String>,

    /// Excerpt of the remote post, markup included
    #[serde(default)]
    pub excerpt: Option<String>,

    /// Textual IP address of the submitter
    #[serde(default)]
    pub ip: Option<String>,
}

/// Where a record stands with respect to validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationState {
    /// Validation has not run yet
    #[default]
    Pending,

    /// Passed every rule
    Valid,

    /// Failed at least one rule; never persistable
    Invalid,
}

/// Violations of the record lifecycle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// GUIDs are only handed to records that passed validation
    #[error("Cannot assign a GUID to a record in state {0:?}")]
    NotValid(ValidationState),

    /// The GUID is write-once
    #[error("GUID already assigned: {0}")]
    GuidAlreadyAssigned(Guid),

    /// Collision replacement needs an existing GUID to replace
    #[error("No GUID assigned yet")]
    GuidMissing,
}

/// A trackback: the submitted fields plus everything derived from them
///
/// Submitted fields are public; identity, verdict, and validation state
/// only move forward through the lifecycle methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackbackRecord {
    /// Name of the remote blog
    pub blog_name: Option<String>,

    /// Title of the remote post
    pub title: Option<String>,

    /// Address of the remote post
    pub url: Option<String>,

    /// Excerpt, scanned as-is for spam signals
    pub excerpt: Option<String>,

    /// Submitter IP as text
    pub ip: Option<String>,

    /// Target article
    pub article_id: ArticleId,

    /// Creation timestamp (seconds since Unix epoch)
    pub created_at: u64,

    guid: Option<Guid>,
    spam_verdict: SpamVerdict,
    validation: ValidationState,
}

impl TrackbackRecord {
    /// Build a fresh, unvalidated and unclassified record
    pub fn from_submission(raw: RawSubmission, article_id: ArticleId) -> Self {
        Self {
            blog_name: raw.blog_name,
            title: raw.title,
            url: raw.url,
            excerpt: raw.excerpt,
            ip: raw.ip,
            article_id,
            created_at: current_timestamp(),
            guid: None,
            spam_verdict: SpamVerdict::Unclassified,
            validation: ValidationState::Pending,
        }
    }

    /// Rebuild a record that was previously persisted
    ///
    /// Persisted records are valid by construction.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        guid: Guid,
        article_id: ArticleId,
        blog_name: Option<String>,
        title: Option<String>,
        url: Option<String>,
        excerpt: Option<String>,
        ip: Option<String>,
        spam_verdict: SpamVerdict,
        created_at: u64,
    ) -> Self {
        Self {
            blog_name,
            title,
            url,
            excerpt,
            ip,
            article_id,
            created_at,
            guid: Some(guid),
            spam_verdict,
            validation: ValidationState::Valid,
        }
    }

    /// The assigned GUID, if any
    pub fn guid(&self) -> Option<Guid> {
        self.guid
    }

    /// Current spam verdict
    pub fn spam_verdict(&self) -> SpamVerdict {
        self.spam_verdict
    }

    /// Current validation state
    pub fn validation_state(&self) -> ValidationState {
        self.validation
    }

    /// Whether the record has been classified as spam
    pub fn is_spam(&self) -> bool {
        self.spam_verdict == SpamVerdict::Spam
    }

    /// Record that validation passed
    pub fn mark_valid(&mut self) {
        self.validation = ValidationState::Valid;
    }

    /// Record that validation failed
    pub fn mark_invalid(&mut self) {
        self.validation = ValidationState::Invalid;
    }

    /// Store the verdict of a classification run
    pub fn apply_classification(&mut self, classification: &Classification) {
        self.spam_verdict = classification.verdict;
    }

    /// Assign the record's GUID; allowed once, and only after validation passed
    pub fn assign_guid(&mut self, guid: Guid) -> Result<(), RecordError> {
        if self.validation != ValidationState::Valid {
            return Err(RecordError::NotValid(self.validation));
        }
        if let Some(existing) = self.guid {
            return Err(RecordError::GuidAlreadyAssigned(existing));
        }
        self.guid = Some(guid);
        Ok(())
    }

    /// Swap in a new GUID after the store refused the current one as a duplicate
    ///
    /// Only meaningful before the record has ever been written.
    pub fn replace_colliding_guid(&mut self, guid: Guid) -> Result<Guid, RecordError> {
        let previous = self.guid.ok_or(RecordError::GuidMissing)?;
        self.guid = Some(guid);
        Ok(previous)
    }

    /// Cut the excerpt to `max_chars` characters, ending in "..."
    ///
    /// Returns true if the excerpt was shortened.
    pub fn truncate_excerpt(&mut self, max_chars: usize) -> bool {
        let Some(excerpt) = self.excerpt.as_mut() else {
            return false;
        };
        if max_chars < 3 || excerpt.chars().count() <= max_chars {
            return false;
        }

        let cut = excerpt
            .char_indices()
            .nth(max_chars - 3)
            .map(|(idx, _)| idx)
            .unwrap_or(excerpt.len());
        excerpt.truncate(cut);
        excerpt.push_str("...");
        true
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
