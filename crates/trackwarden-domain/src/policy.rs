//! Moderation policy and submission outcomes

use serde::{Deserialize, Serialize};

/// Blog-wide policy deciding what happens to flagged trackbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationPolicy {
    /// Spam is dropped outright; ham is published
    RejectSpam,

    /// Spam waits in the moderation queue; ham is published
    #[default]
    QueueSpam,

    /// Everything valid waits for a human, spam included
    ModerateAll,
}

impl ModerationPolicy {
    /// Whether flagged spam may be kept for human review
    pub fn allows_queue(&self) -> bool {
        !matches!(self, ModerationPolicy::RejectSpam)
    }

    /// Whether ham must also pass through moderation
    pub fn moderates_ham(&self) -> bool {
        matches!(self, ModerationPolicy::ModerateAll)
    }

    /// Outcome for a record that passed validation and was classified
    pub fn outcome_for(&self, is_spam: bool) -> Outcome {
        match (is_spam, self.allows_queue(), self.moderates_ham()) {
            (true, false, _) => Outcome::RejectedSpam,
            (true, true, _) | (false, _, true) => Outcome::QueuedForModeration,
            (false, _, false) => Outcome::Accepted,
        }
    }

    /// Get the policy name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationPolicy::RejectSpam => "reject_spam",
            ModerationPolicy::QueueSpam => "queue_spam",
            ModerationPolicy::ModerateAll => "moderate_all",
        }
    }

    /// Parse a policy from its string name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "reject_spam" => Some(ModerationPolicy::RejectSpam),
            "queue_spam" => Some(ModerationPolicy::QueueSpam),
            "moderate_all" => Some(ModerationPolicy::ModerateAll),
            _ => None,
        }
    }
}

/// Final decision for one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// Valid ham, ready to publish
    Accepted,

    /// Kept, but held for a moderator
    QueuedForModeration,

    /// Failed validation; nothing may be persisted
    RejectedInvalid,

    /// Classified as spam under a policy without a queue
    RejectedSpam,
}

impl Outcome {
    /// Get the outcome name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Accepted => "accepted",
            Outcome::QueuedForModeration => "queued_for_moderation",
            Outcome::RejectedInvalid => "rejected_invalid",
            Outcome::RejectedSpam => "rejected_spam",
        }
    }

    /// Whether a record with this outcome may be persisted
    pub fn is_persistable(&self) -> bool {
        matches!(self, Outcome::Accepted | Outcome::QueuedForModeration)
    }
}
