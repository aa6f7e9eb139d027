//! Spam verdicts and the signals that produce them

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tri-state spam verdict carried by every trackback
///
/// `Unclassified` means classification has never run for the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpamVerdict {
    /// Classification has not been invoked
    #[default]
    Unclassified,

    /// Legitimate content
    Ham,

    /// At least one spam signal fired
    Spam,
}

impl SpamVerdict {
    /// Get the verdict name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            SpamVerdict::Unclassified => "unclassified",
            SpamVerdict::Ham => "ham",
            SpamVerdict::Spam => "spam",
        }
    }

    /// Parse a verdict from a string (storage round-trips)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unclassified" => Some(SpamVerdict::Unclassified),
            "ham" => Some(SpamVerdict::Ham),
            "spam" => Some(SpamVerdict::Spam),
            _ => None,
        }
    }
}

/// Independent checks that can flag a trackback as spam
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// A link embedded in the excerpt points at a blacklisted domain
    Excerpt,

    /// The notifying page itself lives on a blacklisted domain
    SourceUrl,

    /// The submitter IP is blacklisted or has a bad reputation
    Ip,

    /// A keyword or regular expression pattern matched the text fields
    ContentPattern,

    /// The excerpt carries more links than allowed
    LinkLimit,
}

impl Signal {
    /// Get the signal name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Excerpt => "excerpt",
            Signal::SourceUrl => "source_url",
            Signal::Ip => "ip",
            Signal::ContentPattern => "content_pattern",
            Signal::LinkLimit => "link_limit",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fired signal together with what triggered it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredSignal {
    /// Which check fired
    pub signal: Signal,

    /// Human-readable evidence (matched pattern, offending host, ...)
    pub detail: String,
}

impl TriggeredSignal {
    /// Create a new triggered signal
    pub fn new(signal: Signal, detail: impl Into<String>) -> Self {
        Self {
            signal,
            detail: detail.into(),
        }
    }
}

/// Output of a classification run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Ham or spam; never `Unclassified`
    pub verdict: SpamVerdict,

    /// Every check that fired, in evaluation order
    pub signals: Vec<TriggeredSignal>,
}

impl Classification {
    /// Build a classification from the fired signals
    pub fn from_signals(signals: Vec<TriggeredSignal>) -> Self {
        let verdict = if signals.is_empty() {
            SpamVerdict::Ham
        } else {
            SpamVerdict::Spam
        };

        Self { verdict, signals }
    }

    /// Whether the verdict is spam
    pub fn is_spam(&self) -> bool {
        self.verdict == SpamVerdict::Spam
    }

    /// Whether the given check fired
    pub fn fired(&self, signal: Signal) -> bool {
        self.signals.iter().any(|s| s.signal == signal)
    }
}
