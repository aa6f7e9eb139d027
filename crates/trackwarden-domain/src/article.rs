//! Article references

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference to the article a trackback points at
///
/// The domain never looks inside it; existence checks go through
/// [`ArticleStore`](crate::traits::ArticleStore).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArticleId(String);

impl ArticleId {
    /// Create a new article reference
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the reference as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ArticleId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<u64> for ArticleId {
    fn from(value: u64) -> Self {
        Self::new(value.to_string())
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
