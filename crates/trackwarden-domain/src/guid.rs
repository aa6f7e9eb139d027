//! Trackback identity - the GUID handed out to accepted or queued trackbacks

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Globally unique identifier for a persisted trackback
///
/// Backed by a random (version 4) UUID:
/// - 122 bits of entropy, so collisions are left to the storage layer's
///   unique constraint rather than to in-process coordination
/// - Rendered as the 36 character hyphenated form, comfortably past the
///   15 character floor that downstream consumers assume
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Guid(u128);

impl Guid {
    /// Minimum textual length every rendered GUID exceeds
    pub const MIN_TEXT_LEN: usize = 15;

    /// Generate a fresh random GUID
    ///
    /// # Examples
    ///
    /// ```
    /// use trackwarden_domain::Guid;
    ///
    /// let guid = Guid::generate();
    /// assert!(guid.to_string().len() > Guid::MIN_TEXT_LEN);
    /// ```
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().as_u128())
    }

    /// Create a GUID from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a GUID from its hyphenated string form
    ///
    /// # Examples
    ///
    /// ```
    /// use trackwarden_domain::Guid;
    ///
    /// let guid = Guid::generate();
    /// let parsed = Guid::from_string(&guid.to_string()).unwrap();
    /// assert_eq!(guid, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid GUID string: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Guid::from_string(&text).map_err(serde::de::Error::custom)
    }
}
