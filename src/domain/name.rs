//! Roster names and their derived keys.
//!
//! [`NameKey`] is a newtype wrapper around the slug produced by
//! [`super::derive_key`], so keys cannot be confused with display text.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Deduplication identifier derived from a name's text.
///
/// Unique within a roster. Used as the member of the absence set, the
/// target of history entries, and the path segment in the HTTP API.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct NameKey(String);

impl NameKey {
    /// Wraps an already-derived key.
    ///
    /// No normalization happens here; use [`super::derive_key`] to turn
    /// free text into a key.
    #[must_use]
    pub fn from_derived(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key, returning the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NameKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A roster member: display text plus its derived key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Name {
    /// Display text, whitespace-normalized.
    pub raw: String,
    /// Derived identifier.
    pub key: NameKey,
}

impl Name {
    /// Builds a name from free text, normalizing whitespace and deriving
    /// the key.
    ///
    /// Returns `None` when the text is empty after normalization.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = normalize_whitespace(raw);
        if raw.is_empty() {
            return None;
        }
        let key = super::derive_key(&raw);
        Some(Self { raw, key })
    }
}

/// Trims and collapses every whitespace run to a single space.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_whitespace() {
        let Some(name) = Name::parse("  Jan \t  Novák \n") else {
            panic!("expected a name");
        };
        assert_eq!(name.raw, "Jan Novák");
        assert_eq!(name.key.as_str(), "jan-novak");
    }

    #[test]
    fn parse_rejects_blank() {
        assert!(Name::parse("   \n\t ").is_none());
        assert!(Name::parse("").is_none());
    }

    #[test]
    fn key_serializes_as_plain_string() {
        let key = NameKey::from_derived("anna-novakova");
        let json = serde_json::to_string(&key).unwrap_or_default();
        assert_eq!(json, "\"anna-novakova\"");
    }

    #[test]
    fn key_display_matches_inner() {
        let key = NameKey::from_derived("petr");
        assert_eq!(format!("{key}"), "petr");
        assert_eq!(key.into_string(), "petr");
    }
}
