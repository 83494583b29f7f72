//! Identifier newtypes
//!
//! Token ids are ULIDs for sortability. Parent and sub-resource ids are
//! opaque strings handed to us by the surrounding record system, so they
//! stay string newtypes with a non-empty guarantee at construction.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique access-token identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenId(pub Ulid);

impl TokenId {
    /// Generate new token ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the parent resource a token is scoped under
/// (e.g. one project)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParentResourceId(String);

impl ParentResourceId {
    /// Wrap an externally-supplied parent id; `None` if blank.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParentResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the smallest unit a token can be scoped to
/// (e.g. one employer within a project)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubResourceId(String);

impl SubResourceId {
    /// Wrap an externally-supplied sub-resource id; `None` if blank.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_ids_are_unique() {
        assert_ne!(TokenId::new(), TokenId::new());
    }

    #[test]
    fn blank_resource_ids_rejected() {
        assert!(ParentResourceId::new("").is_none());
        assert!(ParentResourceId::new("   ").is_none());
        assert!(SubResourceId::new("").is_none());
        assert!(SubResourceId::new("employer-1").is_some());
    }
}
