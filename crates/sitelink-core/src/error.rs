//! Error taxonomy for the share-link core
//!
//! Three failure families, each scoped to a single request or a single
//! submission unit:
//! - issuance-time operator errors (`IssueError`)
//! - validation-time visitor errors (`TokenError`)
//! - per-unit submission rejections (`RejectReason`)
//!
//! Nothing here is fatal to the process.

use serde::{Deserialize, Serialize};

use crate::token::ResourceType;

/// Store-level failures shared by token and record stores
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A token with the same secret digest already exists
    #[error("secret digest collision")]
    SecretCollision,

    /// Store unavailable or otherwise failed
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Issuance-time errors, surfaced synchronously to the operator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IssueError {
    /// Empty scope allow-list; a token that can touch nothing is a bug
    #[error("scope allow-list must not be empty")]
    EmptyScope,

    /// Duration class string not one of the enumerated classes
    #[error("invalid duration class: {0}")]
    InvalidDuration(String),

    /// A parent or sub-resource id was blank
    #[error("invalid resource id: {0}")]
    InvalidResourceId(String),

    /// Secret generation kept colliding with stored digests
    #[error("secret generation exhausted after {0} attempts")]
    SecretExhausted(u32),

    /// Underlying store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Validation-time errors, surfaced to the public visitor as a terminal
/// message ("this link has expired", ...)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Secret not known to the token store
    #[error("token not found")]
    NotFound,

    /// Token past its expiry deadline
    #[error("token expired")]
    Expired,

    /// Token issued for a different resource type than the caller expects
    #[error("token type mismatch: expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        expected: ResourceType,
        actual: ResourceType,
    },

    /// Underlying store failure during validation
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl TokenError {
    /// Whether the visitor can usefully retry the same request
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

/// Per-unit submission rejection reasons
///
/// A rejection never affects sibling units in the same batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// Targeted sub-resource is outside the token's allow-list
    #[error("resource not in scope")]
    ResourceNotInScope,

    /// Payload failed shape/content validation
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Commit conflicted repeatedly with concurrent submissions
    #[error("concurrency retries exhausted after {attempts} attempts")]
    ConcurrencyExhausted { attempts: u32 },

    /// Store failure while committing this unit
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl RejectReason {
    /// Whether the visitor's client should resubmit this unit
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConcurrencyExhausted { .. } | Self::Persistence(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_error_display() {
        let err = TokenError::TypeMismatch {
            expected: ResourceType::MappingSheet,
            actual: ResourceType::AuditCompliance,
        };
        assert!(err.to_string().contains("type mismatch"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn reject_reason_retryability() {
        assert!(RejectReason::ConcurrencyExhausted { attempts: 3 }.is_retryable());
        assert!(RejectReason::Persistence("down".into()).is_retryable());
        assert!(!RejectReason::ResourceNotInScope.is_retryable());
        assert!(!RejectReason::InvalidPayload("bad".into()).is_retryable());
    }
}
