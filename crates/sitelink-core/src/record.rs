//! Versioned fact records
//!
//! History is arena-style and append-only: one row per
//! `(sub_resource, fact_kind, version)`, with `is_current` as the single
//! mutable field. Currency moves forward only as part of the same atomic
//! transition that inserts the successor row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{SubResourceId, TokenId};
use crate::payload::{FactKind, FactPayload};

/// Key of one logical "current fact"
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub sub_resource_id: SubResourceId,
    pub fact_kind: FactKind,
}

impl RecordKey {
    #[inline]
    #[must_use]
    pub fn new(sub_resource_id: SubResourceId, fact_kind: FactKind) -> Self {
        Self {
            sub_resource_id,
            fact_kind,
        }
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.sub_resource_id, self.fact_kind)
    }
}

/// One immutable snapshot in a fact's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedRecord {
    pub key: RecordKey,
    /// Monotonically increasing, starting at 1
    pub version: u64,
    pub payload: FactPayload,
    /// Exactly one row per key carries `true` at any instant
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
    /// Token that submitted this version, for traceability
    pub created_via: TokenId,
}
