//! Versioned record store
//!
//! Append-only history per `(sub_resource, fact_kind)` key. The store is
//! the point that enforces the "exactly one current row per key" invariant:
//! [`RecordStore::append_version`] is a compare-and-swap that inserts the
//! successor row and retires the previous current row inside one per-key
//! critical section. Racing writers for the same key see a typed
//! [`AppendError::Conflict`] and decide whether to retry.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sitelink_core::{FactPayload, RecordKey, StoreError, TokenId, VersionedRecord};

/// Outcome of a failed conditional append
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppendError {
    /// Another writer committed first; `actual` is the version now current
    #[error("version conflict: expected current {expected}, found {actual}")]
    Conflict { expected: u64, actual: u64 },

    /// Underlying store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Content of a proposed new version, before the store assigns its number
#[derive(Debug, Clone)]
pub struct NewVersion {
    pub payload: FactPayload,
    pub created_at: DateTime<Utc>,
    pub created_via: TokenId,
}

/// Append-only versioned record registry
pub trait RecordStore: Send + Sync {
    /// Current row for a key, if any submission has ever landed
    fn current(&self, key: &RecordKey) -> Result<Option<VersionedRecord>, StoreError>;

    /// Version number of the current row (0 before the first submission)
    fn current_version(&self, key: &RecordKey) -> Result<u64, StoreError>;

    /// Full history for a key, ordered by version ascending
    fn history(&self, key: &RecordKey) -> Result<Vec<VersionedRecord>, StoreError>;

    /// Conditional append: succeeds only if `expected_current` is still the
    /// current version, in which case the new row becomes
    /// `expected_current + 1` and currency moves to it atomically.
    /// Returns the committed version number.
    fn append_version(
        &self,
        key: &RecordKey,
        expected_current: u64,
        next: NewVersion,
    ) -> Result<u64, AppendError>;
}

/// In-memory record store
///
/// One vector of rows per key inside a sharded map; the map's per-key entry
/// lock is the serialization point for the CAS.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    chains: DashMap<RecordKey, Vec<VersionedRecord>>,
}

impl MemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys with at least one version
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.chains.len()
    }
}

impl RecordStore for MemoryRecordStore {
    fn current(&self, key: &RecordKey) -> Result<Option<VersionedRecord>, StoreError> {
        Ok(self
            .chains
            .get(key)
            .and_then(|chain| chain.value().last().cloned()))
    }

    fn current_version(&self, key: &RecordKey) -> Result<u64, StoreError> {
        Ok(self.chains.get(key).map_or(0, |chain| chain.len() as u64))
    }

    fn history(&self, key: &RecordKey) -> Result<Vec<VersionedRecord>, StoreError> {
        Ok(self.chains.get(key).map(|chain| chain.value().clone()).unwrap_or_default())
    }

    fn append_version(
        &self,
        key: &RecordKey,
        expected_current: u64,
        next: NewVersion,
    ) -> Result<u64, AppendError> {
        // Entry lock = per-key critical section. Versions are contiguous
        // from 1 and only the tail is current, so chain length is the
        // current version.
        let mut chain = self.chains.entry(key.clone()).or_default();
        let actual = chain.len() as u64;
        if actual != expected_current {
            tracing::debug!(%key, expected_current, actual, "append conflict");
            return Err(AppendError::Conflict {
                expected: expected_current,
                actual,
            });
        }

        if let Some(previous) = chain.last_mut() {
            previous.is_current = false;
        }
        let version = actual + 1;
        chain.push(VersionedRecord {
            key: key.clone(),
            version,
            payload: next.payload,
            is_current: true,
            created_at: next.created_at,
            created_via: next.created_via,
        });
        tracing::debug!(%key, version, "version committed");
        Ok(version)
    }
}
