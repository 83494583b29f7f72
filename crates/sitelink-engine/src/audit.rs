//! Audit trail read model
//!
//! Operator-facing query surface over historical versions. Pure
//! delegation to the record store; no independent logic and no public
//! exposure — this surface is never reachable through a bearer secret.

use std::sync::Arc;

use sitelink_core::{RecordKey, StoreError, VersionedRecord};
use sitelink_store::RecordStore;

/// Read access to full version history
pub struct AuditTrail {
    records: Arc<dyn RecordStore>,
}

impl AuditTrail {
    #[must_use]
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    /// Full history for a key, version ascending
    pub fn history(&self, key: &RecordKey) -> Result<Vec<VersionedRecord>, StoreError> {
        self.records.history(key)
    }

    /// Current row for a key, if any
    pub fn current(&self, key: &RecordKey) -> Result<Option<VersionedRecord>, StoreError> {
        self.records.current(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sitelink_core::{FactKind, TokenId};
    use sitelink_store::{MemoryRecordStore, NewVersion};
    use sitelink_test_utils::{cbus_payload, sub};

    #[test]
    fn history_preserves_commit_order() {
        let records = Arc::new(MemoryRecordStore::new());
        let key = RecordKey::new(sub("employer-1"), FactKind::CbusCompliance);
        let via = TokenId::new();
        for expected in 0..3 {
            records
                .append_version(
                    &key,
                    expected,
                    NewVersion {
                        payload: cbus_payload(&format!("CB-{expected}")),
                        created_at: Utc::now(),
                        created_via: via,
                    },
                )
                .unwrap();
        }

        let trail = AuditTrail::new(records);
        let history = trail.history(&key).unwrap();
        assert_eq!(
            history.iter().map(|r| r.version).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(trail.current(&key).unwrap().unwrap().version, 3);
        assert!(history.iter().all(|r| r.created_via == via));
    }
}
