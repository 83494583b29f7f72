//! Testing utilities for the sitelink workspace
//!
//! Shared fixtures: a settable clock, id and allow-list builders, and
//! canned payloads.

#![allow(missing_docs)]

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use sitelink_core::{
    Clock, ComplianceStatus, FactPayload, ParentResourceId, SubResourceId,
};
use sitelink_store::{MemoryParentDirectory, MemoryRecordStore, MemoryTokenStore};

/// Settable clock for deterministic expiry tests
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    #[must_use]
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        // Arbitrary fixed instant; tests move it as needed.
        Self::starting_at(Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Fresh in-memory stores, one tuple per test
#[must_use]
pub fn memory_stack() -> (
    Arc<MemoryTokenStore>,
    Arc<MemoryRecordStore>,
    Arc<MemoryParentDirectory>,
) {
    (
        Arc::new(MemoryTokenStore::new()),
        Arc::new(MemoryRecordStore::new()),
        Arc::new(MemoryParentDirectory::new()),
    )
}

#[must_use]
pub fn parent(raw: &str) -> ParentResourceId {
    ParentResourceId::new(raw).expect("non-empty parent id fixture")
}

#[must_use]
pub fn sub(raw: &str) -> SubResourceId {
    SubResourceId::new(raw).expect("non-empty sub-resource id fixture")
}

#[must_use]
pub fn allow_list(raws: &[&str]) -> BTreeSet<SubResourceId> {
    raws.iter().map(|raw| sub(raw)).collect()
}

#[must_use]
pub fn cbus_payload(member_number: &str) -> FactPayload {
    FactPayload::CbusCompliance {
        member_number: member_number.to_string(),
        status: ComplianceStatus::Compliant,
        paid_to: None,
        notes: None,
    }
}

#[must_use]
pub fn incolink_payload(member_number: &str) -> FactPayload {
    FactPayload::IncolinkCompliance {
        member_number: member_number.to_string(),
        status: ComplianceStatus::Unknown,
        paid_to: None,
        notes: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_told() {
        let clock = ManualClock::default();
        let start = clock.now();
        assert_eq!(clock.now(), start);
        clock.advance(Duration::hours(1));
        assert_eq!(clock.now(), start + Duration::hours(1));
    }
}
