//! Scope confinement and versioning behavior of the submission engine.

use std::sync::Arc;

use sitelink_core::{
    DurationClass, FactKind, RecordKey, RejectReason, ResourceType, Scope,
};
use sitelink_engine::{
    AuditTrail, Outcome, SitelinkConfig, Submission, SubmissionEngine, TokenIssuer,
};
use sitelink_store::{MemoryRecordStore, RecordStore};
use sitelink_test_utils::{
    allow_list, cbus_payload, incolink_payload, memory_stack, parent, sub, ManualClock,
};

fn engine_with_scope(subs: &[&str]) -> (SubmissionEngine, Scope, Arc<MemoryRecordStore>) {
    let (tokens, records, _) = memory_stack();
    let clock = Arc::new(ManualClock::default());
    let config = SitelinkConfig::new();
    let issuer = TokenIssuer::new(
        Arc::clone(&tokens) as _,
        Arc::clone(&clock) as _,
        config.clone(),
    );
    let issued = issuer
        .issue(
            ResourceType::MappingSheet,
            parent("project-9"),
            allow_list(subs),
            DurationClass::H24,
        )
        .unwrap();
    let engine = SubmissionEngine::new(tokens as _, Arc::clone(&records) as _, clock, config);
    (engine, issued.token.scope(), records)
}

fn cbus_unit(sub_id: &str, member: &str) -> Submission {
    Submission {
        sub_resource_id: sub(sub_id),
        fact_kind: FactKind::CbusCompliance,
        payload: cbus_payload(member),
    }
}

#[test]
fn scope_confinement_across_a_mixed_batch() {
    let (engine, scope, records) = engine_with_scope(&["employer-a", "employer-b"]);

    let outcomes = engine
        .submit(
            &scope,
            vec![cbus_unit("employer-a", "CB-1"), cbus_unit("employer-c", "CB-9")],
        )
        .unwrap();

    assert_eq!(outcomes[0].outcome, Outcome::Committed { version: 1 });
    assert_eq!(
        outcomes[1].outcome,
        Outcome::Rejected {
            reason: RejectReason::ResourceNotInScope
        }
    );

    // No stored trace of the out-of-scope employer, for any fact kind.
    for kind in FactKind::ALL {
        let key = RecordKey::new(sub("employer-c"), kind);
        assert!(records.history(&key).unwrap().is_empty());
    }
}

#[test]
fn n_sequential_submissions_yield_versions_one_through_n() {
    let (engine, scope, records) = engine_with_scope(&["employer-a"]);
    let n = 7u64;

    for expected in 1..=n {
        let outcomes = engine
            .submit(&scope, vec![cbus_unit("employer-a", &format!("CB-{expected}"))])
            .unwrap();
        assert_eq!(outcomes[0].outcome, Outcome::Committed { version: expected });
    }

    let key = RecordKey::new(sub("employer-a"), FactKind::CbusCompliance);
    let history = records.history(&key).unwrap();
    assert_eq!(
        history.iter().map(|r| r.version).collect::<Vec<_>>(),
        (1..=n).collect::<Vec<_>>()
    );
    let current: Vec<_> = history.iter().filter(|r| r.is_current).collect();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].version, n);
}

#[test]
fn fact_kinds_version_independently() {
    let (engine, scope, records) = engine_with_scope(&["employer-a"]);

    engine
        .submit(&scope, vec![cbus_unit("employer-a", "CB-1")])
        .unwrap();
    engine
        .submit(&scope, vec![cbus_unit("employer-a", "CB-2")])
        .unwrap();
    let outcomes = engine
        .submit(
            &scope,
            vec![Submission {
                sub_resource_id: sub("employer-a"),
                fact_kind: FactKind::IncolinkCompliance,
                payload: incolink_payload("IN-1"),
            }],
        )
        .unwrap();

    // First INCOLINK version is 1 even though CBUS is already at 2.
    assert_eq!(outcomes[0].outcome, Outcome::Committed { version: 1 });
    let cbus = RecordKey::new(sub("employer-a"), FactKind::CbusCompliance);
    assert_eq!(records.history(&cbus).unwrap().len(), 2);
}

#[test]
fn audit_trail_sees_every_version_with_provenance() {
    let (engine, scope, records) = engine_with_scope(&["employer-a"]);
    for i in 0..3 {
        engine
            .submit(&scope, vec![cbus_unit("employer-a", &format!("CB-{i}"))])
            .unwrap();
    }

    let trail = AuditTrail::new(records as _);
    let key = RecordKey::new(sub("employer-a"), FactKind::CbusCompliance);
    let history = trail.history(&key).unwrap();
    assert_eq!(history.len(), 3);
    assert!(history.iter().all(|r| r.created_via == scope.token_id));
    assert!(history.windows(2).all(|w| w[0].version < w[1].version));
}
