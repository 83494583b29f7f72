//! End-to-end token lifecycle: issue, validate, project, submit, expire.

use std::sync::Arc;

use chrono::Duration;
use sitelink_core::{
    DurationClass, FactKind, IssueError, ResourceType, TokenError,
};
use sitelink_engine::{
    ScopedReadProjector, SitelinkConfig, Submission, SubmissionEngine, TokenIssuer, TokenValidator,
};
use sitelink_test_utils::{allow_list, cbus_payload, memory_stack, parent, sub, ManualClock};

struct Stack {
    clock: Arc<ManualClock>,
    issuer: TokenIssuer,
    validator: TokenValidator,
    projector: ScopedReadProjector,
    engine: SubmissionEngine,
}

fn stack() -> Stack {
    let (tokens, records, parents) = memory_stack();
    let clock = Arc::new(ManualClock::default());
    let config = SitelinkConfig::new();
    Stack {
        issuer: TokenIssuer::new(
            Arc::clone(&tokens) as _,
            Arc::clone(&clock) as _,
            config.clone(),
        ),
        validator: TokenValidator::new(Arc::clone(&tokens) as _, Arc::clone(&clock) as _),
        projector: ScopedReadProjector::new(
            Arc::clone(&records) as _,
            parents as _,
            Arc::clone(&clock) as _,
        ),
        engine: SubmissionEngine::new(
            tokens as _,
            records as _,
            Arc::clone(&clock) as _,
            config,
        ),
        clock,
    }
}

fn one_unit() -> Vec<Submission> {
    vec![Submission {
        sub_resource_id: sub("employer-1"),
        fact_kind: FactKind::CbusCompliance,
        payload: cbus_payload("CB-1"),
    }]
}

#[test]
fn reuse_until_expiry_then_terminal_failure() {
    let stack = stack();
    let issued = stack
        .issuer
        .issue(
            ResourceType::MappingSheet,
            parent("project-9"),
            allow_list(&["employer-1"]),
            DurationClass::H48,
        )
        .unwrap();

    // The same link validated and submitted against three times, with
    // corrections, before the deadline.
    for round in 0..3 {
        let scope = stack
            .validator
            .validate(&issued.secret, ResourceType::MappingSheet)
            .unwrap();
        let view = stack.projector.project(&scope).unwrap();
        assert_eq!(view.entries.len(), 1);
        let outcomes = stack.engine.submit(&scope, one_unit()).unwrap();
        assert!(outcomes[0].outcome.is_committed());
        stack.clock.advance(Duration::hours(round + 1));
    }

    // Past the deadline the same secret is permanently unusable.
    stack.clock.set(issued.token.expires_at + Duration::seconds(1));
    assert_eq!(
        stack
            .validator
            .validate(&issued.secret, ResourceType::MappingSheet)
            .unwrap_err(),
        TokenError::Expired
    );
}

#[test]
fn token_expiring_mid_session_rejects_new_submissions() {
    let stack = stack();
    let issued = stack
        .issuer
        .issue(
            ResourceType::MappingSheet,
            parent("project-9"),
            allow_list(&["employer-1"]),
            DurationClass::H24,
        )
        .unwrap();

    // Visitor validates and loads the form while the token is live.
    let scope = stack
        .validator
        .validate(&issued.secret, ResourceType::MappingSheet)
        .unwrap();

    // The deadline passes while the form is open.
    stack.clock.advance(Duration::hours(25));
    assert_eq!(
        stack.engine.submit(&scope, one_unit()).unwrap_err(),
        TokenError::Expired
    );
}

#[test]
fn empty_allow_list_never_reaches_the_store() {
    let (tokens, _, _) = memory_stack();
    let issuer = TokenIssuer::new(
        Arc::clone(&tokens) as _,
        Arc::new(ManualClock::default()),
        SitelinkConfig::new(),
    );
    assert_eq!(
        issuer
            .issue(
                ResourceType::AuditCompliance,
                parent("project-9"),
                allow_list(&[]),
                DurationClass::H24,
            )
            .unwrap_err(),
        IssueError::EmptyScope
    );
    assert!(tokens.is_empty());
}

#[test]
fn mapping_sheet_link_cannot_hit_audit_endpoint() {
    let stack = stack();
    let issued = stack
        .issuer
        .issue(
            ResourceType::MappingSheet,
            parent("project-9"),
            allow_list(&["employer-1"]),
            DurationClass::D7,
        )
        .unwrap();

    let err = stack
        .validator
        .validate(&issued.secret, ResourceType::AuditCompliance)
        .unwrap_err();
    assert_eq!(
        err,
        TokenError::TypeMismatch {
            expected: ResourceType::AuditCompliance,
            actual: ResourceType::MappingSheet,
        }
    );
}
