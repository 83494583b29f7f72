//! Service boundary
//!
//! The contracts the excluded collaborators consume: the operator UI's
//! issuance request, the public form's read and submit requests, and the
//! operator-facing audit query. Requests arrive as serde DTOs with string
//! ids and duration classes; parsing failures surface as typed issuance
//! errors before any component runs.
//!
//! The public path is mediated exclusively through the bearer secret and
//! the validator; no elevated credential ever crosses this boundary.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sitelink_core::{
    Clock, DurationClass, IssueError, ParentResourceId, RecordKey, ResourceType, StoreError,
    SubResourceId, TokenError, TokenSecret, VersionedRecord,
};
use sitelink_store::{ParentDirectory, RecordStore, TokenStore};

use crate::audit::AuditTrail;
use crate::config::SitelinkConfig;
use crate::engine::{Submission, SubmissionEngine, UnitOutcome};
use crate::issuer::TokenIssuer;
use crate::projector::{ProjectionView, ScopedReadProjector};
use crate::validator::TokenValidator;

/// Issuance request from the authorized-operator UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRequest {
    pub resource_type: ResourceType,
    pub parent_resource_id: String,
    pub scope_allow_list: Vec<String>,
    pub duration_class: String,
}

/// Issuance response; the UI renders `secret` as a link/QR code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueResponse {
    pub secret: String,
    pub expires_at: DateTime<Utc>,
}

/// Public read request from the visitor-facing form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicReadRequest {
    pub secret: String,
    pub resource_type: ResourceType,
}

/// Public submit request from the visitor-facing form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicSubmitRequest {
    pub secret: String,
    pub resource_type: ResourceType,
    pub submissions: Vec<Submission>,
}

/// The two operations reachable by an unauthenticated secret holder
#[async_trait]
pub trait PublicAccessApi: Send + Sync {
    /// Scoped read projection, or a terminal token error
    async fn read(&self, request: PublicReadRequest) -> Result<ProjectionView, TokenError>;

    /// Versioned submission with per-unit outcomes
    async fn submit(&self, request: PublicSubmitRequest)
        -> Result<Vec<UnitOutcome>, TokenError>;
}

/// Wires issuer, validator, projector, engine and audit trail over shared
/// stores
pub struct SitelinkService {
    tokens: Arc<dyn TokenStore>,
    issuer: TokenIssuer,
    validator: TokenValidator,
    projector: ScopedReadProjector,
    engine: SubmissionEngine,
    audit: AuditTrail,
    clock: Arc<dyn Clock>,
}

impl SitelinkService {
    #[must_use]
    pub fn new(
        tokens: Arc<dyn TokenStore>,
        records: Arc<dyn RecordStore>,
        parents: Arc<dyn ParentDirectory>,
        clock: Arc<dyn Clock>,
        config: SitelinkConfig,
    ) -> Self {
        Self {
            issuer: TokenIssuer::new(Arc::clone(&tokens), Arc::clone(&clock), config.clone()),
            validator: TokenValidator::new(Arc::clone(&tokens), Arc::clone(&clock)),
            projector: ScopedReadProjector::new(
                Arc::clone(&records),
                parents,
                Arc::clone(&clock),
            ),
            engine: SubmissionEngine::new(
                Arc::clone(&tokens),
                Arc::clone(&records),
                Arc::clone(&clock),
                config,
            ),
            audit: AuditTrail::new(records),
            tokens,
            clock,
        }
    }

    /// Operator issuance: parse the DTO, delegate to the issuer
    pub async fn issue(&self, request: IssueRequest) -> Result<IssueResponse, IssueError> {
        let duration: DurationClass = request.duration_class.parse()?;
        let parent = ParentResourceId::new(request.parent_resource_id.as_str())
            .ok_or_else(|| IssueError::InvalidResourceId(request.parent_resource_id.clone()))?;
        let allow_list = request
            .scope_allow_list
            .iter()
            .map(|raw| {
                SubResourceId::new(raw.as_str())
                    .ok_or_else(|| IssueError::InvalidResourceId(raw.clone()))
            })
            .collect::<Result<BTreeSet<_>, _>>()?;

        let issued = self
            .issuer
            .issue(request.resource_type, parent, allow_list, duration)?;
        Ok(IssueResponse {
            secret: issued.secret.reveal().to_string(),
            expires_at: issued.token.expires_at,
        })
    }

    /// Operator audit query: full history for one key, version ascending
    pub async fn audit_history(&self, key: &RecordKey) -> Result<Vec<VersionedRecord>, StoreError> {
        self.audit.history(key)
    }

    /// Best-effort `last_used_at` stamp, detached from the request path
    fn record_usage(&self, token_id: sitelink_core::TokenId) {
        let tokens = Arc::clone(&self.tokens);
        let now = self.clock.now();
        tokio::spawn(async move {
            if let Err(err) = tokens.touch_last_used(token_id, now) {
                tracing::debug!(%token_id, %err, "last-used stamp failed");
            }
        });
    }
}

#[async_trait]
impl PublicAccessApi for SitelinkService {
    async fn read(&self, request: PublicReadRequest) -> Result<ProjectionView, TokenError> {
        let secret = TokenSecret::from_presented(request.secret);
        let scope = self.validator.validate(&secret, request.resource_type)?;
        self.record_usage(scope.token_id);
        self.projector.project(&scope).map_err(TokenError::Store)
    }

    async fn submit(
        &self,
        request: PublicSubmitRequest,
    ) -> Result<Vec<UnitOutcome>, TokenError> {
        let secret = TokenSecret::from_presented(request.secret);
        let scope = self.validator.validate(&secret, request.resource_type)?;
        self.record_usage(scope.token_id);
        self.engine.submit(&scope, request.submissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitelink_core::FactKind;
    use sitelink_store::{MemoryParentDirectory, MemoryRecordStore, MemoryTokenStore};
    use sitelink_test_utils::{cbus_payload, sub, ManualClock};

    fn service() -> (SitelinkService, Arc<MemoryTokenStore>, Arc<ManualClock>) {
        let tokens = Arc::new(MemoryTokenStore::new());
        let clock = Arc::new(ManualClock::default());
        let service = SitelinkService::new(
            Arc::clone(&tokens) as _,
            Arc::new(MemoryRecordStore::new()) as _,
            Arc::new(MemoryParentDirectory::new()) as _,
            Arc::clone(&clock) as _,
            SitelinkConfig::new(),
        );
        (service, tokens, clock)
    }

    fn issue_request(subs: &[&str], duration: &str) -> IssueRequest {
        IssueRequest {
            resource_type: ResourceType::MappingSheet,
            parent_resource_id: "project-9".to_string(),
            scope_allow_list: subs.iter().map(|s| s.to_string()).collect(),
            duration_class: duration.to_string(),
        }
    }

    #[tokio::test]
    async fn issue_then_read_then_submit_round_trip() {
        let (service, _, _) = service();
        let issued = service
            .issue(issue_request(&["employer-1"], "24h"))
            .await
            .unwrap();

        let view = service
            .read(PublicReadRequest {
                secret: issued.secret.clone(),
                resource_type: ResourceType::MappingSheet,
            })
            .await
            .unwrap();
        assert_eq!(view.entries.len(), 1);

        let outcomes = service
            .submit(PublicSubmitRequest {
                secret: issued.secret,
                resource_type: ResourceType::MappingSheet,
                submissions: vec![Submission {
                    sub_resource_id: sub("employer-1"),
                    fact_kind: FactKind::CbusCompliance,
                    payload: cbus_payload("CB-1"),
                }],
            })
            .await
            .unwrap();
        assert!(outcomes[0].outcome.is_committed());

        let history = service
            .audit_history(&RecordKey::new(sub("employer-1"), FactKind::CbusCompliance))
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn invalid_duration_class_is_rejected_at_the_boundary() {
        let (service, tokens, _) = service();
        let err = service
            .issue(issue_request(&["employer-1"], "36h"))
            .await
            .unwrap_err();
        assert!(matches!(err, IssueError::InvalidDuration(_)));
        assert!(tokens.is_empty());
    }

    #[tokio::test]
    async fn blank_sub_resource_id_is_rejected_at_the_boundary() {
        let (service, tokens, _) = service();
        let err = service
            .issue(issue_request(&["employer-1", "  "], "24h"))
            .await
            .unwrap_err();
        assert!(matches!(err, IssueError::InvalidResourceId(_)));
        assert!(tokens.is_empty());
    }

    #[tokio::test]
    async fn successful_read_stamps_last_used() {
        let (service, tokens, clock) = service();
        let issued = service
            .issue(issue_request(&["employer-1"], "24h"))
            .await
            .unwrap();

        service
            .read(PublicReadRequest {
                secret: issued.secret.clone(),
                resource_type: ResourceType::MappingSheet,
            })
            .await
            .unwrap();

        // The stamp is spawned; yield until it lands.
        for _ in 0..100 {
            tokio::task::yield_now().await;
            let digest = TokenSecret::from_presented(issued.secret.clone()).digest();
            if let Some(token) = tokens.find_by_digest(&digest).unwrap() {
                if token.last_used_at == Some(clock.now()) {
                    return;
                }
            }
        }
        panic!("last_used_at never stamped");
    }
}
