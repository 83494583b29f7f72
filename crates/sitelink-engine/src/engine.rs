//! Versioned submission engine
//!
//! Commits a batch of proposed updates as new record versions under an
//! optimistic, bounded-retry compare-and-swap per
//! `(sub_resource, fact_kind)` unit. Units are independent: a rejection
//! never blocks or rolls back sibling units, and every outcome is reported
//! per unit.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sitelink_core::{
    Clock, FactKind, FactPayload, RecordKey, RejectReason, Scope, SubResourceId, TokenError,
};
use sitelink_store::{AppendError, NewVersion, RecordStore, TokenStore};

use crate::config::SitelinkConfig;

/// One proposed update in a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub sub_resource_id: SubResourceId,
    pub fact_kind: FactKind,
    pub payload: FactPayload,
}

/// Per-unit result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// A new version landed and is now current
    Committed { version: u64 },
    /// The unit was rejected; siblings are unaffected
    Rejected { reason: RejectReason },
}

impl Outcome {
    #[inline]
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Outcome tagged with the unit it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOutcome {
    pub sub_resource_id: SubResourceId,
    pub fact_kind: FactKind,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Commits scoped submission batches against the record store
pub struct SubmissionEngine {
    tokens: Arc<dyn TokenStore>,
    records: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    config: SitelinkConfig,
}

impl SubmissionEngine {
    #[must_use]
    pub fn new(
        tokens: Arc<dyn TokenStore>,
        records: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        config: SitelinkConfig,
    ) -> Self {
        Self {
            tokens,
            records,
            clock,
            config,
        }
    }

    /// Commit a batch for `scope`, one outcome per unit, in input order.
    ///
    /// The scope's backing token is re-checked first: a token that expired
    /// after the visitor loaded the form rejects the whole batch with
    /// [`TokenError::Expired`] before anything is written.
    pub fn submit(
        &self,
        scope: &Scope,
        submissions: Vec<Submission>,
    ) -> Result<Vec<UnitOutcome>, TokenError> {
        let token = self
            .tokens
            .find_by_id(scope.token_id)?
            .ok_or(TokenError::NotFound)?;
        if !token.is_usable_at(self.clock.now()) {
            tracing::info!(token_id = %scope.token_id, "batch rejected, token expired mid-session");
            return Err(TokenError::Expired);
        }

        let outcomes = submissions
            .into_iter()
            .map(|submission| {
                let outcome = self.commit_unit(scope, &submission);
                UnitOutcome {
                    sub_resource_id: submission.sub_resource_id,
                    fact_kind: submission.fact_kind,
                    outcome,
                }
            })
            .collect::<Vec<_>>();

        let committed = outcomes.iter().filter(|u| u.outcome.is_committed()).count();
        tracing::info!(
            token_id = %scope.token_id,
            committed,
            rejected = outcomes.len() - committed,
            "batch processed"
        );
        Ok(outcomes)
    }

    /// One unit's transition: scope check, payload validation, then
    /// bounded CAS against the store.
    fn commit_unit(&self, scope: &Scope, submission: &Submission) -> Outcome {
        if !scope.allows(&submission.sub_resource_id) {
            tracing::warn!(
                token_id = %scope.token_id,
                sub_resource = %submission.sub_resource_id,
                "submission targeted resource outside scope"
            );
            return Outcome::Rejected {
                reason: RejectReason::ResourceNotInScope,
            };
        }

        if let Err(err) = submission.payload.validate_for(submission.fact_kind) {
            return Outcome::Rejected {
                reason: RejectReason::InvalidPayload(err.to_string()),
            };
        }

        let key = RecordKey::new(submission.sub_resource_id.clone(), submission.fact_kind);
        for attempt in 1..=self.config.max_commit_attempts {
            let expected = match self.records.current_version(&key) {
                Ok(version) => version,
                Err(err) => {
                    return Outcome::Rejected {
                        reason: RejectReason::Persistence(err.to_string()),
                    }
                }
            };

            let next = NewVersion {
                payload: submission.payload.clone(),
                created_at: self.clock.now(),
                created_via: scope.token_id,
            };
            match self.records.append_version(&key, expected, next) {
                Ok(version) => return Outcome::Committed { version },
                Err(AppendError::Conflict { .. }) => {
                    // A concurrent writer moved currency forward; re-read
                    // and land behind it in serial order.
                    tracing::debug!(%key, attempt, "commit conflict, retrying");
                }
                Err(AppendError::Store(err)) => {
                    return Outcome::Rejected {
                        reason: RejectReason::Persistence(err.to_string()),
                    }
                }
            }
        }

        Outcome::Rejected {
            reason: RejectReason::ConcurrencyExhausted {
                attempts: self.config.max_commit_attempts,
            },
        }
    }
}
