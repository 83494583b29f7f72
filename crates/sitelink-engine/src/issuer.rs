//! Token issuer
//!
//! Creates a token bound to a resource type, a parent resource and an
//! explicit allow-list of sub-resources. The plaintext secret exists only
//! in the returned [`IssuedToken`]; the store keeps its digest.

use std::collections::BTreeSet;
use std::sync::Arc;

use sitelink_core::{
    AccessToken, Clock, DurationClass, IssueError, ParentResourceId, ResourceType, StoreError,
    SubResourceId, TokenId, TokenSecret,
};
use sitelink_store::TokenStore;

use crate::config::SitelinkConfig;

/// Result of a successful issuance
///
/// `secret` is shown to the operator exactly once, for rendering the
/// link/QR; it cannot be recovered afterwards.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub secret: TokenSecret,
    pub token: AccessToken,
}

/// Issues scoped, expiring access tokens
pub struct TokenIssuer {
    tokens: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
    config: SitelinkConfig,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(tokens: Arc<dyn TokenStore>, clock: Arc<dyn Clock>, config: SitelinkConfig) -> Self {
        Self {
            tokens,
            clock,
            config,
        }
    }

    /// Issue a token over `allow_list` under `parent`, expiring per
    /// `duration`.
    ///
    /// The only side effect is one token-store insert. A digest collision
    /// is treated as a generation failure and retried with a fresh secret
    /// up to the configured bound.
    pub fn issue(
        &self,
        resource_type: ResourceType,
        parent: ParentResourceId,
        allow_list: BTreeSet<SubResourceId>,
        duration: DurationClass,
    ) -> Result<IssuedToken, IssueError> {
        if allow_list.is_empty() {
            return Err(IssueError::EmptyScope);
        }

        let created_at = self.clock.now();
        let expires_at = duration.deadline(created_at);

        for attempt in 1..=self.config.max_secret_attempts {
            let secret = TokenSecret::generate();
            let token = AccessToken {
                id: TokenId::new(),
                secret_digest: secret.digest(),
                resource_type,
                parent_resource_id: parent.clone(),
                scope_allow_list: allow_list.clone(),
                created_at,
                expires_at,
                last_used_at: None,
            };

            match self.tokens.insert(token.clone()) {
                Ok(()) => {
                    tracing::info!(
                        token_id = %token.id,
                        %resource_type,
                        parent = %token.parent_resource_id,
                        scope_size = token.scope_allow_list.len(),
                        %duration,
                        "token issued"
                    );
                    return Ok(IssuedToken { secret, token });
                }
                Err(StoreError::SecretCollision) => {
                    tracing::warn!(attempt, "secret collision, regenerating");
                }
                Err(err) => return Err(IssueError::Store(err)),
            }
        }

        Err(IssueError::SecretExhausted(self.config.max_secret_attempts))
    }
}
