//! Token validator
//!
//! Resolves an opaque bearer secret to an immutable [`Scope`] or a typed
//! failure. Read-only and safe under arbitrary concurrency: validation
//! never mutates token state and cannot invalidate a token. The
//! `last_used_at` stamp is the service layer's job, off this path.

use std::sync::Arc;

use sitelink_core::{Clock, ResourceType, Scope, TokenError, TokenSecret};
use sitelink_store::TokenStore;

/// Validates presented secrets against the token store
pub struct TokenValidator {
    tokens: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
}

impl TokenValidator {
    #[must_use]
    pub fn new(tokens: Arc<dyn TokenStore>, clock: Arc<dyn Clock>) -> Self {
        Self { tokens, clock }
    }

    /// Resolve `secret` to a scope, checking existence, expiry and the
    /// caller's declared resource type, in that order.
    ///
    /// Reuse before expiry is intentional; the same secret may be
    /// validated arbitrarily many times.
    pub fn validate(
        &self,
        secret: &TokenSecret,
        expected: ResourceType,
    ) -> Result<Scope, TokenError> {
        let token = self
            .tokens
            .find_by_digest(&secret.digest())?
            .ok_or(TokenError::NotFound)?;

        if !token.is_usable_at(self.clock.now()) {
            tracing::debug!(token_id = %token.id, "expired token presented");
            return Err(TokenError::Expired);
        }
        if token.resource_type != expected {
            tracing::warn!(
                token_id = %token.id,
                actual = %token.resource_type,
                %expected,
                "token presented against wrong endpoint type"
            );
            return Err(TokenError::TypeMismatch {
                expected,
                actual: token.resource_type,
            });
        }

        Ok(token.scope())
    }
}
