//! Token store
//!
//! Durable record of issued tokens, keyed by secret digest so the
//! plaintext bearer string never lands at rest. Tokens are immutable after
//! insertion except for the observability-only `last_used_at` stamp.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sitelink_core::{AccessToken, SecretDigest, StoreError, TokenId};

/// Durable token registry
pub trait TokenStore: Send + Sync {
    /// Persist a freshly issued token.
    ///
    /// Fails with [`StoreError::SecretCollision`] if a token with the same
    /// secret digest already exists; the issuer treats that as a
    /// generation failure and retries with a new secret.
    fn insert(&self, token: AccessToken) -> Result<(), StoreError>;

    /// Look up a token by the digest of a presented secret
    fn find_by_digest(&self, digest: &SecretDigest) -> Result<Option<AccessToken>, StoreError>;

    /// Look up a token by id (used for expiry re-checks mid-submission)
    fn find_by_id(&self, id: TokenId) -> Result<Option<AccessToken>, StoreError>;

    /// Best-effort `last_used_at` stamp after a successful validation
    fn touch_last_used(&self, id: TokenId, at: DateTime<Utc>) -> Result<(), StoreError>;
}

/// In-memory token store
///
/// Sharded map keyed by secret digest, with a secondary id index for
/// mid-submission re-checks.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    by_digest: DashMap<SecretDigest, AccessToken>,
    digest_by_id: DashMap<TokenId, SecretDigest>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tokens ever issued (tokens are never deleted)
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_digest.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_digest.is_empty()
    }
}

impl TokenStore for MemoryTokenStore {
    fn insert(&self, token: AccessToken) -> Result<(), StoreError> {
        use dashmap::mapref::entry::Entry;

        let digest = token.secret_digest;
        let id = token.id;
        match self.by_digest.entry(digest) {
            Entry::Occupied(_) => {
                tracing::warn!(token_id = %id, "secret digest collision on insert");
                Err(StoreError::SecretCollision)
            }
            Entry::Vacant(slot) => {
                slot.insert(token);
                self.digest_by_id.insert(id, digest);
                Ok(())
            }
        }
    }

    fn find_by_digest(&self, digest: &SecretDigest) -> Result<Option<AccessToken>, StoreError> {
        Ok(self.by_digest.get(digest).map(|entry| entry.value().clone()))
    }

    fn find_by_id(&self, id: TokenId) -> Result<Option<AccessToken>, StoreError> {
        let Some(digest) = self.digest_by_id.get(&id).map(|entry| *entry) else {
            return Ok(None);
        };
        self.find_by_digest(&digest)
    }

    fn touch_last_used(&self, id: TokenId, at: DateTime<Utc>) -> Result<(), StoreError> {
        let Some(digest) = self.digest_by_id.get(&id).map(|entry| *entry) else {
            return Err(StoreError::Unavailable(format!("unknown token {id}")));
        };
        if let Some(mut entry) = self.by_digest.get_mut(&digest) {
            entry.last_used_at = Some(at);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitelink_core::{DurationClass, ParentResourceId, ResourceType, SubResourceId, TokenSecret};
    use std::collections::BTreeSet;

    fn test_token(secret: &TokenSecret) -> AccessToken {
        let created_at = Utc::now();
        let mut allow = BTreeSet::new();
        allow.insert(SubResourceId::new("employer-1").unwrap());
        AccessToken {
            id: TokenId::new(),
            secret_digest: secret.digest(),
            resource_type: ResourceType::MappingSheet,
            parent_resource_id: ParentResourceId::new("project-9").unwrap(),
            scope_allow_list: allow,
            created_at,
            expires_at: DurationClass::H24.deadline(created_at),
            last_used_at: None,
        }
    }

    #[test]
    fn insert_and_find_by_digest() {
        let store = MemoryTokenStore::new();
        let secret = TokenSecret::generate();
        let token = test_token(&secret);
        store.insert(token.clone()).unwrap();

        let found = store.find_by_digest(&secret.digest()).unwrap().unwrap();
        assert_eq!(found, token);
        assert!(store
            .find_by_digest(&TokenSecret::generate().digest())
            .unwrap()
            .is_none());
    }

    #[test]
    fn duplicate_digest_collides() {
        let store = MemoryTokenStore::new();
        let secret = TokenSecret::generate();
        store.insert(test_token(&secret)).unwrap();
        assert_eq!(
            store.insert(test_token(&secret)),
            Err(StoreError::SecretCollision)
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn touch_updates_last_used() {
        let store = MemoryTokenStore::new();
        let secret = TokenSecret::generate();
        let token = test_token(&secret);
        let id = token.id;
        store.insert(token).unwrap();

        let at = Utc::now();
        store.touch_last_used(id, at).unwrap();
        let found = store.find_by_id(id).unwrap().unwrap();
        assert_eq!(found.last_used_at, Some(at));
    }

    #[test]
    fn touch_unknown_token_fails_softly() {
        let store = MemoryTokenStore::new();
        assert!(store.touch_last_used(TokenId::new(), Utc::now()).is_err());
    }
}
