//! Sitelink Core - shared types for scoped share-link access
//!
//! Leaf crate defining:
//! - Identifier newtypes for tokens, parents and sub-resources
//! - The access-token model (secrets, digests, scopes, expiry classes)
//! - Tagged, validated submission payloads
//! - The versioned, append-only record model
//! - The error taxonomy shared across the workspace

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod clock;
pub mod error;
pub mod id;
pub mod payload;
pub mod record;
pub mod token;

// Re-exports for convenience
pub use clock::{Clock, SystemClock};
pub use error::{IssueError, RejectReason, StoreError, TokenError};
pub use id::{ParentResourceId, SubResourceId, TokenId};
pub use payload::{ComplianceStatus, FactKind, FactPayload, PayloadError};
pub use record::{RecordKey, VersionedRecord};
pub use token::{
    AccessToken, DurationClass, ResourceType, Scope, SecretDigest, TokenSecret, SECRET_LENGTH,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
