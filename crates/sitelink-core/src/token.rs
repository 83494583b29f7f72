//! Access tokens and scopes
//!
//! An access token grants an unauthenticated holder scoped, time-limited
//! write access. The bearer string (`TokenSecret`) is what the public
//! holder presents; at rest only its SHA-256 digest is kept, so a leaked
//! token store does not leak live links.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::IssueError;
use crate::id::{ParentResourceId, SubResourceId, TokenId};

/// Length of generated bearer secrets. 64 alphanumeric characters gives
/// ~381 bits of entropy, well past the 48-character floor.
pub const SECRET_LENGTH: usize = 64;

/// Resource families a token can be issued for (closed, extensible set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    /// Employer mapping sheet for a project
    MappingSheet,
    /// Audit / compliance check sheet for a project
    AuditCompliance,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MappingSheet => write!(f, "MAPPING_SHEET"),
            Self::AuditCompliance => write!(f, "AUDIT_COMPLIANCE"),
        }
    }
}

/// Enumerated link lifetimes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationClass {
    /// 24 hours
    H24,
    /// 48 hours
    H48,
    /// 72 hours
    H72,
    /// 7 days
    D7,
}

impl DurationClass {
    /// All classes, shortest first
    pub const ALL: [DurationClass; 4] = [Self::H24, Self::H48, Self::H72, Self::D7];

    /// Expiry policy: absolute deadline for a token issued at `issued_at`
    #[inline]
    #[must_use]
    pub fn deadline(self, issued_at: DateTime<Utc>) -> DateTime<Utc> {
        issued_at + self.lifetime()
    }

    /// Lifetime as a duration
    #[inline]
    #[must_use]
    pub fn lifetime(self) -> Duration {
        match self {
            Self::H24 => Duration::hours(24),
            Self::H48 => Duration::hours(48),
            Self::H72 => Duration::hours(72),
            Self::D7 => Duration::days(7),
        }
    }
}

impl FromStr for DurationClass {
    type Err = IssueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "24H" | "H24" => Ok(Self::H24),
            "48H" | "H48" => Ok(Self::H48),
            "72H" | "H72" => Ok(Self::H72),
            "7D" | "D7" => Ok(Self::D7),
            other => Err(IssueError::InvalidDuration(other.to_string())),
        }
    }
}

impl std::fmt::Display for DurationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::H24 => write!(f, "24h"),
            Self::H48 => write!(f, "48h"),
            Self::H72 => write!(f, "72h"),
            Self::D7 => write!(f, "7d"),
        }
    }
}

/// High-entropy bearer string presented by the public holder
///
/// Only handed out at issuance; never persisted in plaintext.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);

impl TokenSecret {
    /// Generate a fresh secret from the OS CSPRNG
    #[must_use]
    pub fn generate() -> Self {
        let raw: String = OsRng
            .sample_iter(&Alphanumeric)
            .take(SECRET_LENGTH)
            .map(char::from)
            .collect();
        Self(raw)
    }

    /// Wrap a secret presented by a visitor
    #[inline]
    #[must_use]
    pub fn from_presented(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Digest used for storage and lookup
    #[must_use]
    pub fn digest(&self) -> SecretDigest {
        SecretDigest(Sha256::digest(self.0.as_bytes()).into())
    }

    /// Expose the plaintext, for rendering the link at issuance only
    #[inline]
    #[must_use]
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

// Secrets never appear in logs or debug output.
impl std::fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenSecret(****)")
    }
}

/// SHA-256 digest of a bearer secret, the at-rest lookup key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SecretDigest(pub [u8; 32]);

impl std::fmt::Display for SecretDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Durable record of an issued token
///
/// Immutable after issuance except `last_used_at`; becomes permanently
/// unusable (but is never deleted) once `expires_at` passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub id: TokenId,
    pub secret_digest: SecretDigest,
    pub resource_type: ResourceType,
    pub parent_resource_id: ParentResourceId,
    pub scope_allow_list: BTreeSet<SubResourceId>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Observability only; never used to deny reuse
    pub last_used_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Usability check: strictly before the deadline
    #[inline]
    #[must_use]
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Resolve this token into an immutable scope
    #[must_use]
    pub fn scope(&self) -> Scope {
        Scope {
            token_id: self.id,
            resource_type: self.resource_type,
            parent_resource_id: self.parent_resource_id.clone(),
            allow_list: self.scope_allow_list.clone(),
        }
    }
}

/// The resolved authority of a validated token
///
/// Immutable snapshot; holding a `Scope` grants nothing once the backing
/// token expires, since every submission re-checks the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub token_id: TokenId,
    pub resource_type: ResourceType,
    pub parent_resource_id: ParentResourceId,
    pub allow_list: BTreeSet<SubResourceId>,
}

impl Scope {
    /// Whether a sub-resource is inside this scope
    #[inline]
    #[must_use]
    pub fn allows(&self, sub_resource: &SubResourceId) -> bool {
        self.allow_list.contains(sub_resource)
    }
}
