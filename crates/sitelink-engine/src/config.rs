//! Engine configuration

use serde::{Deserialize, Serialize};

/// Tunables for the issuance and submission paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitelinkConfig {
    /// Secret generation attempts before issuance gives up on collisions
    pub max_secret_attempts: u32,
    /// CAS commit attempts per unit before `ConcurrencyExhausted`
    pub max_commit_attempts: u32,
}

impl SitelinkConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With secret-generation attempt bound
    #[inline]
    #[must_use]
    pub fn with_max_secret_attempts(mut self, attempts: u32) -> Self {
        self.max_secret_attempts = attempts;
        self
    }

    /// With per-unit commit attempt bound
    #[inline]
    #[must_use]
    pub fn with_max_commit_attempts(mut self, attempts: u32) -> Self {
        self.max_commit_attempts = attempts;
        self
    }
}

impl Default for SitelinkConfig {
    fn default() -> Self {
        Self {
            max_secret_attempts: 4,
            max_commit_attempts: 3,
        }
    }
}
