//! Parent resource directory
//!
//! Read-only lookup of the public-safe fields a projection may show for a
//! parent resource. The full parent record lives outside this core; only
//! the summary crosses the boundary.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sitelink_core::{ParentResourceId, StoreError};

/// Public-safe fields of a parent resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentSummary {
    pub id: ParentResourceId,
    pub display_name: Option<String>,
}

impl ParentSummary {
    /// Fallback summary for parents the directory has no entry for
    #[must_use]
    pub fn unnamed(id: ParentResourceId) -> Self {
        Self {
            id,
            display_name: None,
        }
    }
}

/// Read-only parent lookup
pub trait ParentDirectory: Send + Sync {
    fn describe(&self, id: &ParentResourceId) -> Result<Option<ParentSummary>, StoreError>;
}

/// In-memory parent directory
#[derive(Debug, Default)]
pub struct MemoryParentDirectory {
    parents: DashMap<ParentResourceId, ParentSummary>,
}

impl MemoryParentDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parent's public summary
    pub fn register(&self, id: ParentResourceId, display_name: impl Into<String>) {
        self.parents.insert(
            id.clone(),
            ParentSummary {
                id,
                display_name: Some(display_name.into()),
            },
        );
    }
}

impl ParentDirectory for MemoryParentDirectory {
    fn describe(&self, id: &ParentResourceId) -> Result<Option<ParentSummary>, StoreError> {
        Ok(self.parents.get(id).map(|entry| entry.value().clone()))
    }
}
