//! Scoped read projection
//!
//! Builds the view a public visitor sees: the parent's public-safe summary
//! plus, for every allowed sub-resource, the current record per fact kind
//! or an explicit "not recorded yet" marker. This is the primary
//! confidentiality boundary: nothing outside `scope.allow_list` is read,
//! regardless of what the store contains.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sitelink_core::{
    Clock, FactKind, ResourceType, Scope, StoreError, SubResourceId, VersionedRecord,
};
use sitelink_store::{ParentDirectory, ParentSummary, RecordStore};

/// State of one fact slot in a projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactState {
    /// The current accepted version
    Current { record: VersionedRecord },
    /// No submission has ever landed for this slot
    NotRecorded,
}

/// One fact kind's slot for a sub-resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactSlot {
    pub kind: FactKind,
    #[serde(flatten)]
    pub fact: FactState,
}

/// Everything projected for one allowed sub-resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionEntry {
    pub sub_resource_id: SubResourceId,
    pub facts: Vec<FactSlot>,
}

/// The scoped view handed to the public form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionView {
    pub parent: ParentSummary,
    pub resource_type: ResourceType,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<ProjectionEntry>,
}

/// Projects the current record state for a validated scope
pub struct ScopedReadProjector {
    records: Arc<dyn RecordStore>,
    parents: Arc<dyn ParentDirectory>,
    clock: Arc<dyn Clock>,
}

impl ScopedReadProjector {
    #[must_use]
    pub fn new(
        records: Arc<dyn RecordStore>,
        parents: Arc<dyn ParentDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            records,
            parents,
            clock,
        }
    }

    /// Build the projection for `scope`. Read-only.
    pub fn project(&self, scope: &Scope) -> Result<ProjectionView, StoreError> {
        let parent = self
            .parents
            .describe(&scope.parent_resource_id)?
            .unwrap_or_else(|| ParentSummary::unnamed(scope.parent_resource_id.clone()));

        let mut entries = Vec::with_capacity(scope.allow_list.len());
        for sub_resource_id in &scope.allow_list {
            let mut facts = Vec::with_capacity(FactKind::ALL.len());
            for kind in FactKind::ALL {
                let key = sitelink_core::RecordKey::new(sub_resource_id.clone(), kind);
                let fact = match self.records.current(&key)? {
                    Some(record) => FactState::Current { record },
                    None => FactState::NotRecorded,
                };
                facts.push(FactSlot { kind, fact });
            }
            entries.push(ProjectionEntry {
                sub_resource_id: sub_resource_id.clone(),
                facts,
            });
        }

        tracing::debug!(
            parent = %parent.id,
            entry_count = entries.len(),
            "projection built"
        );
        Ok(ProjectionView {
            parent,
            resource_type: scope.resource_type,
            generated_at: self.clock.now(),
            entries,
        })
    }
}
