//! Sitelink Store - durable state behind the access core
//!
//! Store traits plus in-memory backends:
//! - [`TokenStore`]: issued tokens, keyed by secret digest
//! - [`RecordStore`]: append-only versioned fact history with a per-key
//!   compare-and-swap commit
//! - [`ParentDirectory`]: public-safe parent summaries for projections
//!
//! All authority state lives behind these traits, so the engine layer
//! holds no mutable state of its own and can be replicated over any shared
//! backend that honors the same contracts.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod directory;
pub mod record_store;
pub mod token_store;

pub use directory::{MemoryParentDirectory, ParentDirectory, ParentSummary};
pub use record_store::{AppendError, MemoryRecordStore, NewVersion, RecordStore};
pub use token_store::{MemoryTokenStore, TokenStore};
