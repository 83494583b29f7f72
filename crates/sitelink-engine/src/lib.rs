//! Sitelink Engine - the secure share-link access core
//!
//! Wires the full token lifecycle and versioned submission pipeline:
//! - [`TokenIssuer`]: scoped, expiring bearer tokens
//! - [`TokenValidator`]: secret resolution with expiry and type checks
//! - [`ScopedReadProjector`]: the confidentiality-bounded read view
//! - [`SubmissionEngine`]: race-safe versioned commits with per-unit
//!   outcomes
//! - [`AuditTrail`]: operator-facing history queries
//! - [`SitelinkService`]: the async boundary consumed by the UIs
//!
//! # Example
//!
//! ```rust,ignore
//! use sitelink_engine::prelude::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = SitelinkService::new(tokens, records, parents, clock, SitelinkConfig::new());
//! let issued = service.issue(request).await?;
//! println!("link secret: {}", issued.secret);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod audit;
pub mod config;
pub mod engine;
pub mod issuer;
pub mod projector;
pub mod service;
pub mod validator;

// Re-exports for convenience
pub use audit::AuditTrail;
pub use config::SitelinkConfig;
pub use engine::{Outcome, Submission, SubmissionEngine, UnitOutcome};
pub use issuer::{IssuedToken, TokenIssuer};
pub use projector::{FactSlot, FactState, ProjectionEntry, ProjectionView, ScopedReadProjector};
pub use service::{
    IssueRequest, IssueResponse, PublicAccessApi, PublicReadRequest, PublicSubmitRequest,
    SitelinkService,
};
pub use validator::TokenValidator;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the sitelink engine
    pub use crate::{
        Outcome, PublicAccessApi, SitelinkConfig, SitelinkService, Submission, SubmissionEngine,
        TokenIssuer, TokenValidator, UnitOutcome,
    };
    pub use sitelink_core::{
        DurationClass, FactKind, FactPayload, RecordKey, ResourceType, Scope, TokenSecret,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
