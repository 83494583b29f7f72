//! Tagged submission payloads
//!
//! The original public form accepted free-form JSON bodies; here each fact
//! kind gets an explicit tagged variant with its own shape validation, so
//! malformed or unknown shapes are rejected before they reach the
//! submission engine. The engine itself treats a validated payload as
//! opaque content to snapshot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Named categories of versioned facts about a sub-resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactKind {
    /// CBUS contribution compliance
    CbusCompliance,
    /// INCOLINK contribution compliance
    IncolinkCompliance,
}

impl FactKind {
    /// Every fact kind a projection must report a slot for
    pub const ALL: [FactKind; 2] = [Self::CbusCompliance, Self::IncolinkCompliance];
}

impl std::fmt::Display for FactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CbusCompliance => write!(f, "CBUS_COMPLIANCE"),
            Self::IncolinkCompliance => write!(f, "INCOLINK_COMPLIANCE"),
        }
    }
}

/// Reported compliance standing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
    Unknown,
}

/// Payload shape violations, surfaced inline against the offending unit
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    /// Required field left blank
    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),

    /// Field exceeds its length cap
    #[error("field `{field}` exceeds {max} characters")]
    FieldTooLong { field: &'static str, max: usize },

    /// Payload variant does not match the targeted fact kind
    #[error("payload is {actual}, unit targets {expected}")]
    KindMismatch { expected: FactKind, actual: FactKind },
}

const MEMBER_NUMBER_MAX: usize = 32;
const NOTES_MAX: usize = 2000;

/// One fact kind's submitted field set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactPayload {
    /// CBUS standing for an employer
    CbusCompliance {
        member_number: String,
        status: ComplianceStatus,
        /// Last period contributions were paid to, when known
        paid_to: Option<NaiveDate>,
        notes: Option<String>,
    },
    /// INCOLINK standing for an employer
    IncolinkCompliance {
        member_number: String,
        status: ComplianceStatus,
        paid_to: Option<NaiveDate>,
        notes: Option<String>,
    },
}

impl FactPayload {
    /// The fact kind this payload variant belongs to
    #[inline]
    #[must_use]
    pub fn kind(&self) -> FactKind {
        match self {
            Self::CbusCompliance { .. } => FactKind::CbusCompliance,
            Self::IncolinkCompliance { .. } => FactKind::IncolinkCompliance,
        }
    }

    /// Shape/content validation, run before the engine ever sees the unit
    pub fn validate(&self) -> Result<(), PayloadError> {
        let (member_number, notes) = match self {
            Self::CbusCompliance {
                member_number,
                notes,
                ..
            }
            | Self::IncolinkCompliance {
                member_number,
                notes,
                ..
            } => (member_number, notes),
        };

        if member_number.trim().is_empty() {
            return Err(PayloadError::EmptyField("member_number"));
        }
        if member_number.len() > MEMBER_NUMBER_MAX {
            return Err(PayloadError::FieldTooLong {
                field: "member_number",
                max: MEMBER_NUMBER_MAX,
            });
        }
        if let Some(notes) = notes {
            if notes.len() > NOTES_MAX {
                return Err(PayloadError::FieldTooLong {
                    field: "notes",
                    max: NOTES_MAX,
                });
            }
        }
        Ok(())
    }

    /// Validate and confirm the payload targets the expected kind
    pub fn validate_for(&self, expected: FactKind) -> Result<(), PayloadError> {
        if self.kind() != expected {
            return Err(PayloadError::KindMismatch {
                expected,
                actual: self.kind(),
            });
        }
        self.validate()
    }
}
