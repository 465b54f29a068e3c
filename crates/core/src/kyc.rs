//! KYC record status state machine and submission rules.
//!
//! ```text
//! PENDING --approve--> VERIFIED   (terminal)
//! PENDING --reject-->  REJECTED   (terminal)
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::error::CoreError;
use crate::hashing;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Maximum length for any submitter-provided text field.
pub const MAX_FIELD_LENGTH: u64 = 512;

pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_VERIFIED: &str = "VERIFIED";
pub const STATUS_REJECTED: &str = "REJECTED";

/// All valid decision values.
pub const VALID_DECISIONS: &[&str] = &[STATUS_VERIFIED, STATUS_REJECTED];

/* --------------------------------------------------------------------------
Status
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycStatus {
    Pending,
    Verified,
    Rejected,
}

impl KycStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            KycStatus::Pending => STATUS_PENDING,
            KycStatus::Verified => STATUS_VERIFIED,
            KycStatus::Rejected => STATUS_REJECTED,
        }
    }

    /// `VERIFIED` and `REJECTED` have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        !matches!(self, KycStatus::Pending)
    }

    /// Apply a verifier decision.
    ///
    /// Only `PENDING` records accept a decision; anything else yields
    /// [`CoreError::AlreadyDecided`] carrying the current status.
    pub fn apply(self, id: &str, decision: Decision) -> Result<KycStatus, CoreError> {
        match self {
            KycStatus::Pending => Ok(decision.into()),
            status => Err(CoreError::AlreadyDecided {
                id: id.to_string(),
                status,
            }),
        }
    }
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KycStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_PENDING => Ok(KycStatus::Pending),
            STATUS_VERIFIED => Ok(KycStatus::Verified),
            STATUS_REJECTED => Ok(KycStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid KYC status '{other}'"
            ))),
        }
    }
}

/* --------------------------------------------------------------------------
Decision
-------------------------------------------------------------------------- */

/// A verifier's verdict on a pending record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Verified,
    Rejected,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        KycStatus::from(self).as_str()
    }
}

impl From<Decision> for KycStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Verified => KycStatus::Verified,
            Decision::Rejected => KycStatus::Rejected,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = CoreError;

    /// Validate that a decision string is one of the accepted values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_VERIFIED => Ok(Decision::Verified),
            STATUS_REJECTED => Ok(Decision::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid decision '{other}'. Must be one of: {}",
                VALID_DECISIONS.join(", ")
            ))),
        }
    }
}

/* --------------------------------------------------------------------------
Submission
-------------------------------------------------------------------------- */

/// Submitter-provided text fields of a KYC submission.
///
/// Build with [`NewSubmission::new`], which trims every field, then call
/// [`NewSubmission::check`] before persisting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewSubmission {
    #[validate(length(min = 1, max = 512))]
    pub name: String,
    #[validate(length(min = 1, max = 512))]
    pub dob: String,
    #[validate(length(min = 1, max = 512))]
    pub address: String,
    #[serde(rename = "documentId")]
    #[validate(length(min = 1, max = 512))]
    pub document_id: String,
}

impl NewSubmission {
    pub fn new(
        name: impl AsRef<str>,
        dob: impl AsRef<str>,
        address: impl AsRef<str>,
        document_id: impl AsRef<str>,
    ) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            dob: dob.as_ref().trim().to_string(),
            address: address.as_ref().trim().to_string(),
            document_id: document_id.as_ref().trim().to_string(),
        }
    }

    /// Every field is mandatory and bounded by [`MAX_FIELD_LENGTH`].
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate().map_err(|e| CoreError::Validation(describe(&e)))
    }

    /// SHA-256 over the canonical (sorted-key) JSON of the four fields.
    pub fn submission_hash(&self) -> String {
        let canonical: BTreeMap<&str, &str> = BTreeMap::from([
            ("address", self.address.as_str()),
            ("documentId", self.document_id.as_str()),
            ("dob", self.dob.as_str()),
            ("name", self.name.as_str()),
        ]);
        // Serializing a map of strings cannot fail.
        let json = serde_json::to_string(&canonical).unwrap_or_default();
        hashing::sha256_hex(json.as_bytes())
    }
}

/// Field names as they appear on the wire.
fn wire_name(field: &str) -> &str {
    match field {
        "document_id" => "documentId",
        other => other,
    }
}

fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|k| wire_name(k.as_ref()).to_string())
        .collect();
    fields.sort_unstable();
    format!(
        "Fields must be non-empty and at most {MAX_FIELD_LENGTH} characters: {}",
        fields.join(", ")
    )
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
