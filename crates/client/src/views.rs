//! View state for the four client screens.
//!
//! Each view is a plain state machine: the caller starts a request through
//! the view, performs it with [`crate::api::KycClient`], then feeds the result
//! back. Views never perform I/O themselves.

use kyc_core::document;
use kyc_core::error::CoreError;
use kyc_core::kyc::{Decision, KycStatus, NewSubmission};

use crate::error::ClientError;
use crate::models::{DocumentUpload, KycDetails};

pub const SUBMISSION_FAILED: &str = "Submission failed";
pub const VERIFICATION_FAILED: &str = "Verification failed";
pub const NOT_FOUND_MESSAGE: &str = "KYC not found";

/* --------------------------------------------------------------------------
Submission form
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, Default)]
pub struct SubmitForm {
    pub name: String,
    pub dob: String,
    pub address: String,
    pub document_id: String,
    pub document: Option<DocumentUpload>,
    pub submitting: bool,
    pub message: Option<String>,
}

impl SubmitForm {
    /// All four fields and a non-empty document are required.
    pub fn validate(&self) -> Result<NewSubmission, CoreError> {
        let fields = NewSubmission::new(&self.name, &self.dob, &self.address, &self.document_id);
        fields.check()?;
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| CoreError::Validation("A document file is required".to_string()))?;
        document::validate_document(&document.bytes)?;
        Ok(fields)
    }

    /// Start a submission. Returns `None` while one is in flight or when the
    /// form is incomplete, in which case the problem becomes the message.
    pub fn begin_submit(&mut self) -> Option<(NewSubmission, DocumentUpload)> {
        if self.submitting {
            return None;
        }
        match self.validate() {
            Ok(fields) => {
                let document = self.document.clone()?;
                self.submitting = true;
                self.message = None;
                Some((fields, document))
            }
            Err(e) => {
                self.message = Some(e.to_string());
                None
            }
        }
    }

    pub fn on_success(&mut self, kyc_id: &str) {
        self.submitting = false;
        self.message = Some(format!("Submitted! KYC ID: {kyc_id}"));
    }

    pub fn on_failure(&mut self, error: &ClientError) {
        tracing::warn!(error = %error, "KYC submission failed");
        self.submitting = false;
        self.message = Some(SUBMISSION_FAILED.to_string());
    }
}

/* --------------------------------------------------------------------------
Pending queue
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingQueueView {
    Loading,
    Loaded(Vec<String>),
    /// The queue was read successfully and holds nothing.
    Empty,
    Failed(String),
}

impl PendingQueueView {
    pub fn from_result(result: Result<Vec<String>, ClientError>) -> Self {
        match result {
            Ok(ids) if ids.is_empty() => PendingQueueView::Empty,
            Ok(ids) => PendingQueueView::Loaded(ids),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load pending queue");
                PendingQueueView::Failed(e.to_string())
            }
        }
    }

    pub fn ids(&self) -> &[String] {
        match self {
            PendingQueueView::Loaded(ids) => ids,
            _ => &[],
        }
    }
}

/* --------------------------------------------------------------------------
Record detail
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRecord {
    pub record: KycDetails,
    pub status: KycStatus,
    /// A decision request is in flight.
    pub submitting: bool,
    /// Set once the server refused a decision, even if the current status
    /// could not be learned.
    pub locked: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    Loading,
    NotFound,
    Failed(String),
    Loaded(LoadedRecord),
}

impl DetailView {
    pub fn from_result(result: Result<KycDetails, ClientError>) -> Self {
        match result {
            Ok(record) => DetailView::Loaded(LoadedRecord {
                status: record.status,
                record,
                submitting: false,
                locked: false,
                message: None,
            }),
            Err(ClientError::NotFound(_)) => DetailView::NotFound,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load KYC details");
                DetailView::Failed(e.to_string())
            }
        }
    }

    pub fn status(&self) -> Option<KycStatus> {
        match self {
            DetailView::Loaded(loaded) => Some(loaded.status),
            _ => None,
        }
    }

    /// Text to show in place of, or under, the record.
    pub fn message(&self) -> Option<&str> {
        match self {
            DetailView::NotFound => Some(NOT_FOUND_MESSAGE),
            DetailView::Failed(msg) => Some(msg.as_str()),
            DetailView::Loaded(loaded) => loaded.message.as_deref(),
            DetailView::Loading => None,
        }
    }

    /// Decision controls are enabled only for a loaded, pending record with
    /// no request in flight.
    pub fn can_decide(&self) -> bool {
        match self {
            DetailView::Loaded(loaded) => {
                loaded.status == KycStatus::Pending && !loaded.submitting && !loaded.locked
            }
            _ => false,
        }
    }

    /// Mark a decision as in flight. Returns the decision to send, or `None`
    /// when the controls are disabled.
    pub fn begin_decision(&mut self, decision: Decision) -> Option<Decision> {
        if !self.can_decide() {
            return None;
        }
        if let DetailView::Loaded(loaded) = self {
            loaded.submitting = true;
            loaded.message = None;
        }
        Some(decision)
    }

    /// Apply the outcome of a decision request started with
    /// [`DetailView::begin_decision`].
    pub fn finish_decision(&mut self, decision: Decision, result: Result<KycStatus, ClientError>) {
        let DetailView::Loaded(loaded) = self else {
            return;
        };
        loaded.submitting = false;

        match result {
            Ok(_) => {
                let status = KycStatus::from(decision);
                loaded.status = status;
                loaded.message = Some(format!("KYC {status}"));
            }
            Err(ClientError::AlreadyDecided { current, .. }) => {
                loaded.locked = true;
                loaded.message = Some(match current {
                    Some(status) => {
                        loaded.status = status;
                        format!("KYC already {status}")
                    }
                    None => "KYC already decided".to_string(),
                });
            }
            Err(e) => {
                tracing::warn!(decision = %decision, error = %e, "KYC decision failed");
                loaded.message = Some(VERIFICATION_FAILED.to_string());
            }
        }
    }

    /// Fold in a status read separately from the details.
    ///
    /// A terminal status never reverts, so a stale `PENDING` answer is
    /// ignored and a terminal answer replaces a stale `PENDING`.
    pub fn reconcile_status(&mut self, observed: KycStatus) {
        let DetailView::Loaded(loaded) = self else {
            return;
        };
        if loaded.status == observed {
            return;
        }
        if loaded.status.is_terminal() {
            tracing::warn!(
                kyc_id = %loaded.record.kyc_id,
                shown = %loaded.status,
                observed = %observed,
                "Status check disagrees with a decided record"
            );
            return;
        }
        loaded.status = observed;
    }
}

/* --------------------------------------------------------------------------
Status check
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusCheckView {
    #[default]
    Idle,
    Checking,
    Found(KycStatus),
    NotFound,
    Failed(String),
}

impl StatusCheckView {
    /// Start a check for the typed id. Blank input leaves the view idle.
    pub fn begin(&mut self, raw_id: &str) -> Option<String> {
        let id = raw_id.trim();
        if id.is_empty() || *self == StatusCheckView::Checking {
            return None;
        }
        *self = StatusCheckView::Checking;
        Some(id.to_string())
    }

    pub fn finish(&mut self, result: Result<KycStatus, ClientError>) {
        *self = match result {
            Ok(status) => StatusCheckView::Found(status),
            Err(ClientError::NotFound(_)) => StatusCheckView::NotFound,
            Err(e) => StatusCheckView::Failed(e.to_string()),
        };
    }

    pub fn label(&self) -> Option<String> {
        match self {
            StatusCheckView::Idle => None,
            StatusCheckView::Checking => Some("Checking...".to_string()),
            StatusCheckView::Found(status) => Some(status.to_string()),
            StatusCheckView::NotFound => Some(NOT_FOUND_MESSAGE.to_string()),
            StatusCheckView::Failed(msg) => Some(msg.clone()),
        }
    }
}
