//! Response bodies of the KYC API, as the client reads them.

use kyc_core::kyc::KycStatus;
use kyc_core::ledger::LedgerEvent;
use kyc_core::types::Timestamp;
use serde::Deserialize;

/// A record as returned by `GET /kyc/{id}`, status included.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KycDetails {
    #[serde(rename = "kycId")]
    pub kyc_id: String,
    pub name: String,
    pub dob: String,
    pub address: String,
    #[serde(rename = "documentId")]
    pub document_id: String,
    pub document_path: String,
    /// Path of the document download, relative to the API base URL.
    pub document_url: String,
    #[serde(default)]
    pub document_filename: Option<String>,
    pub status: KycStatus,
    pub submission_hash: String,
    pub submitted_at: Timestamp,
    pub decided_at: Option<Timestamp>,
}

/// A file picked for upload with a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitResponse {
    #[serde(rename = "kycId")]
    pub kyc_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PendingResponse {
    pub pending: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerifyResponse {
    pub status: KycStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    pub status: KycStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryResponse {
    pub events: Vec<LedgerEvent>,
}
