//! KYC record models.

use kyc_core::kyc::{KycStatus, NewSubmission};
use kyc_core::types::{KycId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::store::StoreError;

/// A row from the `kyc_records` table.
#[derive(Debug, Clone, FromRow)]
pub struct KycRecordRow {
    pub id: KycId,
    pub name: String,
    pub dob: String,
    pub address: String,
    pub document_id: String,
    pub document_path: String,
    pub document_filename: Option<String>,
    pub document_size: i64,
    pub status: String,
    pub submission_hash: String,
    pub submitted_at: Timestamp,
    pub decided_at: Option<Timestamp>,
}

/// A KYC record with its status parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KycRecord {
    pub id: KycId,
    pub name: String,
    pub dob: String,
    pub address: String,
    pub document_id: String,
    pub document_path: String,
    pub document_filename: Option<String>,
    pub document_size: i64,
    pub status: KycStatus,
    pub submission_hash: String,
    pub submitted_at: Timestamp,
    pub decided_at: Option<Timestamp>,
}

impl TryFrom<KycRecordRow> for KycRecord {
    type Error = StoreError;

    fn try_from(row: KycRecordRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<KycStatus>().map_err(|_| {
            StoreError::Corrupt(format!("record {} has status '{}'", row.id, row.status))
        })?;
        Ok(Self {
            id: row.id,
            name: row.name,
            dob: row.dob,
            address: row.address,
            document_id: row.document_id,
            document_path: row.document_path,
            document_filename: row.document_filename,
            document_size: row.document_size,
            status,
            submission_hash: row.submission_hash,
            submitted_at: row.submitted_at,
            decided_at: row.decided_at,
        })
    }
}

/// DTO for inserting a freshly submitted record.
///
/// `fields` must already have passed [`NewSubmission::check`].
#[derive(Debug, Clone)]
pub struct CreateKycRecord {
    pub id: KycId,
    pub fields: NewSubmission,
    pub document_path: String,
    pub document_filename: Option<String>,
    pub document_size: i64,
}
