//! Ledger event row model.

use kyc_core::kyc::KycStatus;
use kyc_core::ledger::LedgerEvent;
use kyc_core::types::{KycId, Timestamp};
use sqlx::FromRow;

use crate::store::StoreError;

/// A row from the `kyc_ledger` table.
#[derive(Debug, Clone, FromRow)]
pub struct LedgerEventRow {
    pub sequence: i64,
    pub kyc_id: KycId,
    pub event_type: String,
    pub status: String,
    pub submission_hash: Option<String>,
    pub recorded_at: Timestamp,
    pub prev_hash: Option<String>,
    pub hash: String,
}

impl TryFrom<LedgerEventRow> for LedgerEvent {
    type Error = StoreError;

    fn try_from(row: LedgerEventRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<KycStatus>().map_err(|_| {
            StoreError::Corrupt(format!(
                "ledger event {} has status '{}'",
                row.sequence, row.status
            ))
        })?;
        Ok(LedgerEvent {
            sequence: row.sequence,
            kyc_id: row.kyc_id,
            event_type: row.event_type,
            status,
            submission_hash: row.submission_hash,
            recorded_at: row.recorded_at,
            prev_hash: row.prev_hash,
            hash: row.hash,
        })
    }
}
