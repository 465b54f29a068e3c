//! Repository for the `kyc_records` table.

use kyc_core::kyc::{KycStatus, STATUS_PENDING};
use kyc_core::types::KycId;
use sqlx::PgConnection;
use sqlx::PgPool;

use crate::models::kyc::{CreateKycRecord, KycRecordRow};

/// Column list for kyc_records queries.
const COLUMNS: &str = "id, name, dob, address, document_id, document_path, \
    document_filename, document_size, status, submission_hash, submitted_at, decided_at";

/// Provides CRUD operations for KYC records.
pub struct KycRepo;

impl KycRepo {
    /// Insert a new record in `PENDING`, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateKycRecord,
        submission_hash: &str,
    ) -> Result<KycRecordRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO kyc_records
                (id, name, dob, address, document_id, document_path,
                 document_filename, document_size, status, submission_hash)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, KycRecordRow>(&query)
            .bind(input.id)
            .bind(&input.fields.name)
            .bind(&input.fields.dob)
            .bind(&input.fields.address)
            .bind(&input.fields.document_id)
            .bind(&input.document_path)
            .bind(&input.document_filename)
            .bind(input.document_size)
            .bind(STATUS_PENDING)
            .bind(submission_hash)
            .fetch_one(conn)
            .await
    }

    /// Find a record by its ID.
    pub async fn find_by_id(pool: &PgPool, id: KycId) -> Result<Option<KycRecordRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM kyc_records WHERE id = $1");
        sqlx::query_as::<_, KycRecordRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// IDs of all records still awaiting a decision, oldest submission first.
    pub async fn list_pending_ids(pool: &PgPool) -> Result<Vec<KycId>, sqlx::Error> {
        sqlx::query_scalar::<_, KycId>(
            "SELECT id FROM kyc_records
             WHERE status = $1
             ORDER BY submitted_at ASC, id ASC",
        )
        .bind(STATUS_PENDING)
        .fetch_all(pool)
        .await
    }

    /// Move a record out of `PENDING`.
    ///
    /// The update only matches while the record is still `PENDING`, so of two
    /// concurrent decisions at most one returns a row.
    pub async fn decide_if_pending(
        conn: &mut PgConnection,
        id: KycId,
        status: KycStatus,
    ) -> Result<Option<KycRecordRow>, sqlx::Error> {
        let query = format!(
            "UPDATE kyc_records
             SET status = $2, decided_at = NOW()
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, KycRecordRow>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(STATUS_PENDING)
            .fetch_optional(conn)
            .await
    }

    /// Current status string of a record, if it exists.
    pub async fn find_status(
        conn: &mut PgConnection,
        id: KycId,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT status FROM kyc_records WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }
}
