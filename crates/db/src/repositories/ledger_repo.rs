//! Repository for the append-only `kyc_ledger` table.

use kyc_core::ledger::{LedgerEvent, PendingEvent};
use kyc_core::types::KycId;
use sqlx::PgConnection;
use sqlx::PgPool;

use crate::models::ledger::LedgerEventRow;
use crate::store::StoreError;

/// Column list for kyc_ledger queries.
const COLUMNS: &str =
    "sequence, kyc_id, event_type, status, submission_hash, recorded_at, prev_hash, hash";

/// Advisory lock key serializing appends to the chain tail.
const LEDGER_LOCK_KEY: i64 = 0x4b59_435f_4c45_4447;

/// Provides append and read operations for the ledger.
pub struct LedgerRepo;

impl LedgerRepo {
    /// Append an event after the current tail.
    ///
    /// Must run inside a transaction: the advisory lock is transaction-scoped
    /// and is what keeps two appends from chaining onto the same tail.
    pub async fn append(
        conn: &mut PgConnection,
        pending: PendingEvent,
    ) -> Result<LedgerEvent, StoreError> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(LEDGER_LOCK_KEY)
            .execute(&mut *conn)
            .await?;

        let tail_query = format!("SELECT {COLUMNS} FROM kyc_ledger ORDER BY sequence DESC LIMIT 1");
        let tail = sqlx::query_as::<_, LedgerEventRow>(&tail_query)
            .fetch_optional(&mut *conn)
            .await?
            .map(LedgerEvent::try_from)
            .transpose()?;

        let event = pending.chain(tail.as_ref());

        sqlx::query(
            "INSERT INTO kyc_ledger
                (sequence, kyc_id, event_type, status, submission_hash,
                 recorded_at, prev_hash, hash)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(event.sequence)
        .bind(event.kyc_id)
        .bind(&event.event_type)
        .bind(event.status.as_str())
        .bind(&event.submission_hash)
        .bind(event.recorded_at)
        .bind(&event.prev_hash)
        .bind(&event.hash)
        .execute(&mut *conn)
        .await?;

        Ok(event)
    }

    /// All events for one record, in sequence order.
    pub async fn list_for_kyc(
        pool: &PgPool,
        kyc_id: KycId,
    ) -> Result<Vec<LedgerEventRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM kyc_ledger WHERE kyc_id = $1 ORDER BY sequence ASC");
        sqlx::query_as::<_, LedgerEventRow>(&query)
            .bind(kyc_id)
            .fetch_all(pool)
            .await
    }

    /// The whole chain, in sequence order.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<LedgerEventRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM kyc_ledger ORDER BY sequence ASC");
        sqlx::query_as::<_, LedgerEventRow>(&query)
            .fetch_all(pool)
            .await
    }
}
