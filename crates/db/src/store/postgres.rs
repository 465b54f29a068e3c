use async_trait::async_trait;
use kyc_core::kyc::{Decision, KycStatus};
use kyc_core::ledger::{LedgerEvent, PendingEvent};
use kyc_core::types::KycId;

use super::{DecisionOutcome, KycStore, StoreError, StoreResult};
use crate::models::kyc::{CreateKycRecord, KycRecord};
use crate::repositories::{KycRepo, LedgerRepo};
use crate::DbPool;

/// [`KycStore`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgKycStore {
    pool: DbPool,
}

impl PgKycStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl KycStore for PgKycStore {
    async fn create(&self, input: CreateKycRecord) -> StoreResult<KycRecord> {
        let submission_hash = input.fields.submission_hash();

        let mut tx = self.pool.begin().await?;
        let row = KycRepo::create(&mut tx, &input, &submission_hash).await?;
        LedgerRepo::append(&mut tx, PendingEvent::submitted(row.id, submission_hash)).await?;
        tx.commit().await?;

        KycRecord::try_from(row)
    }

    async fn find_by_id(&self, id: KycId) -> StoreResult<Option<KycRecord>> {
        KycRepo::find_by_id(&self.pool, id)
            .await?
            .map(KycRecord::try_from)
            .transpose()
    }

    async fn list_pending(&self) -> StoreResult<Vec<KycId>> {
        Ok(KycRepo::list_pending_ids(&self.pool).await?)
    }

    async fn decide(&self, id: KycId, decision: Decision) -> StoreResult<DecisionOutcome> {
        let status = KycStatus::from(decision);

        let mut tx = self.pool.begin().await?;
        let Some(row) = KycRepo::decide_if_pending(&mut tx, id, status).await? else {
            let current = KycRepo::find_status(&mut tx, id).await?;
            tx.rollback().await?;
            return match current {
                None => Ok(DecisionOutcome::NotFound),
                Some(raw) => raw
                    .parse::<KycStatus>()
                    .map(DecisionOutcome::AlreadyDecided)
                    .map_err(|_| StoreError::Corrupt(format!("record {id} has status '{raw}'"))),
            };
        };
        LedgerRepo::append(&mut tx, PendingEvent::decided(id, status)).await?;
        tx.commit().await?;

        tracing::debug!(kyc_id = %id, status = %status, "Decision committed");
        Ok(DecisionOutcome::Decided(KycRecord::try_from(row)?))
    }

    async fn history(&self, id: KycId) -> StoreResult<Vec<LedgerEvent>> {
        LedgerRepo::list_for_kyc(&self.pool, id)
            .await?
            .into_iter()
            .map(LedgerEvent::try_from)
            .collect()
    }

    async fn ledger(&self) -> StoreResult<Vec<LedgerEvent>> {
        LedgerRepo::list_all(&self.pool)
            .await?
            .into_iter()
            .map(LedgerEvent::try_from)
            .collect()
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
