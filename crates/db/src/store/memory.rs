use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use kyc_core::kyc::{Decision, KycStatus};
use kyc_core::ledger::{LedgerEvent, PendingEvent};
use kyc_core::types::KycId;
use tokio::sync::RwLock;

use super::{DecisionOutcome, KycStore, StoreResult};
use crate::models::kyc::{CreateKycRecord, KycRecord};

/// [`KycStore`] held entirely in process memory.
///
/// Records and ledger live behind one lock, so a decision and its ledger
/// event are applied together. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryKycStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    records: HashMap<KycId, KycRecord>,
    /// Submission order, for a stable pending listing.
    order: Vec<KycId>,
    ledger: Vec<LedgerEvent>,
}

impl MemoryKycStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a ledger event in place.
    ///
    /// Only useful for exercising tamper detection.
    #[cfg(any(test, feature = "test-util"))]
    pub async fn tamper_with_ledger(&self, sequence: i64, status: KycStatus) -> bool {
        let mut inner = self.inner.write().await;
        match inner.ledger.iter_mut().find(|e| e.sequence == sequence) {
            Some(event) => {
                event.status = status;
                true
            }
            None => false,
        }
    }
}

impl Inner {
    fn append(&mut self, pending: PendingEvent) {
        let event = pending.chain(self.ledger.last());
        self.ledger.push(event);
    }
}

#[async_trait]
impl KycStore for MemoryKycStore {
    async fn create(&self, input: CreateKycRecord) -> StoreResult<KycRecord> {
        let submission_hash = input.fields.submission_hash();
        let record = KycRecord {
            id: input.id,
            name: input.fields.name,
            dob: input.fields.dob,
            address: input.fields.address,
            document_id: input.fields.document_id,
            document_path: input.document_path,
            document_filename: input.document_filename,
            document_size: input.document_size,
            status: KycStatus::Pending,
            submission_hash: submission_hash.clone(),
            submitted_at: Utc::now().trunc_subsecs(6),
            decided_at: None,
        };

        let mut inner = self.inner.write().await;
        inner.records.insert(record.id, record.clone());
        inner.order.push(record.id);
        inner.append(PendingEvent::submitted(record.id, submission_hash));
        Ok(record)
    }

    async fn find_by_id(&self, id: KycId) -> StoreResult<Option<KycRecord>> {
        Ok(self.inner.read().await.records.get(&id).cloned())
    }

    async fn list_pending(&self) -> StoreResult<Vec<KycId>> {
        let inner = self.inner.read().await;
        Ok(inner
            .order
            .iter()
            .filter(|id| {
                inner
                    .records
                    .get(*id)
                    .is_some_and(|r| r.status == KycStatus::Pending)
            })
            .copied()
            .collect())
    }

    async fn decide(&self, id: KycId, decision: Decision) -> StoreResult<DecisionOutcome> {
        let mut inner = self.inner.write().await;
        let Some(record) = inner.records.get_mut(&id) else {
            return Ok(DecisionOutcome::NotFound);
        };
        let status = match record.status.apply(&id.to_string(), decision) {
            Ok(status) => status,
            Err(_) => return Ok(DecisionOutcome::AlreadyDecided(record.status)),
        };
        record.status = status;
        record.decided_at = Some(Utc::now().trunc_subsecs(6));
        let decided = record.clone();
        inner.append(PendingEvent::decided(id, status));
        Ok(DecisionOutcome::Decided(decided))
    }

    async fn history(&self, id: KycId) -> StoreResult<Vec<LedgerEvent>> {
        let inner = self.inner.read().await;
        Ok(inner
            .ledger
            .iter()
            .filter(|e| e.kyc_id == id)
            .cloned()
            .collect())
    }

    async fn ledger(&self) -> StoreResult<Vec<LedgerEvent>> {
        Ok(self.inner.read().await.ledger.clone())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
