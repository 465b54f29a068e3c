//! The record store abstraction shared by the HTTP handlers.

use async_trait::async_trait;
use kyc_core::kyc::{Decision, KycStatus};
use kyc_core::ledger::LedgerEvent;
use kyc_core::types::KycId;

use crate::models::kyc::{CreateKycRecord, KycRecord};

mod memory;
mod postgres;

pub use memory::MemoryKycStore;
pub use postgres::PgKycStore;

/// Errors raised by a store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A persisted value could not be interpreted.
    #[error("Corrupt data: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of a decision attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// The record was `PENDING` and now carries the decided status.
    Decided(KycRecord),
    NotFound,
    /// The record had already left `PENDING`; carries its current status.
    AlreadyDecided(KycStatus),
}

/// Owner of KYC records and the lifecycle ledger.
///
/// Implementations are the sole arbiter of the "decide only if `PENDING`"
/// rule: `decide` must check and transition atomically, and append the
/// ledger event in the same unit of work.
#[async_trait]
pub trait KycStore: Send + Sync {
    /// Persist a new `PENDING` record and append its `KYC_SUBMITTED` event.
    async fn create(&self, input: CreateKycRecord) -> StoreResult<KycRecord>;

    async fn find_by_id(&self, id: KycId) -> StoreResult<Option<KycRecord>>;

    /// IDs of records whose status is `PENDING`.
    async fn list_pending(&self) -> StoreResult<Vec<KycId>>;

    async fn decide(&self, id: KycId, decision: Decision) -> StoreResult<DecisionOutcome>;

    /// Ledger events for one record, in sequence order.
    async fn history(&self, id: KycId) -> StoreResult<Vec<LedgerEvent>>;

    /// The full ledger, in sequence order.
    async fn ledger(&self) -> StoreResult<Vec<LedgerEvent>>;

    async fn health_check(&self) -> StoreResult<()>;
}
