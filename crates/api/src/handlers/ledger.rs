//! Handlers for the lifecycle ledger as a whole.

use axum::extract::State;
use axum::Json;
use kyc_core::ledger::{verify_chain, ChainReport};

use crate::error::AppResult;
use crate::state::AppState;

/// GET /ledger/verify
///
/// Walk the whole chain and report the first event whose hash or linkage
/// does not check out.
pub async fn verify_ledger(State(state): State<AppState>) -> AppResult<Json<ChainReport>> {
    let events = state.store.ledger().await?;
    let report = verify_chain(&events);
    if !report.valid {
        tracing::error!(
            first_invalid_sequence = ?report.first_invalid_sequence,
            length = report.length,
            "Ledger integrity check failed"
        );
    }
    Ok(Json(report))
}
