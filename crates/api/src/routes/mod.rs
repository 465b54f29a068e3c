pub mod health;
pub mod kyc;
pub mod ledger;

use axum::Router;

use crate::state::AppState;

/// Build the KYC route tree.
///
/// Route hierarchy:
///
/// ```text
/// /kyc/submit                 submit (POST, multipart)
/// /kyc/pending                pending queue (GET)
/// /kyc/{id}                   record details with status (GET)
/// /kyc/{id}/document          identity document (GET, access-controlled)
/// /kyc/{id}/history           ledger events for the record (GET)
/// /kyc/verify/{id}            decide (POST)
/// /kyc/status/{id}            status only (GET)
///
/// /ledger/verify              chain integrity report (GET)
/// ```
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(kyc::router(max_upload_bytes))
        .merge(ledger::router())
}
