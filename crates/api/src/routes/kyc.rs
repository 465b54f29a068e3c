//! Route definitions for the KYC workflow.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::kyc;
use crate::state::AppState;

/// KYC routes.
///
/// ```text
/// POST   /kyc/submit               submit_kyc
/// GET    /kyc/pending              list_pending
/// GET    /kyc/{id}                 get_kyc_details
/// GET    /kyc/{id}/document        get_document
/// GET    /kyc/{id}/history         get_history
/// POST   /kyc/verify/{id}          verify_kyc
/// GET    /kyc/status/{id}          get_status
/// ```
///
/// Only the submission route accepts bodies up to `max_upload_bytes`.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/kyc/submit",
            post(kyc::submit_kyc).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/kyc/pending", get(kyc::list_pending))
        .route("/kyc/verify/{id}", post(kyc::verify_kyc))
        .route("/kyc/status/{id}", get(kyc::get_status))
        .route("/kyc/{id}", get(kyc::get_kyc_details))
        .route("/kyc/{id}/document", get(kyc::get_document))
        .route("/kyc/{id}/history", get(kyc::get_history))
}
