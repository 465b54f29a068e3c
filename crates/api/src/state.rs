use std::sync::Arc;

use kyc_db::store::KycStore;

use crate::config::ServerConfig;
use crate::storage::DocumentStorage;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Record store (PostgreSQL or in-memory).
    pub store: Arc<dyn KycStore>,
    /// Where uploaded documents live.
    pub documents: Arc<DocumentStorage>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
