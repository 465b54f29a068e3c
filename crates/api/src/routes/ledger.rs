use axum::routing::get;
use axum::Router;

use crate::handlers::ledger;
use crate::state::AppState;

/// ```text
/// GET    /ledger/verify            verify_ledger
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/ledger/verify", get(ledger::verify_ledger))
}
