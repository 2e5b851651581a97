use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use crate::state::AppState;

/// Readiness: 200 once the database answers a ping, 503 otherwise.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    match state.db.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            warn!(error = %e, "database ping failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
