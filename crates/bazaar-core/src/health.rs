use axum::http::StatusCode;

/// Handler for `GET /healthz`: the process is up and serving requests.
///
/// Readiness depends on the database and lives with the service that owns the pool.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
