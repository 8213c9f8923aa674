use axum::http::StatusCode;

/// Handler for `GET /healthz` (liveness).
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /readyz` (readiness). Services with external dependencies
/// can mount their own handler instead; the default reports the process is up.
pub async fn readyz() -> StatusCode {
    StatusCode::OK
}
