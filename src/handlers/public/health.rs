use axum::http::StatusCode;

/// GET /health - readiness probe, empty 200
pub async fn health_get() -> StatusCode {
    StatusCode::OK
}
