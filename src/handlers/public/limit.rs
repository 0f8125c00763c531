// handlers/public/limit.rs - GET /limit
//
// Only reached when the RateLimit interceptor let the request through.
use axum::Json;
use serde_json::{json, Value};

pub async fn limit_get() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}
