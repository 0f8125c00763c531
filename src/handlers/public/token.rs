// handlers/public/token.rs - GET /tokenz
//
// Issues an HS256 token for the configured audience, signed with `SIGN`.
use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::server::AppState;

pub async fn token_get(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let token = state.authority.issue().map_err(|e| {
        tracing::error!("token issuance failed: {}", e);
        ApiError::internal_server_error("Unable to issue token")
    })?;

    tracing::info!(audience = state.authority.audience(), "issued access token");
    Ok(Json(json!({ "token": token })))
}
