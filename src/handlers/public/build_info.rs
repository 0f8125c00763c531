use axum::{extract::State, Json};

use crate::server::{AppState, BuildInfo};

/// GET /x - `{buildCommit, buildTime}`
pub async fn build_info_get(State(state): State<AppState>) -> Json<BuildInfo> {
    Json(state.build)
}
