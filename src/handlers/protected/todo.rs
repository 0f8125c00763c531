// handlers/protected/todo.rs - /todo collection and /todo/:id
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};

use crate::database::{NewTodo, StoreError, Todo};
use crate::error::ApiError;
use crate::middleware::Caller;
use crate::server::AppState;

/// POST /todo - create a todo from `{"text": "..."}`
///
/// The body is parsed as JSON regardless of Content-Type. A store failure is
/// reported as 400, not 500.
pub async fn todo_post(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let payload: NewTodo =
        serde_json::from_slice(&body).map_err(|e| ApiError::invalid_json(e.to_string()))?;
    let title = payload.text.unwrap_or_default();

    let todo = state.todos.create(&title).await.map_err(|e| match e {
        StoreError::Backend(err) => {
            tracing::error!("Failed to create todo: {}", err);
            ApiError::bad_request("Failed to create todo")
        }
        other => other.into(),
    })?;

    tracing::debug!(id = todo.id, audience = ?caller.audience, "created todo");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "ID": todo.id,
            "text": todo.title,
        })),
    ))
}

/// GET /todo - every todo that has not been deleted
pub async fn todo_list(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state.todos.list().await?;
    Ok(Json(todos))
}

/// DELETE /todo/:id - soft delete; unknown ids still report success
pub async fn todo_delete(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id: i64 = id
        .parse()
        .map_err(|_| ApiError::bad_request(format!("invalid todo id: {:?}", id)))?;

    state.todos.delete(id).await?;

    tracing::debug!(id, audience = ?caller.audience, "deleted todo");
    Ok(Json(json!({
        "ID": id,
        "status": "success",
    })))
}
