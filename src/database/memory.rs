use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::models::Todo;
use crate::database::repository::{validate_title, StoreError, TodoRepository};

/// Process-local todo store with the same semantics as the Postgres one
#[derive(Debug, Default)]
pub struct MemoryTodoRepository {
    inner: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    rows: BTreeMap<i64, Todo>,
}

impl MemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows including soft-deleted ones
    pub async fn stored_count(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn get_including_deleted(&self, id: i64) -> Option<Todo> {
        self.inner.read().await.rows.get(&id).cloned()
    }
}

#[async_trait]
impl TodoRepository for MemoryTodoRepository {
    async fn create(&self, title: &str) -> Result<Todo, StoreError> {
        validate_title(title)?;

        let mut state = self.inner.write().await;
        state.last_id += 1;
        let now = Utc::now();
        let todo = Todo {
            id: state.last_id,
            title: title.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.rows.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let state = self.inner.read().await;
        Ok(state
            .rows
            .values()
            .filter(|todo| !todo.is_deleted())
            .cloned()
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut state = self.inner.write().await;
        if let Some(todo) = state.rows.get_mut(&id) {
            if todo.deleted_at.is_none() {
                let now = Utc::now();
                todo.deleted_at = Some(now);
                todo.updated_at = now;
            }
        }
        Ok(())
    }
}
