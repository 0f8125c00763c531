use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::models::Todo;
use crate::database::repository::{validate_title, StoreError, TodoRepository};

pub struct PgTodoRepository {
    pool: PgPool,
}

impl PgTodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TodoRepository for PgTodoRepository {
    async fn create(&self, title: &str) -> Result<Todo, StoreError> {
        validate_title(title)?;

        let todo = sqlx::query_as::<_, Todo>(
            "INSERT INTO todos (title, created_at, updated_at)
             VALUES ($1, now(), now())
             RETURNING id, title, created_at, updated_at, deleted_at",
        )
        .bind(title)
        .fetch_one(&self.pool)
        .await?;

        Ok(todo)
    }

    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let todos = sqlx::query_as::<_, Todo>(
            "SELECT id, title, created_at, updated_at, deleted_at
             FROM todos
             WHERE deleted_at IS NULL",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(todos)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE todos
             SET deleted_at = now(), updated_at = now()
             WHERE id = $1
             AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
