use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::Todo;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error(transparent)]
    Backend(#[from] sqlx::Error),
}

/// Storage operations over the todo table
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Insert a todo with a fresh id and current timestamps
    async fn create(&self, title: &str) -> Result<Todo, StoreError>;

    /// All todos that have not been deleted. Order is not guaranteed.
    async fn list(&self) -> Result<Vec<Todo>, StoreError>;

    /// Mark a todo as deleted. Unknown or already deleted ids succeed.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

/// The title is the only required field
pub fn validate_title(title: &str) -> Result<(), StoreError> {
    if title.is_empty() {
        return Err(StoreError::Validation {
            field: "text",
            message: "This field is required".to_string(),
        });
    }
    Ok(())
}
