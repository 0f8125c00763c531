use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A todo row. Deleting sets `deleted_at`; the row itself is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "text")]
    pub title: String,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "DeletedAt")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Todo {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Request body for `POST /todo`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTodo {
    #[serde(default)]
    pub text: Option<String>,
}
