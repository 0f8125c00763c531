// Runs against a real database only when TEST_DATABASE_URL is set.
use anyhow::Result;

use todo_api::config::DatabaseConfig;
use todo_api::database::{DatabaseManager, PgTodoRepository, StoreError, TodoRepository};

async fn repository() -> Result<Option<PgTodoRepository>> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping postgres test");
        return Ok(None);
    };

    let config = DatabaseConfig {
        url: Some(url),
        max_connections: 2,
        connection_timeout: 5,
    };
    let pool = DatabaseManager::connect(&config).await?;
    DatabaseManager::migrate(&pool).await?;
    Ok(Some(PgTodoRepository::new(pool)))
}

#[tokio::test]
async fn postgres_create_list_soft_delete() -> Result<()> {
    let Some(repo) = repository().await? else {
        return Ok(());
    };

    let title = format!("pg-{}", uuid::Uuid::new_v4());
    let todo = repo.create(&title).await?;
    assert_eq!(todo.title, title);
    assert!(todo.deleted_at.is_none());

    let listed = repo.list().await?;
    assert!(listed.iter().any(|t| t.id == todo.id));

    repo.delete(todo.id).await?;
    repo.delete(todo.id).await?;
    let listed = repo.list().await?;
    assert!(!listed.iter().any(|t| t.id == todo.id));

    let row: (Option<chrono::DateTime<chrono::Utc>>,) =
        sqlx::query_as("SELECT deleted_at FROM todos WHERE id = $1")
            .bind(todo.id)
            .fetch_one(repo.pool())
            .await?;
    assert!(row.0.is_some());
    Ok(())
}

#[tokio::test]
async fn postgres_rejects_empty_title() -> Result<()> {
    let Some(repo) = repository().await? else {
        return Ok(());
    };

    assert!(matches!(
        repo.create("").await,
        Err(StoreError::Validation { field: "text", .. })
    ));
    Ok(())
}
