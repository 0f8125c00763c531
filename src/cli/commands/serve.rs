use anyhow::Context;
use clap::Args;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::database::{DatabaseManager, MemoryTodoRepository, PgTodoRepository, TodoRepository};
use crate::server::{self, AppState, LivenessMarker, ShutdownOutcome};

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Listen port (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Keep todos in process memory instead of the database")]
    pub in_memory: bool,
}

pub async fn handle(args: ServeArgs, config: &AppConfig) -> anyhow::Result<()> {
    let mut config = config.clone();
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let marker = LivenessMarker::create(&config.server.liveness_file).with_context(|| {
        format!(
            "failed to create liveness marker {}",
            config.server.liveness_file.display()
        )
    })?;

    let (todos, pool) = open_store(&config, args.in_memory).await?;
    let state = AppState::new(&config, todos);
    if !state.authority.is_configured() {
        tracing::warn!("SIGN is empty: every protected request will be rejected");
    }

    let app = server::app(&config, state);
    let bind_addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Todo API listening on http://{}", listener.local_addr()?);

    let grace = Duration::from_secs(config.server.shutdown_grace_secs);
    let outcome = server::serve(listener, app, server::shutdown_signal(), grace).await?;

    // Abandoned requests may still be using the pool; it is released at exit
    match (outcome, pool) {
        (ShutdownOutcome::Drained, Some(pool)) => DatabaseManager::close(pool).await,
        (ShutdownOutcome::GraceElapsed, Some(_)) => {
            tracing::warn!("requests still in flight, leaving database pool open until exit")
        }
        (_, None) => {}
    }
    drop(marker);
    tracing::info!("server stopped");
    Ok(())
}

async fn open_store(
    config: &AppConfig,
    in_memory: bool,
) -> anyhow::Result<(Arc<dyn TodoRepository>, Option<PgPool>)> {
    if in_memory {
        tracing::info!("using in-memory todo store");
        let todos: Arc<dyn TodoRepository> = Arc::new(MemoryTodoRepository::new());
        return Ok((todos, None));
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect database")?;
    DatabaseManager::migrate(&pool)
        .await
        .context("failed to migrate database")?;
    DatabaseManager::health_check(&pool).await?;

    let todos: Arc<dyn TodoRepository> = Arc::new(PgTodoRepository::new(pool.clone()));
    Ok((todos, Some(pool)))
}
