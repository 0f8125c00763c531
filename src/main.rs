use clap::Parser;
use tracing_subscriber::EnvFilter;

use todo_api::cli::{self, Cli};
use todo_api::config::{self, EnvSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load local.env / .env before anything reads the environment
    let env_file = config::load_env_files();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("todo_api=info,tower_http=info")),
        )
        .init();

    if env_file.local_env_missing() {
        tracing::info!("local.env not found");
    }
    match &env_file {
        EnvSource::Local(path) | EnvSource::Fallback(path) => {
            tracing::info!("loaded environment from {}", path.display())
        }
        EnvSource::Process => tracing::info!("no env file found, using process environment"),
    }

    let config = config::config();
    tracing::info!("Starting Todo API in {:?} mode", config.environment);

    cli::run(Cli::parse(), config).await
}
