pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "todo-api")]
#[command(about = "Todo API - authenticated todo CRUD over HTTP")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Print a signed access token using SIGN")]
    Token(commands::token::TokenArgs),
}

pub async fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::handle(args, config).await,
        Some(Commands::Token(args)) => commands::token::handle(args, config),
        None => commands::serve::handle(Default::default(), config).await,
    }
}
