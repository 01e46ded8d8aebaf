use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod auth;
mod broadcast;
mod channel;
mod cli;
mod config;
mod error;
mod registry;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sse_hub=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port, config } => cli::commands::serve(host, port, config).await,
        Commands::Init { path } => cli::commands::init(path).await,
        Commands::Doctor { config } => cli::commands::doctor(config).await,
    }
}
