//! CLI interface for the SSE hub.

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sse-hub")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Server-Sent Events broadcast hub", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the SSE hub's HTTP server
    Serve {
        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the configuration file
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,
    },

    /// Write a default sse-hub.toml configuration file
    Init {
        /// Where to write the configuration file
        #[arg(short, long, default_value = "sse-hub.toml")]
        path: std::path::PathBuf,
    },

    /// Check that the configured port is free and the config file parses
    Doctor {
        /// Path to the configuration file
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,
    },
}
