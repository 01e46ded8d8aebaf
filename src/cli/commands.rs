//! CLI command implementations.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::cli::{error, info, success, warn};
use crate::config;

/// Write a default `sse-hub.toml` configuration file.
pub async fn init(path: PathBuf) -> Result<()> {
    if path.exists() {
        warn(&format!("{} already exists", path.display()));
        return Ok(());
    }

    let content = config::loader::default_config_content();
    std::fs::write(&path, content)?;

    success(&format!("Created {}", path.display()));
    info("Edit the configuration file and run 'sse-hub serve' to start the hub");

    Ok(())
}

/// Start the HTTP server, applying CLI overrides on top of the loaded
/// config.
pub async fn serve(host: Option<String>, port: Option<u16>, config_path: Option<PathBuf>) -> Result<()> {
    let mut cfg = load_config(config_path.as_deref())?;

    if let Some(host) = host {
        cfg.server.host = host;
    }
    if let Some(port) = port {
        cfg.server.port = port;
    }

    info(&format!("Starting sse-hub at http://{}:{}", cfg.server.host, cfg.server.port));

    crate::api::run_server(cfg).await?;
    Ok(())
}

/// Confirm the configured port is free and the config file parses.
pub async fn doctor(config_path: Option<PathBuf>) -> Result<()> {
    let cfg = load_config(config_path.as_deref())?;
    success("Configuration parses");

    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    match tokio::net::TcpListener::bind(&addr).await {
        Ok(_listener) => {
            success(&format!("{addr} is free"));
            Ok(())
        }
        Err(err) => {
            error(&format!("{addr} is not available: {err}"));
            Err(err.into())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<crate::config::HubConfig> {
    match path {
        Some(path) => config::load_config_from_path(path).map_err(|e| anyhow::anyhow!("{e}")),
        None => config::load_config().map_err(|e| anyhow::anyhow!("{e}")),
    }
}
