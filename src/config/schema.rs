//! Configuration schema for the SSE hub.

use serde::{Deserialize, Serialize};

/// Root configuration loaded from `sse-hub.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HubConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub sse: SseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8089
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// SSE-specific behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SseConfig {
    #[serde(default = "default_mount_path")]
    pub mount_path: String,

    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,

    #[serde(default)]
    pub bypass_authentication: bool,

    #[serde(default)]
    pub allowed_origins: Vec<String>,

    #[serde(default)]
    pub allow_credentials: bool,

    /// Advisory-only: logged when a channel's listener count crosses this
    /// value. Never rejects a subscriber.
    #[serde(default)]
    pub channel_capacity_hint: Option<usize>,
}

fn default_mount_path() -> String {
    "/sse/broadcast".to_string()
}

fn default_heartbeat_interval_secs() -> u64 {
    15
}

impl Default for SseConfig {
    fn default() -> Self {
        Self {
            mount_path: default_mount_path(),
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
            bypass_authentication: false,
            allowed_origins: Vec::new(),
            allow_credentials: false,
            channel_capacity_hint: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_filter")]
    pub filter: String,
}

fn default_logging_filter() -> String {
    "sse_hub=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_logging_filter(),
        }
    }
}
