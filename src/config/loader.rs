//! Configuration loading and environment variable interpolation.

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::Path;

use super::HubConfig;

const CONFIG_FILENAME: &str = "sse-hub.toml";

/// Load configuration from `sse-hub.toml`, searching upward from the
/// current directory.
pub fn load_config() -> Result<HubConfig> {
    let config_path = find_config_file()?;
    load_config_from_path(&config_path)
}

/// Load configuration from a specific path.
pub fn load_config_from_path(path: &Path) -> Result<HubConfig> {
    let content = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    let content = interpolate_env_vars(&content);
    let config: HubConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Write `config` to `path` as TOML, creating parent directories as needed.
pub fn save_config(config: &HubConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

fn find_config_file() -> Result<std::path::PathBuf> {
    let mut current = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(Error::ConfigNotFound);
        }
    }
}

/// Interpolate environment variables in the format `${VAR_NAME}` or
/// `${VAR_NAME:-default}`.
fn interpolate_env_vars(content: &str) -> String {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("env interpolation pattern is a valid regex");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Default configuration file content, written by `sse-hub init`.
pub fn default_config_content() -> &'static str {
    r#"# SSE Hub configuration

[server]
host = "0.0.0.0"
port = 8089

[sse]
mount_path = "/sse/broadcast"
heartbeat_interval_secs = 15
bypass_authentication = false
allowed_origins = []
allow_credentials = false
# channel_capacity_hint = 1000

[logging]
filter = "sse_hub=info"
"#
}
