//! Error types for the SSE hub

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid channel name '{0}'")]
    InvalidChannelName(String),

    #[error("payload too large: {0} bytes (max {})", crate::channel::MAX_PAYLOAD_BYTES)]
    PayloadTooLarge(usize),

    #[error("admission denied: {0}")]
    AdmissionDenied(String),

    #[error("channel registry lookup failed: {0}")]
    RegistryLookupFailure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file not found. Run 'sse-hub init' first.")]
    ConfigNotFound,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Validation and lookup failures that can surface directly from a handler
/// returning `Result<_, Error>` (the `/api/*` routes). The streaming
/// subscriber endpoint never uses this impl — it builds its own responses by
/// hand so it can match the exact response bodies the wire protocol expects.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::InvalidChannelName(_) | Error::PayloadTooLarge(_) => {
                (StatusCode::BAD_REQUEST, format!("{self}\n")).into_response()
            }
            Error::RegistryLookupFailure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error\n").into_response()
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, format!("{self}\n")).into_response(),
        }
    }
}
