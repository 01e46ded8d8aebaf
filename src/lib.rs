//! SSE Hub — a Server-Sent Events broadcast hub with channel-based pub/sub.
//!
//! This is the library interface, allowing programmatic access to the
//! channel registry and broadcast service without going through the CLI.

pub mod api;
pub mod auth;
pub mod broadcast;
pub mod channel;
pub mod cli;
pub mod config;
pub mod error;
pub mod registry;

pub use broadcast::BroadcastService;
pub use config::HubConfig;
pub use error::Error;
pub use registry::ChannelRegistry;
