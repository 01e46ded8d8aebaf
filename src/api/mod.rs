//! HTTP API server: the subscriber endpoint plus admission/CORS adapters.

pub mod admission;
pub mod cors;
pub mod routes;
pub mod server;
pub mod sse;

pub use server::*;
