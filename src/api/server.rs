//! HTTP server bootstrap: wires the registry, broadcast service, admission
//! and CORS adapters into an axum router.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;

use crate::api::admission::{AdmissionAdapter, BypassAdmission, SessionAdmission};
use crate::api::cors::{AllowListCors, CorsAdapter};
use crate::auth::SessionManager;
use crate::broadcast::BroadcastService;
use crate::config::HubConfig;
use crate::error::Result;
use crate::registry::ChannelRegistry;

use super::{routes, sse};

/// Shared application state. Config is immutable after startup, so a plain
/// `Arc` suffices rather than a `RwLock`-guarded one.
pub struct AppState {
    pub config: HubConfig,
    pub broadcast: Arc<BroadcastService>,
    pub admission: Arc<dyn AdmissionAdapter>,
    pub cors: Arc<dyn CorsAdapter>,
    pub started_at: DateTime<Utc>,
}

pub type SharedState = Arc<AppState>;

/// Run the HTTP server until it is shut down.
pub async fn run_server(config: HubConfig) -> Result<()> {
    let registry = Arc::new(ChannelRegistry::new());
    let broadcast = Arc::new(BroadcastService::new(registry));

    let admission: Arc<dyn AdmissionAdapter> = if config.sse.bypass_authentication {
        Arc::new(BypassAdmission)
    } else {
        Arc::new(SessionAdmission::new(SessionManager::new()))
    };

    let cors: Arc<dyn CorsAdapter> = Arc::new(AllowListCors::new(
        config.sse.allowed_origins.clone(),
        config.sse.allow_credentials,
    ));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let mount_path = config.sse.mount_path.clone();

    let state: SharedState = Arc::new(AppState {
        config,
        broadcast,
        admission,
        cors,
        started_at: Utc::now(),
    });

    let app = create_router(state.clone(), &mount_path);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(%addr, mount_path = %mount_path, "sse hub listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;

    Ok(())
}

async fn shutdown_signal(state: SharedState) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received; closing all channels");
    state.broadcast.close_all_channels().await;
}

/// Build the router: the configurable subscriber endpoint plus the
/// operational health/config routes.
pub fn create_router(state: SharedState, mount_path: &str) -> Router {
    Router::new()
        .route(mount_path, get(sse::subscribe_handler).options(sse::options_handler))
        .route("/api/health", get(routes::health))
        .route("/api/config", get(routes::get_config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
