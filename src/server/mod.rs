//! Json http api in front of [CheckinService]. Handlers are thin: they only translate between
//! http and the engine.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{config::AppConfig, tracker::service::CheckinService};

pub mod handlers;
pub mod shutdown;

pub struct AppState {
    pub service: Arc<CheckinService>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(service: Arc<CheckinService>, config: AppConfig) -> Self {
        Self { service, config }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/status", get(handlers::status))
        .route("/api/dashboard", get(handlers::dashboard))
        .route("/api/checkins", get(handlers::checkins))
        .route("/api/checkin", post(handlers::checkin))
        .with_state(state)
}

/// Serves the api until `shutdown` is cancelled.
pub async fn serve(state: Arc<AppState>, shutdown: CancellationToken) -> Result<()> {
    let address = state.config.address;
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    info!("Http server stopped");
    Ok(())
}
