//! Admin and chat HTTP API.
//!
//! # Routes
//! ```text
//! GET  /status                      version, endpoint health, mode
//! GET  /health/services             every tracked service
//! GET  /health/services/{id}        one service (default record if unknown)
//! POST /health/services/{id}/reset  back to operational
//! GET  /chat                        current chat view
//! POST /chat                        { "message": "..." } → submit
//! POST /chat/retry                  resubmit the last query
//! POST /chat/simulation             toggle simulation mode
//! ```

pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use self::handlers::*;
use crate::chat::ChatOrchestrator;
use crate::health::HealthRegistry;

/// Upper bound on one admin request, long enough for a fully retried submission.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// State injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ChatOrchestrator>,
    pub registry: HealthRegistry,
}

impl AppState {
    pub fn new(orchestrator: Arc<ChatOrchestrator>) -> Self {
        let registry = orchestrator.registry().clone();
        Self {
            orchestrator,
            registry,
        }
    }
}

#[allow(deprecated)]
pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/health/services", get(list_services))
        .route("/health/services/{id}", get(get_service))
        .route("/health/services/{id}/reset", post(reset_service))
        .route("/chat", get(get_chat).post(post_chat))
        .route("/chat/retry", post(post_retry))
        .route("/chat/simulation", post(post_simulation))
        .with_state(state)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
}

/// Serve the admin API until `shutdown` fires.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin API starting");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    tracing::info!("Admin API stopped");
    Ok(())
}
