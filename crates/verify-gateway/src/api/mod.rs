//! HTTP surface of the gateway.

mod handlers;

pub use handlers::*;

use crate::engine::VerificationEngine;
use crate::notify::Notifier;
use axum::routing::{get, post};
use axum::Router;
use phone_registry::RegistryStore;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state, constructed once in `main` and injected
/// into handlers. No ambient singletons.
#[derive(Clone)]
pub struct AppState {
    /// Verification state machine
    pub engine: Arc<VerificationEngine>,
    /// Best-effort outbound sender
    pub notifier: Arc<Notifier>,
    /// Registry handle for the liveness probe
    pub registry: Arc<dyn RegistryStore>,
    /// Channel secret for signature verification
    pub channel_secret: String,
}

impl AppState {
    pub fn new(
        registry: Arc<dyn RegistryStore>,
        notifier: Notifier,
        channel_secret: impl Into<String>,
    ) -> Self {
        Self {
            engine: Arc::new(VerificationEngine::new(registry.clone())),
            notifier: Arc::new(notifier),
            registry,
            channel_secret: channel_secret.into(),
        }
    }
}

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Webhook entry point
        .route("/callback", post(handlers::callback))
        // The platform console pings this when checking the endpoint
        .route("/webhook", post(handlers::webhook_ping))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
