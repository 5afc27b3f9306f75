//! LINE phone-verification gateway - Entry point.

use line_client::LineClient;
use phone_registry::{PgRegistry, RegistryStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use verify_gateway::api::{create_router, AppState};
use verify_gateway::config::Config;
use verify_gateway::notify::Notifier;

#[tokio::main]
async fn main() {
    // Load configuration; a missing secret or credential is fatal here
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting LINE phone-verification gateway");

    // Connect the registry and ensure the schema exists
    let registry = match PgRegistry::connect(
        &config.database.url,
        config.database.max_connections,
        config.database.acquire_timeout,
        config.database.query_timeout,
    )
    .await
    {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to connect phone registry: {}", e);
            std::process::exit(1);
        }
    };
    let registry: Arc<dyn RegistryStore> = Arc::new(registry);

    // Messaging client for replies and pushes
    let line = match LineClient::new(
        &config.line.api_url,
        &config.line.channel_access_token,
        config.line.send_timeout,
    ) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create LINE client: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(registry, Notifier::new(line), config.line.channel_secret);
    let app = create_router(state);

    // Bind to address
    let addr = SocketAddr::new(
        config.server.listen_addr.parse().unwrap_or([0, 0, 0, 0].into()),
        config.server.port,
    );

    info!("Listening on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
