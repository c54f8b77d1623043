//! Claim service API server binary
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin claim-api
//!
//! # Run with environment variables
//! CLAIM_HOST=0.0.0.0 CLAIM_PORT=8080 cargo run --bin claim-api
//! ```
//!
//! # Environment Variables
//!
//! * `CLAIM_HOST` - Server host (default: 0.0.0.0)
//! * `CLAIM_PORT` - Server port (default: 8080)
//! * `CLAIM_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `CLAIM_DEFAULT_REPOSITORY` - Code of the repository serving claims (default: default)
//! * `CLAIM_REPOSITORY_BASE_URL` - FHIR endpoint of that repository
//! * `CLAIM_REPOSITORY_TIMEOUT_SECS` - Outbound request timeout (default: 30)
//! * `CLAIM_GROUP_TAG_SYSTEM` - Tag system marking a requisition's group task
//! * `CLAIM_GROUP_TAG_CODE` - Tag code marking a requisition's group task

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_claim::{ClaimOperation, ClaimSettings};
use fhir_repository::RepositoryRegistry;
use interface_api::{config::ApiConfig, create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().unwrap_or_default();

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        repository = %config.default_repository,
        "Starting claim service API server"
    );

    let registry = RepositoryRegistry::from_settings([config.repository_settings()])?;
    let repository = registry.client_for(&config.default_repository)?;

    let operation = ClaimOperation::new(
        repository,
        ClaimSettings {
            group_tag_system: config.group_tag_system.clone(),
            group_tag_code: config.group_tag_code.clone(),
        },
    );

    let app = create_router(AppState {
        operation: Arc::new(operation),
    });

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// This enables graceful shutdown of the server, allowing in-flight
/// requests to complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
