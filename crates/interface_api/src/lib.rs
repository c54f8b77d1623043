//! HTTP API Layer
//!
//! This crate exposes the claim service over HTTP using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: the FHIR operation route and health checks
//! - **Error Handling**: every failure answers as an OperationOutcome
//! - **Config**: environment-driven settings with the `CLAIM_` prefix
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_claim::ClaimOperation;

use crate::handlers::{claim, health};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub operation: Arc<ClaimOperation>,
}

/// Creates the main API router
///
/// Routes follow the FHIR operation convention:
/// `POST /fhir/{resourceType}/{operation}`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/fhir", post(claim::capability))
        .route("/fhir/:resource_type/:operation", post(claim::invoke))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
