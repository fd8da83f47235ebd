//! REST API module using Axum
//!
//! Thin HTTP surface over `ExerciseService` with a consistent JSON envelope
//! and bearer-token authentication through the configured identity provider.

pub mod auth;
pub mod envelope;
pub mod handlers;
mod routes;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::IdentityProvider;
use crate::service::ExerciseService;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<ExerciseService>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl ApiState {
    pub fn new(service: Arc<ExerciseService>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { service, identity }
    }
}

/// Build a CORS layer from configured origins.
///
/// `"*"` allows any origin; an empty list allows none (same-origin only).
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.iter().any(|o| o == "*") {
        tracing::info!("CORS: allowing any origin");
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.trim().parse().ok()).collect();
    if !allowed.is_empty() {
        tracing::info!(origins = ?origins, "CORS: allowing configured origins");
    }
    base.allow_origin(allowed)
}

/// Create the complete application router.
pub fn create_app(state: ApiState, cors_origins: &[String]) -> Router {
    Router::new()
        .merge(routes::api_routes(state.clone()))
        .merge(routes::health_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(cors_origins))
}
