//! API route definitions
//!
//! - GET  /health
//! - POST /session/start
//! - POST /session/:id/frame
//! - POST /session/:id/end
//! - GET  /session/:id/summary
//! - GET  /patient/my-progress
//! - GET  /patient/:id/progress
//! - POST /patient/profile
//! - GET  /patient/:id/profile

use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use super::ApiState;

/// Session, progress and profile endpoints (bearer auth required)
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/session/start", post(handlers::start_session))
        .route("/session/:id/frame", post(handlers::submit_frame))
        .route("/session/:id/end", post(handlers::end_session))
        .route("/session/:id/summary", get(handlers::session_summary))
        .route("/patient/my-progress", get(handlers::my_progress))
        .route("/patient/:id/progress", get(handlers::patient_progress))
        .route("/patient/profile", post(handlers::save_profile))
        .route("/patient/:id/profile", get(handlers::patient_profile))
        .with_state(state)
}

/// Unauthenticated health endpoint
pub fn health_routes(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .with_state(state)
}
