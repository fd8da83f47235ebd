//! API route handlers
//!
//! Thin adapters from HTTP to `ExerciseService`. All handlers return the
//! response envelope; extraction failures and core errors both map to error
//! envelopes through `ApiError`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::auth::AuthUser;
use super::envelope::{ApiError, ApiResponse};
use super::ApiState;
use crate::types::{ExerciseType, FrameInput, ProfileInput};

type ApiResult = Result<Response, ApiError>;

// ============================================================================
// Request / Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub exercise_type: ExerciseType,
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
    pub version: &'static str,
}

// ============================================================================
// Health
// ============================================================================

pub async fn health(State(state): State<ApiState>) -> Response {
    ApiResponse::ok(HealthResponse {
        status: "healthy",
        store: state.service.store().backend_name(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Sessions
// ============================================================================

pub async fn start_session(
    State(state): State<ApiState>,
    AuthUser(identity): AuthUser,
    body: Result<Json<StartSessionRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = body?;
    let session = state.service.start_session(&identity, req.exercise_type).await?;
    Ok(ApiResponse::created(session))
}

pub async fn submit_frame(
    State(state): State<ApiState>,
    AuthUser(identity): AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<FrameInput>, JsonRejection>,
) -> ApiResult {
    let Path(session_id) = path?;
    let Json(input) = body?;
    let ack = state.service.submit_frame(&identity, session_id, &input).await?;
    Ok(ApiResponse::ok(ack))
}

pub async fn end_session(
    State(state): State<ApiState>,
    AuthUser(identity): AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult {
    let Path(session_id) = path?;
    let session = state.service.end_session(&identity, session_id).await?;
    Ok(ApiResponse::ok(session))
}

pub async fn session_summary(
    State(state): State<ApiState>,
    AuthUser(identity): AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult {
    let Path(session_id) = path?;
    let summary = state.service.session_summary(&identity, session_id).await?;
    Ok(ApiResponse::ok(summary.overview()))
}

// ============================================================================
// Patients
// ============================================================================

pub async fn my_progress(
    State(state): State<ApiState>,
    AuthUser(identity): AuthUser,
    query: Result<Query<ProgressQuery>, QueryRejection>,
) -> ApiResult {
    let Query(query) = query?;
    let report = state
        .service
        .progress(&identity, &identity.user_id, query.days)
        .await?;
    Ok(ApiResponse::ok(report))
}

pub async fn patient_progress(
    State(state): State<ApiState>,
    AuthUser(identity): AuthUser,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<ProgressQuery>, QueryRejection>,
) -> ApiResult {
    let Path(patient_id) = path?;
    let Query(query) = query?;
    let report = state.service.progress(&identity, &patient_id, query.days).await?;
    Ok(ApiResponse::ok(report))
}

pub async fn save_profile(
    State(state): State<ApiState>,
    AuthUser(identity): AuthUser,
    body: Result<Json<ProfileInput>, JsonRejection>,
) -> ApiResult {
    let Json(input) = body?;
    let profile = state.service.save_profile(&identity, input).await?;
    Ok(ApiResponse::ok(profile))
}

pub async fn patient_profile(
    State(state): State<ApiState>,
    AuthUser(identity): AuthUser,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult {
    let Path(patient_id) = path?;
    let profile = state.service.profile(&identity, &patient_id).await?;
    Ok(ApiResponse::ok(profile))
}
