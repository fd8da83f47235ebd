//! Bearer-token authentication extractor

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Response;

use super::envelope::ApiErrorResponse;
use super::ApiState;
use crate::auth::AuthError;
use crate::types::Identity;

/// Authenticated requester resolved through the identity provider
pub struct AuthUser(pub Identity);

/// Extract Bearer token from Authorization header.
fn extract_bearer(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
}

#[async_trait]
impl FromRequestParts<ApiState> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer(parts).ok_or_else(|| {
            ApiErrorResponse::unauthorized(AuthError::MissingCredential.to_string())
        })?;

        state
            .identity
            .authenticate(&token)
            .await
            .map(AuthUser)
            .map_err(|e| ApiErrorResponse::unauthorized(e.to_string()))
    }
}
