//! Token-gated request authorization.
//!
//! Flow: pull the bearer token from the request headers, verify it with the
//! shared [`TokenVerifier`](super::TokenVerifier), and hand the handler a
//! [`RequestIdentity`]. A failed check rejects the request before the handler
//! body runs.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use super::{AuthError, AuthState};

/// Legacy header some clients send the token in.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Identity of the caller, valid for a single request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestIdentity {
    pub subject_id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestIdentity
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(auth_state) = parts.extensions.get::<Arc<AuthState>>() else {
            error!("AuthState extension missing; protected route is not wired correctly");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "errors": [{ "msg": "Server error" }] })),
            )
                .into_response());
        };

        authorize(&parts.headers, auth_state).map_err(IntoResponse::into_response)
    }
}

/// Resolve the caller from request headers.
///
/// # Errors
/// Returns the [`AuthError`] produced by token extraction or verification.
pub fn authorize(headers: &HeaderMap, auth_state: &AuthState) -> Result<RequestIdentity, AuthError> {
    let Some(token) = extract_token(headers) else {
        debug!("Rejected request: no bearer token");
        return Err(AuthError::Missing);
    };

    match auth_state.verifier().verify(&token) {
        Ok(subject_id) => Ok(RequestIdentity { subject_id }),
        Err(err) => {
            debug!("Rejected request: {err}");
            Err(err)
        }
    }
}

/// `Authorization: Bearer <token>` wins over `x-auth-token`.
pub(crate) fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    let token = headers.get(AUTH_TOKEN_HEADER)?.to_str().ok()?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
