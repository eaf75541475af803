use crate::{
    auth::{AuthState, RequestIdentity},
    devconnect::handlers::{
        normalize_email, valid_email, verify_blocking, verify_dummy_blocking, ApiError,
        ErrorResponse,
    },
    store::{PublicUser, SharedStore},
};
use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct UserLogin {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

impl std::fmt::Debug for UserLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserLogin")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct TokenResponse {
    pub token: String,
}

impl UserLogin {
    fn validate(&self) -> Result<String, ApiError> {
        let email = normalize_email(&self.email);
        let mut errors = Vec::new();

        if !valid_email(&email) {
            errors.push("Please include a valid email".to_string());
        }
        if self.password.is_empty() {
            errors.push("Password is required".to_string());
        }

        if errors.is_empty() {
            Ok(email)
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth",
    request_body = UserLogin,
    responses (
        (status = 200, description = "Login successful", body = TokenResponse, content_type = "application/json"),
        (status = 400, description = "Invalid input or invalid credentials", body = ErrorResponse),
        (status = 500, description = "Credential store unavailable", body = ErrorResponse),
    ),
    tag = "auth"
)]
// axum handler for login
#[instrument(skip(store, auth_state))]
pub async fn login(
    store: Extension<SharedStore>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<UserLogin>>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Some(Json(user)) = payload else {
        return Err(ApiError::Validation(vec!["Missing payload".to_string()]));
    };

    let email = user.validate()?;

    let Some(credential) = store.find_by_email(&email).await? else {
        debug!("Login for unknown email");
        verify_dummy_blocking(user.password).await?;
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_blocking(user.password, credential.password_hash.clone()).await? {
        debug!("Login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = auth_state
        .issuer()
        .issue(credential.id, auth_state.token_ttl_seconds())
        .map_err(|e| {
            error!("Error issuing token: {e}");
            ApiError::Internal(e.to_string())
        })?;

    debug!("Login successful");

    Ok(Json(TokenResponse { token }))
}

#[utoipa::path(
    get,
    path = "/api/auth",
    responses (
        (status = 200, description = "Authenticated user", body = PublicUser, content_type = "application/json"),
        (status = 401, description = "Missing, invalid or expired token, or user no longer exists", body = ErrorResponse),
        (status = 500, description = "Credential store unavailable", body = ErrorResponse),
    ),
    params(
        ("x-auth-token" = Option<String>, Header, description = "Token, when not sent as `Authorization: Bearer`"),
    ),
    tag = "auth"
)]
// axum handler for whoami
#[instrument(skip(store))]
pub async fn whoami(
    identity: RequestIdentity,
    store: Extension<SharedStore>,
) -> Result<Json<PublicUser>, ApiError> {
    match store.find_by_id(identity.subject_id).await? {
        Some(credential) => Ok(Json(credential.to_public())),
        None => {
            // Tokens outlive deleted users until they expire.
            debug!("Token subject no longer exists");
            Err(ApiError::UserNotFound)
        }
    }
}
