use crate::{
    auth::AuthState,
    devconnect::handlers::{
        avatar_url, hash_blocking, normalize_email, valid_email, ApiError, ErrorResponse,
        TokenResponse, PASSWORD_MIN_LENGTH,
    },
    store::{NewUser, SharedStore},
};
use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct UserRegister {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

impl std::fmt::Debug for UserRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRegister")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl UserRegister {
    /// Returns the trimmed name and normalized email.
    fn validate(&self) -> Result<(String, String), ApiError> {
        let name = self.name.trim().to_string();
        let email = normalize_email(&self.email);
        let mut errors = Vec::new();

        if name.is_empty() {
            errors.push("Name is required".to_string());
        }
        if !valid_email(&email) {
            errors.push("Please include a valid email".to_string());
        }
        if self.password.chars().count() < PASSWORD_MIN_LENGTH {
            errors.push(format!(
                "Please enter a password with {PASSWORD_MIN_LENGTH} or more characters"
            ));
        }

        if errors.is_empty() {
            Ok((name, email))
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = UserRegister,
    responses (
        (status = 200, description = "Registration successful", body = TokenResponse, content_type = "application/json"),
        (status = 400, description = "Invalid input or user already exists", body = ErrorResponse),
        (status = 500, description = "Credential store unavailable", body = ErrorResponse),
    ),
    tag = "register"
)]
// axum handler for register
#[instrument(skip(store, auth_state))]
pub async fn register(
    store: Extension<SharedStore>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<UserRegister>>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Some(Json(user)) = payload else {
        return Err(ApiError::Validation(vec!["Missing payload".to_string()]));
    };

    let (name, email) = user.validate()?;

    // check if user exists
    if store.find_by_email(&email).await?.is_some() {
        debug!("User already exists");
        return Err(ApiError::UserExists);
    }

    let password_hash = hash_blocking(user.password).await?;

    // a concurrent registration can still win the race; insert reports it as Duplicate
    let created = store
        .insert(NewUser {
            name,
            avatar: avatar_url(&email),
            email,
            password_hash,
        })
        .await?;

    info!(user_id = %created.id, "User registered");

    let token = auth_state
        .issuer()
        .issue(created.id, auth_state.token_ttl_seconds())
        .map_err(|e| {
            error!("Error issuing token: {e}");
            ApiError::Internal(e.to_string())
        })?;

    Ok(Json(TokenResponse { token }))
}
