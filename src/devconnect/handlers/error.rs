use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::store::StoreError;

/// Body shared by every 4xx/5xx answer: `{"errors": [{"msg": "..."}]}`.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorMessage>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorMessage {
    pub msg: String,
}

impl ErrorResponse {
    fn new<I, T>(messages: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            errors: messages
                .into_iter()
                .map(|msg| ErrorMessage { msg: msg.into() })
                .collect(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
    /// Same answer for an unknown email and a wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user already exists")]
    UserExists,
    /// The token is valid but its subject is gone from the store.
    #[error("user not found")]
    UserNotFound,
    #[error("credential store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => Self::UserExists,
            StoreError::Unavailable(reason) => Self::StoreUnavailable(reason),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(messages) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new(messages.clone()))
            }
            Self::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(["Invalid Credentials"]),
            ),
            Self::UserExists => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(["User already exists"]),
            ),
            Self::UserNotFound => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new(["User not found"]),
            ),
            // Internal detail goes to the log only.
            Self::StoreUnavailable(_) | Self::Internal(_) => {
                error!("{self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(["Server error"]),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    async fn body_of(response: Response) -> Result<ErrorResponse> {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    #[tokio::test]
    async fn validation_lists_every_message() -> Result<()> {
        let response = ApiError::Validation(vec!["a".to_string(), "b".to_string()]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_of(response).await?, ErrorResponse::new(["a", "b"]));
        Ok(())
    }

    #[tokio::test]
    async fn store_failures_do_not_leak_detail() -> Result<()> {
        let response =
            ApiError::from(StoreError::Unavailable("connection refused on 10.0.0.3".to_string()))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await?, ErrorResponse::new(["Server error"]));
        Ok(())
    }

    #[test]
    fn duplicate_maps_to_user_exists() {
        assert!(matches!(
            ApiError::from(StoreError::Duplicate),
            ApiError::UserExists
        ));
    }

    #[test]
    fn validation_display_joins_messages() {
        let err = ApiError::Validation(vec!["x".to_string(), "y".to_string()]);
        assert_eq!(err.to_string(), "validation failed: x, y");
    }
}
