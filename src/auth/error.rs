use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Why a bearer token was refused.
///
/// Every variant answers `401 Unauthorized`. The body only says whether a token
/// was present; signature and expiry failures look the same to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("token missing or malformed")]
    Missing,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
}

impl AuthError {
    #[must_use]
    pub const fn client_message(self) -> &'static str {
        match self {
            Self::Missing => "No token, authorization denied",
            Self::InvalidSignature | Self::Expired => "Token is not valid",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "errors": [{ "msg": self.client_message() }] })),
        )
            .into_response()
    }
}
