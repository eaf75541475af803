pub mod auth;
pub use self::auth::{login, whoami, TokenResponse};

pub mod error;
pub use self::error::{ApiError, ErrorMessage, ErrorResponse};

pub mod health;
pub use self::health::health;

pub mod user_register;
pub use self::user_register::register;

// common functions for the handlers
use crate::auth::{hash_password, verify_password};
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::error;

pub const PASSWORD_MIN_LENGTH: usize = 6;

/// Verified against on unknown emails so both login failures cost one Argon2 run.
static DUMMY_PASSWORD_HASH: Lazy<String> = Lazy::new(|| {
    hash_password("devconnect-unknown-user").unwrap_or_else(|e| {
        error!("Failed to build dummy password hash: {e}");
        String::new()
    })
});

/// Normalize an email for lookup/uniqueness checks.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email_normalized))
}

/// Gravatar URL (200px, PG rating, mystery-person fallback) for a normalized email.
pub fn avatar_url(email_normalized: &str) -> String {
    let digest = Sha256::digest(email_normalized.as_bytes());
    format!("https://www.gravatar.com/avatar/{digest:x}?s=200&r=pg&d=mm")
}

/// Argon2 is CPU-bound; keep it off the async workers.
async fn hash_blocking(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            error!("Password hashing task failed: {e}");
            ApiError::Internal("password hashing task failed".to_string())
        })?
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// Burn the same Argon2 work as a real verification; the result is ignored.
async fn verify_dummy_blocking(password: String) -> Result<(), ApiError> {
    tokio::task::spawn_blocking(move || {
        let _ = verify_password(&password, &DUMMY_PASSWORD_HASH);
    })
    .await
    .map_err(|e| {
        error!("Password verification task failed: {e}");
        ApiError::Internal("password verification task failed".to_string())
    })
}

async fn verify_blocking(password: String, stored_hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| {
            error!("Password verification task failed: {e}");
            ApiError::Internal("password verification task failed".to_string())
        })
}
