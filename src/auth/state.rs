use secrecy::SecretString;

use super::token::{TokenError, TokenIssuer, TokenVerifier};

pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 360_000;

/// Issuer, verifier and default TTL, built once at startup from configuration
/// and shared read-only across requests.
#[derive(Clone, Debug)]
pub struct AuthState {
    issuer: TokenIssuer,
    verifier: TokenVerifier,
    token_ttl_seconds: i64,
}

impl AuthState {
    /// # Errors
    /// Returns [`TokenError::EmptySecret`] if `secret` is empty and
    /// [`TokenError::NonPositiveTtl`] if tokens would be born expired.
    pub fn new(secret: &SecretString, token_ttl_seconds: i64) -> Result<Self, TokenError> {
        if token_ttl_seconds <= 0 {
            return Err(TokenError::NonPositiveTtl(token_ttl_seconds));
        }

        Ok(Self {
            issuer: TokenIssuer::new(secret)?,
            verifier: TokenVerifier::new(secret)?,
            token_ttl_seconds,
        })
    }

    #[must_use]
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    #[must_use]
    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    #[must_use]
    pub fn token_ttl_seconds(&self) -> i64 {
        self.token_ttl_seconds
    }
}
