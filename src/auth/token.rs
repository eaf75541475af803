//! Bearer token issuance and verification (HS256 JWT).
//!
//! # Pre-conditions
//! - The signing secret is non-empty. It is injected at construction and never
//!   read from ambient state.
//!
//! # Post-conditions
//! - `issue_at` is a pure function of `(subject, now, ttl, secret)`.
//! - `verify_at` either returns the subject or one of [`AuthError`]'s variants,
//!   checked in order: shape, signature, expiry.
//!
//! # Invariants
//! - No server-side token record exists; a token is valid until `exp`.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use tracing::debug;
use uuid::Uuid;

use super::AuthError;

/// Claims carried by every token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Issued at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds. The token is rejected once `now >= exp`.
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("signing secret must not be empty")]
    EmptySecret,
    #[error("token lifetime must be positive, got {0} seconds")]
    NonPositiveTtl(i64),
    #[error("failed to sign token: {0}")]
    Signing(String),
}

pub(crate) fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Mints signed tokens for authenticated users.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// # Errors
    /// Returns [`TokenError::EmptySecret`] for an empty secret.
    pub fn new(secret: &SecretString) -> Result<Self, TokenError> {
        let secret = secret.expose_secret();
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        Ok(Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Issue a token for `subject` valid for `ttl_seconds` from now.
    ///
    /// # Errors
    /// Returns [`TokenError::Signing`] if the claims cannot be encoded.
    pub fn issue(&self, subject: Uuid, ttl_seconds: i64) -> Result<String, TokenError> {
        self.issue_at(subject, now_unix_seconds(), ttl_seconds)
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    /// Returns [`TokenError::Signing`] if the claims cannot be encoded.
    pub fn issue_at(&self, subject: Uuid, now: i64, ttl_seconds: i64) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now.saturating_add(ttl_seconds),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

/// Checks tokens produced by a [`TokenIssuer`] sharing the same secret.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier").finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// # Errors
    /// Returns [`TokenError::EmptySecret`] for an empty secret.
    pub fn new(secret: &SecretString) -> Result<Self, TokenError> {
        let secret = secret.expose_secret();
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }

        // Expiry is checked by `verify_at` against the caller's clock, with no
        // leeway; the library only enforces that `exp` is present.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.validate_aud = false;

        Ok(Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Verify against the wall clock.
    ///
    /// # Errors
    /// See [`TokenVerifier::verify_at`].
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        self.verify_at(token, now_unix_seconds())
    }

    /// Verify as if the current time were `now`.
    ///
    /// # Errors
    /// - [`AuthError::Missing`]: empty token, wrong shape, or a subject that is not a user id.
    /// - [`AuthError::InvalidSignature`]: any segment fails to authenticate.
    /// - [`AuthError::Expired`]: `now >= exp`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Uuid, AuthError> {
        if !well_formed(token) {
            return Err(AuthError::Missing);
        }

        let claims = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(map_jwt_error)?
            .claims;

        if now >= claims.exp {
            return Err(AuthError::Expired);
        }

        Uuid::parse_str(&claims.sub).map_err(|_| {
            debug!("Signed token carries a non-uuid subject");
            AuthError::Missing
        })
    }
}

/// Three non-empty, dot-separated segments.
fn well_formed(token: &str) -> bool {
    let segments: Vec<&str> = token.split('.').collect();
    segments.len() == 3 && segments.iter().all(|segment| !segment.is_empty())
}

/// Once the shape is right, anything that fails to decode or authenticate is a
/// signature failure: a tampered segment must never read as "no token".
fn map_jwt_error(error: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::InvalidToken | ErrorKind::MissingRequiredClaim(_) => AuthError::Missing,
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::InvalidSignature,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    const NOW: i64 = 1_700_000_000;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    fn pair() -> Result<(TokenIssuer, TokenVerifier)> {
        let secret = secret("test-secret-key-that-is-long-enough");
        Ok((TokenIssuer::new(&secret)?, TokenVerifier::new(&secret)?))
    }

    #[test]
    fn round_trip_returns_subject() -> Result<()> {
        let (issuer, verifier) = pair()?;
        let subject = Uuid::new_v4();

        let token = issuer.issue_at(subject, NOW, 3600)?;
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(verifier.verify_at(&token, NOW), Ok(subject));
        assert_eq!(verifier.verify_at(&token, NOW + 3599), Ok(subject));
        Ok(())
    }

    #[test]
    fn wall_clock_round_trip() -> Result<()> {
        let (issuer, verifier) = pair()?;
        let subject = Uuid::new_v4();
        let token = issuer.issue(subject, 60)?;
        assert_eq!(verifier.verify(&token), Ok(subject));
        Ok(())
    }

    #[test]
    fn issue_is_deterministic_for_same_inputs() -> Result<()> {
        let (issuer, _) = pair()?;
        let subject = Uuid::new_v4();
        assert_eq!(
            issuer.issue_at(subject, NOW, 60)?,
            issuer.issue_at(subject, NOW, 60)?
        );
        Ok(())
    }

    #[test]
    fn zero_and_negative_ttl_are_expired() -> Result<()> {
        let (issuer, verifier) = pair()?;
        let subject = Uuid::new_v4();

        let zero = issuer.issue_at(subject, NOW, 0)?;
        assert_eq!(verifier.verify_at(&zero, NOW), Err(AuthError::Expired));

        let negative = issuer.issue_at(subject, NOW, -30)?;
        assert_eq!(verifier.verify_at(&negative, NOW), Err(AuthError::Expired));

        let wall_clock = issuer.issue(subject, 0)?;
        assert_eq!(verifier.verify(&wall_clock), Err(AuthError::Expired));
        Ok(())
    }

    #[test]
    fn token_expires_exactly_at_exp() -> Result<()> {
        let (issuer, verifier) = pair()?;
        let token = issuer.issue_at(Uuid::new_v4(), NOW, 10)?;
        assert_eq!(verifier.verify_at(&token, NOW + 10), Err(AuthError::Expired));
        Ok(())
    }

    #[test]
    fn flipping_any_character_is_invalid_signature() -> Result<()> {
        let (issuer, verifier) = pair()?;
        let token = issuer.issue_at(Uuid::new_v4(), NOW, 3600)?;

        for (index, original) in token.char_indices() {
            if original == '.' {
                continue;
            }
            let replacement = if original == 'A' { 'B' } else { 'A' };
            let mut tampered = token.clone();
            tampered.replace_range(index..=index, &replacement.to_string());

            assert_eq!(
                verifier.verify_at(&tampered, NOW),
                Err(AuthError::InvalidSignature),
                "tampered position {index} was not rejected as invalid signature"
            );
        }
        Ok(())
    }

    #[test]
    fn different_secret_is_invalid_signature() -> Result<()> {
        let (issuer, _) = pair()?;
        let other = TokenVerifier::new(&secret("wrong-secret-key-that-is-different"))?;
        let token = issuer.issue_at(Uuid::new_v4(), NOW, 3600)?;
        assert_eq!(other.verify_at(&token, NOW), Err(AuthError::InvalidSignature));
        Ok(())
    }

    #[test]
    fn malformed_tokens_are_missing() -> Result<()> {
        let (_, verifier) = pair()?;
        for token in ["", "not-a-valid-jwt", "a.b", "a..c", ".b.c", "a.b.c.d"] {
            assert_eq!(
                verifier.verify_at(token, NOW),
                Err(AuthError::Missing),
                "token {token:?}"
            );
        }
        Ok(())
    }

    #[test]
    fn non_uuid_subject_is_missing() -> Result<()> {
        let raw_secret = "test-secret-key-that-is-long-enough";
        let claims = Claims {
            sub: "user-123".to_string(),
            iat: NOW,
            exp: NOW + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(raw_secret.as_bytes()),
        )?;

        let verifier = TokenVerifier::new(&secret(raw_secret))?;
        assert_eq!(verifier.verify_at(&token, NOW), Err(AuthError::Missing));
        Ok(())
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(
            TokenIssuer::new(&secret("")),
            Err(TokenError::EmptySecret)
        ));
        assert!(matches!(
            TokenVerifier::new(&secret("")),
            Err(TokenError::EmptySecret)
        ));
    }

    #[test]
    fn token_error_display() {
        assert_eq!(
            TokenError::EmptySecret.to_string(),
            "signing secret must not be empty"
        );
        assert_eq!(
            TokenError::Signing("boom".to_string()).to_string(),
            "failed to sign token: boom"
        );
    }
}
