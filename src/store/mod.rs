//! Credential store adapter.
//!
//! The rest of the service only talks to [`CredentialStore`]. Production runs on
//! [`PgStore`]; tests and DSN-less local runs use [`MemoryStore`].
//!
//! # Invariants
//! - `email` is stored normalized (trimmed, lowercased) and is unique.
//! - `password_hash` never leaves this boundary in a response: [`UserCredential`]
//!   does not implement `Serialize`, use [`PublicUser`] instead.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Store handle shared by all request tasks.
pub type SharedStore = Arc<dyn CredentialStore>;

/// A stored user record, including the password hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserCredential {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub password_hash: String,
    pub created_at_unix: i64,
}

impl UserCredential {
    /// Public-safe projection, without the password hash.
    #[must_use]
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            avatar: self.avatar.clone(),
            date: self.created_at_unix,
        }
    }
}

/// What handlers are allowed to return about a user.
#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: String,
    /// Account creation time, unix seconds.
    pub date: i64,
}

/// Insert request; the store assigns `id` and `created_at_unix`.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub password_hash: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a user with this email already exists")]
    Duplicate,
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            Self::Duplicate
        } else {
            Self::Unavailable(err.to_string())
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code == "23505"),
        _ => false,
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up by already-normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredential>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserCredential>, StoreError>;

    /// Insert a new user.
    ///
    /// # Errors
    /// [`StoreError::Duplicate`] if the email is already taken.
    async fn insert(&self, user: NewUser) -> Result<UserCredential, StoreError>;

    /// Cheap liveness probe used by `/health`.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    fn credential() -> UserCredential {
        UserCredential {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            avatar: "https://www.gravatar.com/avatar/abc?s=200&r=pg&d=mm".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            created_at_unix: 1_700_000_000,
        }
    }

    #[test]
    fn public_projection_drops_password_hash() -> Result<()> {
        let user = credential();
        let value = serde_json::to_value(user.to_public())?;
        let object = value.as_object().context("expected an object")?;
        assert!(!object.contains_key("password"));
        assert!(!object.contains_key("password_hash"));
        assert_eq!(
            object.get("email").and_then(serde_json::Value::as_str),
            Some("alice@example.com")
        );
        assert_eq!(
            object.get("date").and_then(serde_json::Value::as_i64),
            Some(1_700_000_000)
        );
        Ok(())
    }

    #[test]
    fn non_database_sqlx_errors_are_unavailable() {
        let err = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
