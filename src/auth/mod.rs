//! Authentication primitives and the request gate.
//!
//! - [`password`]: Argon2id hashing and constant-time verification.
//! - [`token`]: HS256 token issuance and verification.
//! - [`gate`]: the [`RequestIdentity`] extractor guarding protected routes.

mod error;
pub mod gate;
pub mod password;
mod state;
pub mod token;

pub use error::AuthError;
pub use gate::{authorize, RequestIdentity, AUTH_TOKEN_HEADER};
pub use password::{hash_password, verify_password, PasswordError};
pub use state::{AuthState, DEFAULT_TOKEN_TTL_SECONDS};
pub use token::{Claims, TokenError, TokenIssuer, TokenVerifier};
