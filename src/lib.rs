//! # DevConnect
//!
//! Backend for a developer social network. This crate holds the part of the
//! service that is more than CRUD glue: registering credentials, logging in,
//! and gating protected requests behind a signed bearer token.
//!
//! ## Authentication
//!
//! Passwords are stored as salted Argon2id PHC strings and never leave the
//! credential store. A successful login returns an HS256 JWT whose `sub` is the
//! user id. Tokens are stateless: they are valid until `exp` and there is no
//! revocation list.
//!
//! ## Authorization
//!
//! Protected handlers take a [`auth::RequestIdentity`] argument. The extractor
//! runs before the handler body and answers `401 Unauthorized` on a missing,
//! forged or expired token, so the handler never executes in that case.

pub mod auth;
pub mod cli;
pub mod devconnect;
pub mod store;
