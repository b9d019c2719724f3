//! Token issuance, refresh-token whitelist, and lazy user migration.
//!
//! Users log in with a username and password and receive a [`Grant`]: a
//! short-lived access token and a long-lived refresh token, both HS256 JWTs.
//! Refresh tokens are honoured only while their id sits in the [`Whitelist`].
//! Users unknown locally are verified against the [`Legacy`] system once and
//! copied into the [`UserStore`].
//!
//! ## Tokens
//!
//! - [`Token`] - Issuer, subject, lifetime, and CSRF value of a grant half
//! - [`Claims`] - JWT payload structure
//! - [`Crypto`] - JWT signing and verification
//! - [`record`] - Whitelist value layout
//!
//! ## Services
//!
//! - [`AuthService`] - Login and refresh
//! - [`Whitelist`] - Outstanding refresh tokens, with a background reaper
//! - [`UserStore`] - Local user records
//! - [`Legacy`] - Read-only legacy credential store
//! - [`password`] - Argon2 hashing and verification
mod claims;
mod config;
mod crypto;
mod dto;
mod error;
mod grant;
mod legacy;
pub mod password;
pub mod record;
mod repository;
mod service;
mod token;
mod user;
mod whitelist;

pub use claims::*;
pub use config::*;
pub use crypto::*;
pub use dto::*;
pub use error::*;
pub use grant::*;
pub use legacy::*;
pub use repository::*;
pub use service::*;
pub use token::*;
pub use user::*;
pub use whitelist::*;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
pub use handlers::*;
