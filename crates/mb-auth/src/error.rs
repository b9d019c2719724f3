//! Error types for every layer of the authentication core.
//!
//! Collaborator errors ([`TokenError`], [`StoreError`], [`UserError`],
//! [`LegacyError`]) stay specific to their layer. [`AuthService`] translates
//! them into the three kinds of [`AuthError`] that callers are allowed to see.
//!
//! [`AuthService`]: crate::AuthService
use thiserror::Error;

/// Failures surfaced by the auth service.
///
/// Unknown users and bad passwords are the same [`AuthError::WrongCredentials`];
/// every token problem is the same [`AuthError::InvalidToken`]. Neither reveals
/// which check failed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("wrong username or password")]
    WrongCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Logs the underlying cause and reduces it to an opaque internal error.
    pub(crate) fn internal(context: &str, cause: impl std::fmt::Display) -> Self {
        log::error!("{}: {}", context, cause);
        Self::Internal(format!("{}: {}", context, cause))
    }
}

/// Token codec failures.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Malformed, badly signed, expired, not yet valid, or signed with an
    /// unexpected algorithm.
    #[error("invalid token")]
    Invalid,
    #[error("sign token failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("could not handle this token: {0}")]
    Internal(#[source] jsonwebtoken::errors::Error),
}

/// Whitelist storage failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("token not found")]
    NotFound,
    #[error("whitelist is closed")]
    Closed,
    #[error("token has negative issue time")]
    NegativeTime,
    #[error("whitelist record of {0} bytes is shorter than its stamp")]
    Truncated(usize),
    #[error("token serialization failed: {0}")]
    Codec(#[from] serde_json::Error),
    #[cfg(feature = "database")]
    #[error("database error: {0}")]
    Postgres(#[from] mb_pg::PgErr),
}

/// Local user store failures.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found")]
    NotFound,
    #[error("user already exists")]
    AlreadyExists,
    #[error("user store failure: {0}")]
    Internal(String),
}

/// Legacy system failures.
#[derive(Debug, Error)]
pub enum LegacyError {
    #[error("legacy user not found")]
    NotFound,
    #[error("legacy credentials do not match")]
    WrongCredentials,
    #[error("legacy system failure: {0}")]
    Internal(String),
}

#[cfg(feature = "database")]
impl From<mb_pg::PgErr> for UserError {
    fn from(e: mb_pg::PgErr) -> Self {
        match e.code() {
            Some(code) if *code == tokio_postgres::error::SqlState::UNIQUE_VIOLATION => {
                Self::AlreadyExists
            }
            _ => Self::Internal(e.to_string()),
        }
    }
}

#[cfg(feature = "database")]
impl From<mb_pg::PgErr> for LegacyError {
    fn from(e: mb_pg::PgErr) -> Self {
        Self::Internal(e.to_string())
    }
}
