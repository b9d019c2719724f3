use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;

/// Decoded form of an access or refresh token.
///
/// Timestamps are Unix seconds. The lifetime is never stored on its own:
/// [`Token::duration`] is always `expires - issued`.
/// Only refresh tokens carry an `id`; it is their whitelist key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    id: String,
    issuer: String,
    subject: String,
    issued: i64,
    expires: i64,
    csrf: String,
}

impl Token {
    pub fn new(issuer: &str, subject: &str, csrf: &str, issued: i64, lifetime: Duration) -> Self {
        Self {
            id: String::new(),
            issuer: issuer.to_string(),
            subject: subject.to_string(),
            issued,
            expires: issued.saturating_add(i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX)),
            csrf: csrf.to_string(),
        }
    }
    /// Attaches a whitelist id, turning this into a refresh token.
    pub fn identified(self, id: String) -> Self {
        Self { id, ..self }
    }
    pub(crate) fn from_parts(
        id: String,
        issuer: String,
        subject: String,
        issued: i64,
        expires: i64,
        csrf: String,
    ) -> Self {
        Self {
            id,
            issuer,
            subject,
            issued,
            expires,
            csrf,
        }
    }
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn issuer(&self) -> &str {
        &self.issuer
    }
    pub fn subject(&self) -> &str {
        &self.subject
    }
    pub fn csrf(&self) -> &str {
        &self.csrf
    }
    pub fn issued(&self) -> i64 {
        self.issued
    }
    pub fn expires(&self) -> i64 {
        self.expires
    }
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.expires.saturating_sub(self.issued).max(0) as u64)
    }
    pub fn expired(&self) -> bool {
        self.expires < mb_core::now()
    }
    /// Field-by-field comparison against a stored copy.
    /// The exhaustive destructure forces every new field to be listed here.
    pub fn matches(&self, other: &Self) -> bool {
        let Self {
            id,
            issuer,
            subject,
            issued,
            expires,
            csrf,
        } = other;
        self.id == *id
            && self.issuer == *issuer
            && self.subject == *subject
            && self.issued == *issued
            && self.expires == *expires
            && self.csrf == *csrf
    }
}
