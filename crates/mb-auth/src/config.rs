use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("signing secret must not be empty")]
    EmptySecret,
    #[error("issuer must not be empty")]
    EmptyIssuer,
    #[error("{0} token lifetime must be a positive whole number of seconds")]
    Lifetime(&'static str),
}

/// Settings for [`AuthService`](crate::AuthService).
#[derive(Clone)]
pub struct Config {
    secret: Vec<u8>,
    issuer: String,
    access: Duration,
    refresh: Duration,
    single_use: bool,
}

impl Config {
    pub fn new(
        secret: impl Into<Vec<u8>>,
        issuer: impl Into<String>,
        access: Duration,
        refresh: Duration,
    ) -> Result<Self, ConfigError> {
        let secret = secret.into();
        let issuer = issuer.into();
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if issuer.is_empty() {
            return Err(ConfigError::EmptyIssuer);
        }
        if !whole(access) {
            return Err(ConfigError::Lifetime("access"));
        }
        if !whole(refresh) {
            return Err(ConfigError::Lifetime("refresh"));
        }
        Ok(Self {
            secret,
            issuer,
            access,
            refresh,
            single_use: false,
        })
    }
    /// Each refresh token may be exchanged once; the exchange removes it.
    pub fn single_use(mut self, enabled: bool) -> Self {
        self.single_use = enabled;
        self
    }
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }
    pub fn issuer(&self) -> &str {
        &self.issuer
    }
    pub fn access(&self) -> Duration {
        self.access
    }
    pub fn refresh(&self) -> Duration {
        self.refresh
    }
    pub fn is_single_use(&self) -> bool {
        self.single_use
    }
}

/// Positive, whole seconds, and representable as a Unix-seconds offset.
fn whole(lifetime: Duration) -> bool {
    lifetime.subsec_nanos() == 0 && i64::try_from(lifetime.as_secs()).is_ok_and(|secs| secs > 0)
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("secret", &"***")
            .field("issuer", &self.issuer)
            .field("access", &self.access)
            .field("refresh", &self.refresh)
            .field("single_use", &self.single_use)
            .finish()
    }
}
