use clap::Parser;
use std::time::Duration;

/// Serve login and refresh for monban.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[arg(long, env = "MONBAN_HTTP", default_value = "0.0.0.0:8080")]
    pub http: String,
    /// Local user store and whitelist.
    #[arg(long, env = "DB_URL")]
    pub db_url: String,
    /// Legacy user table, consulted only for users not yet migrated.
    #[arg(long, env = "LEGACY_DB_URL")]
    pub legacy_db_url: String,
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub secret: String,
    #[arg(long, env = "MONBAN_ISSUER", default_value = mb_core::ISSUER)]
    pub issuer: String,
    #[arg(long, env = "ACCESS_TTL", default_value = "15m", value_parser = duration)]
    pub access_ttl: Duration,
    #[arg(long, env = "REFRESH_TTL", default_value = "72h", value_parser = duration)]
    pub refresh_ttl: Duration,
    /// Invalidate each refresh token once it has been exchanged.
    #[arg(long, env = "SINGLE_USE_REFRESH")]
    pub single_use_refresh: bool,
}

impl Args {
    pub fn config(&self) -> Result<mb_auth::Config, mb_auth::ConfigError> {
        mb_auth::Config::new(
            self.secret.as_bytes(),
            self.issuer.as_str(),
            self.access_ttl,
            self.refresh_ttl,
        )
        .map(|config| config.single_use(self.single_use_refresh))
    }
}

fn duration(s: &str) -> Result<Duration, String> {
    mb_core::parse_duration(s)
        .ok_or_else(|| format!("invalid duration {:?}, expected e.g. 30s, 15m, 72h, 3d", s))
}
