use std::{env, path::PathBuf, str::FromStr, time::Duration};

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Where uploaded images are written; served under `/uploads`.
    pub upload_dir: PathBuf,
    pub otp_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        Ok(Self {
            database_url,
            host: env_or("APP_HOST", "127.0.0.1".to_string()),
            port: env_or("APP_PORT", 3000),
            upload_dir: env_or("UPLOAD_DIR", PathBuf::from("uploads")),
            otp_ttl: Duration::from_secs(env_or("OTP_TTL_SECS", 300)),
        })
    }
}

/// Parse `key`, falling back to `default` when unset or malformed.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
