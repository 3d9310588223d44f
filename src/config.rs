use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    /// Base URL of the HR data API the engines sync against
    pub sync_api_url: String,
    pub api_prefix: String,

    pub unread_poll_interval: Duration,
    pub request_timeout: Duration,

    // Rate limiting
    pub rate_per_min: u32,

    pub log_dir: String,
    pub profile_path: String,
}

fn var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value `{raw}`")),
        Err(_) => Ok(default),
    }
}

/// Whole seconds from `key`, never below one second.
fn secs_or(key: &str, default: u64) -> Result<Duration> {
    Ok(Duration::from_secs(var_or(key, default)?.max(1)))
}

impl Config {
    /// Reads the process environment; `main` loads `.env` first.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_addr: var_or("SERVER_ADDR", "127.0.0.1:8080".to_string())?,
            sync_api_url: env::var("SYNC_API_URL").context("SYNC_API_URL must be set")?,
            api_prefix: var_or("API_PREFIX", "/api".to_string())?,

            unread_poll_interval: secs_or("UNREAD_POLL_SECS", 5)?,
            request_timeout: secs_or("REQUEST_TIMEOUT_SECS", 10)?,

            rate_per_min: var_or("RATE_PER_MIN", 600)?,

            log_dir: var_or("LOG_DIR", "logs".to_string())?,
            profile_path: var_or("PROFILE_PATH", "admin_profile.json".to_string())?,
        })
    }
}
