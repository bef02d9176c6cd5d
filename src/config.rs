//! Runtime configuration.
//!
//! Values come from the environment (optionally seeded from a `.env` file);
//! anything unset falls back to the defaults the dashboard has always used.

use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_API_URL: &str = "https://www.censtatd.gov.hk/api/post.php";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_TAIL_ROWS: usize = 5;

const ENV_API_URL: &str = "HKR_API_URL";
const ENV_TIMEOUT_SECS: &str = "HKR_TIMEOUT_SECS";
const ENV_CACHE_TTL_SECS: &str = "HKR_CACHE_TTL_SECS";
const ENV_TAIL_ROWS: &str = "HKR_TAIL_ROWS";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Statistics API endpoint (HTTPS POST).
    pub api_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// How long a fetched series stays valid in the cache.
    pub cache_ttl: Duration,
    /// Rows shown in "latest data" previews.
    pub tail_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            tail_rows: DEFAULT_TAIL_ROWS,
        }
    }
}

impl Config {
    /// Load `.env` (if any) and read overrides from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut config = Config::default();

        if let Some(url) = lookup(ENV_API_URL) {
            let url = url.trim();
            if url.is_empty() {
                return Err(AppError::new(2, format!("{ENV_API_URL} is set but empty.")));
            }
            config.api_url = url.to_string();
        }
        if let Some(secs) = parse_u64(&lookup, ENV_TIMEOUT_SECS)? {
            if secs == 0 {
                return Err(AppError::new(2, format!("{ENV_TIMEOUT_SECS} must be at least 1.")));
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_u64(&lookup, ENV_CACHE_TTL_SECS)? {
            config.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(rows) = parse_u64(&lookup, ENV_TAIL_ROWS)? {
            config.tail_rows = rows as usize;
        }

        Ok(config)
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>, AppError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|e| AppError::new(2, format!("Invalid {key} '{raw}': {e}")))
}
