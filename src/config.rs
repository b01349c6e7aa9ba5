use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::{info, warn};

const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Runtime settings, read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Marketplace backend, without a trailing slash
    pub api_url: String,
    /// Bearer token for the `/api/me/*` endpoints
    pub api_token: Option<String>,
    pub timeout: Duration,
    /// Rows requested per listings fetch; paging happens client-side
    pub fetch_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            timeout: Duration::from_secs(30),
            fetch_limit: 200,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or invalid values use the defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_url: String = try_load(&lookup, "LISTINGS_API_URL", defaults.api_url);
        let api_token = lookup("LISTINGS_API_TOKEN")
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());
        let timeout_secs: u64 = try_load(
            &lookup,
            "LISTINGS_TIMEOUT_SECS",
            defaults.timeout.as_secs(),
        );
        let fetch_limit: usize = try_load(&lookup, "LISTINGS_FETCH_LIMIT", defaults.fetch_limit);

        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_token,
            timeout: Duration::from_secs(timeout_secs),
            fetch_limit: fetch_limit.max(1),
        }
    }
}

fn try_load<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };

    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value: {e}, using default: {default}");
        default
    })
}
