use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

/// Timing knobs for the progress simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTiming {
    /// Interval between simulator ticks while a request is in flight.
    pub tick: Duration,
    /// How long the finished bar stays at 100% before the report replaces it.
    pub hold: Duration,
}

impl Default for ProgressTiming {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(200),
            hold: Duration::from_millis(500),
        }
    }
}

/// Client configuration loaded from environment variables.
/// Every value has a default; malformed values are startup errors.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub request_timeout: Duration,
    pub progress: ProgressTiming,
    pub rust_log: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(120),
            progress: ProgressTiming::default(),
            rust_log: "info".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = ClientConfig::default();
        Ok(ClientConfig {
            endpoint: std::env::var("ANALYZER_ENDPOINT").unwrap_or(defaults.endpoint),
            request_timeout: Duration::from_secs(env_or("ANALYZER_TIMEOUT_SECS", 120u64)?),
            progress: ProgressTiming {
                tick: Duration::from_millis(env_or("PROGRESS_TICK_MS", 200u64)?),
                hold: Duration::from_millis(env_or("PROGRESS_HOLD_MS", 500u64)?),
            },
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }

    /// Applies command-line overrides on top of the environment.
    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }
        self
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw:?}"))
}
