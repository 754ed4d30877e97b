//! Environment configuration for the bridge process.
//!
//! Three variables drive the server, matching the deployment contract of
//! the hosting MCP client configuration:
//!
//! - `AGENT_API_KEYS` — comma-separated Dify application API keys. Absent
//!   or empty yields an empty tool catalog, not an error.
//! - `BASE_URL` — backend base URL (required).
//! - `TIMEOUT` — request timeout in milliseconds (default 60000).

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Comma-separated list of per-application API keys.
pub const ENV_API_KEYS: &str = "AGENT_API_KEYS";
/// Backend base URL.
pub const ENV_BASE_URL: &str = "BASE_URL";
/// Request timeout in milliseconds.
pub const ENV_TIMEOUT: &str = "TIMEOUT";

const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Errors raised while reading the process environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} environment variable is not set")]
    MissingVar { name: &'static str },

    #[error("{name} must be an integer number of milliseconds, got '{value}'")]
    InvalidTimeout { name: &'static str, value: String },
}

/// Validated process configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Credentials in configured order; immutable for the process lifetime.
    pub api_keys: Vec<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Settings {
    /// Read and validate configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_values(
            env::var(ENV_API_KEYS).ok(),
            env::var(ENV_BASE_URL).ok(),
            env::var(ENV_TIMEOUT).ok(),
        )
    }

    fn from_values(
        api_keys: Option<String>,
        base_url: Option<String>,
        timeout: Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_keys = api_keys
            .map(|raw| split_keys(&raw))
            .unwrap_or_default();

        let base_url = base_url
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingVar { name: ENV_BASE_URL })?;

        let timeout_ms = match timeout {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout {
                    name: ENV_TIMEOUT,
                    value: raw,
                })?,
            None => DEFAULT_TIMEOUT_MS,
        };

        Ok(Self {
            api_keys,
            base_url,
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}

/// Split a comma-separated key list, trimming entries and dropping empties.
fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}
