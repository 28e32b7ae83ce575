//! Runtime configuration.
//!
//! Remote credentials come from the environment (a `.env` file is loaded by
//! the binary first). Tunables live in plain structs with `Default` impls.

use std::env;
use std::time::Duration;

use reqwest::Url;

pub const URL_VARS: [&str; 2] = ["SUPABASE_URL", "VITE_SUPABASE_URL"];
pub const KEY_VARS: [&str; 2] = ["SUPABASE_ANON_KEY", "VITE_SUPABASE_ANON_KEY"];

pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_DRAIN_TIMEOUT_SECS: u64 = 5;
/// One day.
pub const MAX_TICK_INTERVAL_SECS: u64 = 86_400;
pub const MAX_DRAIN_TIMEOUT_SECS: u64 = 3_600;
pub const DEFAULT_LOOKBACK_HOURS: u32 = 24;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: set one of {names}")]
    Missing { names: String },
    #[error("invalid endpoint URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Endpoint and access key for the remote store.
#[derive(Clone)]
pub struct Credentials {
    pub base_url: Url,
    pub api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve credentials through `lookup`; the first non-blank name in each
    /// list wins.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = first_present(&lookup, &URL_VARS);
        let api_key = first_present(&lookup, &KEY_VARS);

        let (raw_url, api_key) = match (raw_url, api_key) {
            (Some(url), Some(key)) => (url, key),
            (url, key) => {
                let mut missing = Vec::new();
                if url.is_none() {
                    missing.push(URL_VARS.join(" / "));
                }
                if key.is_none() {
                    missing.push(KEY_VARS.join(" / "));
                }
                return Err(ConfigError::Missing {
                    names: missing.join(" and "),
                });
            }
        };

        Ok(Self {
            base_url: parse_base_url(&raw_url)?,
            api_key,
        })
    }
}

fn first_present<F>(lookup: &F, names: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|err| ConfigError::InvalidUrl {
        value: raw.to_string(),
        reason: err.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            value: raw.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(url)
}

/// Tunables for the streaming generator.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Fixed spacing between ticks, measured from start.
    pub interval: Duration,
    /// How long shutdown waits for in-flight submissions.
    pub drain_timeout: Duration,
}

impl StreamConfig {
    pub fn from_secs(interval_secs: u64, drain_timeout_secs: u64) -> Result<Self, ConfigError> {
        if interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "interval",
                reason: "must be at least one second".into(),
            });
        }
        if interval_secs > MAX_TICK_INTERVAL_SECS {
            return Err(ConfigError::InvalidValue {
                field: "interval",
                reason: format!("must be at most {MAX_TICK_INTERVAL_SECS} seconds"),
            });
        }
        if drain_timeout_secs > MAX_DRAIN_TIMEOUT_SECS {
            return Err(ConfigError::InvalidValue {
                field: "drain timeout",
                reason: format!("must be at most {MAX_DRAIN_TIMEOUT_SECS} seconds"),
            });
        }
        Ok(Self {
            interval: Duration::from_secs(interval_secs),
            drain_timeout: Duration::from_secs(drain_timeout_secs),
        })
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_TICK_INTERVAL_SECS),
            drain_timeout: Duration::from_secs(DEFAULT_DRAIN_TIMEOUT_SECS),
        }
    }
}
