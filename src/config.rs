//! Runtime configuration, resolved once at process startup.
//!
//! Handlers never read environment variables; `ProxyConfig` is built in
//! `run()` and passed into the API context.

use std::net::SocketAddr;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "MedInsight";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const ENV_PREFIX: &str = "MEDINSIGHT_";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";
const DEFAULT_UPSTREAM_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,medinsight_lib=debug"
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{key} is not a valid {expected}: {value}")]
    InvalidValue {
        key: String,
        expected: &'static str,
        value: String,
    },

    #[error("{key} must be between {min} and {max}, got {value}")]
    OutOfRange {
        key: String,
        min: f32,
        max: f32,
        value: f32,
    },

    #[error("{0} cannot be empty")]
    Empty(String),
}

/// Generation parameters sent with every upstream request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Everything the proxy needs to run.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub bind_addr: SocketAddr,
    pub upstream_url: String,
    pub api_key: Option<String>,
    pub generation: GenerationSettings,
    /// `None` keeps the transport default.
    pub timeout_secs: Option<u64>,
}

impl ProxyConfig {
    /// Resolve from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary key lookup. The lookup receives fully
    /// prefixed names (`MEDINSIGHT_MODEL`). Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(&format!("{ENV_PREFIX}{name}"))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| invalid("BIND_ADDR", "socket address", &bind_raw))?;

        let upstream_url = get("UPSTREAM_URL")
            .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if upstream_url.is_empty() {
            return Err(ConfigError::Empty(format!("{ENV_PREFIX}UPSTREAM_URL")));
        }

        let model = get("MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let temperature = match get("TEMPERATURE") {
            Some(raw) => raw
                .parse::<f32>()
                .map_err(|_| invalid("TEMPERATURE", "number", &raw))?,
            None => DEFAULT_TEMPERATURE,
        };
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::OutOfRange {
                key: format!("{ENV_PREFIX}TEMPERATURE"),
                min: 0.0,
                max: 2.0,
                value: temperature,
            });
        }

        let max_tokens = match get("MAX_TOKENS") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid("MAX_TOKENS", "positive integer", &raw))?,
            None => DEFAULT_MAX_TOKENS,
        };

        let timeout_secs = match get("TIMEOUT_SECS") {
            Some(raw) => Some(
                raw.parse::<u64>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| invalid("TIMEOUT_SECS", "positive integer", &raw))?,
            ),
            None => None,
        };

        Ok(Self {
            bind_addr,
            upstream_url,
            api_key: get("API_KEY"),
            generation: GenerationSettings {
                model,
                temperature,
                max_tokens,
            },
            timeout_secs,
        })
    }
}

fn invalid(name: &str, expected: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: format!("{ENV_PREFIX}{name}"),
        expected,
        value: value.to_string(),
    }
}
