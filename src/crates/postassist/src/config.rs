//! Service configuration, read from the environment.
//!
//! No ambient globals: `Settings` is built once in `main` and handed to the
//! application context. Defaults mirror the service's documented behavior
//! (a 2 hour task TTL, a routing ceiling of 50 supervisor turns).

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Default TTL for task records in the primary store (2 hours).
pub const DEFAULT_TASK_TTL: Duration = Duration::from_secs(7200);

/// Default ceiling on supervisor turns per graph invocation.
pub const DEFAULT_RECURSION_LIMIT: usize = 50;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent or empty.
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    /// An environment variable holds an unparseable value.
    #[error("invalid value for {var}: {value}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Runtime settings for the service.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Bind host.
    pub host: String,

    /// Bind port.
    pub port: u16,

    /// OpenAI API key.
    pub openai_api_key: String,

    /// Chat completion model identifier.
    pub openai_model: String,

    /// Default sampling temperature for worker completions.
    pub openai_temperature: f32,

    /// Tavily search API key.
    pub tavily_api_key: String,

    /// SQLite file path for the primary status store.
    pub store_path: String,

    /// Sliding TTL for task records.
    pub task_ttl: Duration,

    /// Supervisor-turn ceiling per graph invocation.
    pub recursion_limit: usize,
}

impl Settings {
    /// Load settings from the environment, applying defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `OPENAI_API_KEY` or
    /// `TAVILY_API_KEY` is absent, or [`ConfigError::Invalid`] when a
    /// numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: var_or("POSTASSIST_HOST", "0.0.0.0"),
            port: parse_var("POSTASSIST_PORT", 8000)?,
            openai_api_key: require("OPENAI_API_KEY")?,
            openai_model: var_or("OPENAI_MODEL", "gpt-4o-mini"),
            openai_temperature: parse_var("OPENAI_TEMPERATURE", 0.7)?,
            tavily_api_key: require("TAVILY_API_KEY")?,
            store_path: var_or("POSTASSIST_STORE_PATH", "postassist.db"),
            task_ttl: Duration::from_secs(parse_var(
                "POSTASSIST_TASK_TTL_SECS",
                DEFAULT_TASK_TTL.as_secs(),
            )?),
            recursion_limit: parse_var("POSTASSIST_RECURSION_LIMIT", DEFAULT_RECURSION_LIMIT)?,
        })
    }

    /// Settings suitable for tests: no real keys, in-memory-ish defaults.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            openai_api_key: "test-key".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            openai_temperature: 0.7,
            tavily_api_key: "test-key".to_string(),
            store_path: String::new(),
            task_ttl: DEFAULT_TASK_TTL,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: name,
                value: raw,
            })
        }
        _ => Ok(default),
    }
}
