//! Provider configuration.

use std::time::Duration;

/// Default per-call timeout for provider HTTP requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

/// Configuration for an OpenAI-compatible completion endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key sent as a bearer token.
    pub api_key: String,

    /// Base URL, e.g. `https://api.openai.com/v1`.
    pub base_url: String,

    /// Model identifier, e.g. `gpt-4o-mini`.
    pub model: String,

    /// Default sampling temperature.
    pub temperature: f32,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Create a configuration with the standard OpenAI endpoint.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
            temperature: 0.7,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the endpoint base URL (for compatible providers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the default temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Configuration for the Tavily search API.
#[derive(Debug, Clone)]
pub struct TavilyConfig {
    /// Tavily API key.
    pub api_key: String,

    /// API base URL.
    pub base_url: String,

    /// Maximum results per query.
    pub max_results: usize,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl TavilyConfig {
    /// Create a configuration with the standard Tavily endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.tavily.com".to_string(),
            max_results: 5,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the maximum result count.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_defaults() {
        let config = OpenAiConfig::new("sk-test", "gpt-4o-mini");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.temperature, 0.7);
    }

    #[test]
    fn test_builder_overrides() {
        let config = OpenAiConfig::new("sk-test", "gpt-4o-mini")
            .with_base_url("http://localhost:8080/v1")
            .with_temperature(0.0);
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.temperature, 0.0);
    }
}
