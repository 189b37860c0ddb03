//! Provider error types.

use teamgraph::llm::UpstreamError;
use thiserror::Error;

/// Errors from provider HTTP calls.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the provider.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Provider error body, truncated.
        message: String,
    },

    /// Response body did not match the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<LlmError> for UpstreamError {
    fn from(err: LlmError) -> Self {
        UpstreamError::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = LlmError::Api {
            status: 429,
            message: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "API error (429): rate limited");

        let upstream: UpstreamError = err.into();
        assert!(upstream.to_string().contains("429"));
    }
}
