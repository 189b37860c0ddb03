//! Traits for the external completion and search collaborators.
//!
//! `teamgraph` is an orchestration engine, not an LLM client library: the
//! engine depends on these narrow traits and provider crates implement them.
//! The one capability the engine genuinely requires beyond plain completion
//! is the constrained single-value mode used by supervisors
//! ([`CompletionModel::choose`]) - providers must return exactly one value
//! from a closed option set, or their best unconstrained attempt, which the
//! routing protocol then validates and retries.

use async_trait::async_trait;
use thiserror::Error;

use crate::message::Message;

/// Failure of an external completion or search call.
///
/// Carries only the provider's message; node context is attached by the
/// caller (see [`GraphError::Upstream`](crate::GraphError::Upstream)).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UpstreamError(pub String);

impl UpstreamError {
    /// Create an upstream error from any displayable cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Result alias for provider calls.
pub type UpstreamResult<T> = std::result::Result<T, UpstreamError>;

/// A prompt/conversation pair sent to a completion service.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System prompt establishing the caller's role.
    pub system: String,

    /// Conversation so far, oldest first.
    pub messages: Vec<Message>,

    /// Sampling temperature override, if any.
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Build a request from a system prompt and conversation log.
    pub fn new(system: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            system: system.into(),
            messages,
            temperature: None,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Chat completion service.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Generate a free-text completion for the request.
    async fn complete(&self, request: CompletionRequest) -> UpstreamResult<String>;

    /// Generate a single value, constrained to `options` where the provider
    /// supports it.
    ///
    /// Providers that can force structured output (function calling, JSON
    /// schema) should use it; others may return unconstrained text. Callers
    /// must not trust the result to be in `options` - the routing protocol
    /// validates it.
    async fn choose(&self, request: CompletionRequest, options: &[String])
        -> UpstreamResult<String>;
}

/// One ranked result from a search provider.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Result title.
    pub title: String,

    /// Source URL.
    pub url: String,

    /// Extracted content snippet.
    pub content: String,
}

/// Web search service.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run a query and return ranked results, best first.
    async fn search(&self, query: &str) -> UpstreamResult<Vec<SearchResult>>;
}
