//! Tavily web search client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use teamgraph::llm::{SearchProvider, SearchResult, UpstreamResult};

use crate::config::TavilyConfig;
use crate::error::LlmError;

/// Tavily search API client.
#[derive(Clone)]
pub struct TavilyClient {
    config: TavilyConfig,
    client: Client,
}

impl TavilyClient {
    /// Create a client with the given configuration.
    ///
    /// # Errors
    ///
    /// Fails if the underlying HTTP client cannot be constructed.
    pub fn new(config: TavilyConfig) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    async fn run_search(&self, query: &str) -> Result<Vec<SearchResult>, LlmError> {
        let url = format!("{}/search", self.config.base_url);
        let body = SearchRequestBody {
            api_key: &self.config.api_key,
            query,
            max_results: self.config.max_results,
        };

        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let mut message = response.text().await.unwrap_or_default();
            message.truncate(500);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed = response.json::<SearchResponse>().await?;
        tracing::debug!(query, results = parsed.results.len(), "search completed");

        Ok(parsed
            .results
            .into_iter()
            .map(|r| SearchResult {
                title: r.title,
                url: r.url,
                content: r.content,
            })
            .collect())
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str) -> UpstreamResult<Vec<SearchResult>> {
        self.run_search(query).await.map_err(LlmError::into)
    }
}

#[derive(Debug, Serialize)]
struct SearchRequestBody<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<ApiResult>,
}

#[derive(Debug, Deserialize)]
struct ApiResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_search_response() {
        let parsed: SearchResponse = serde_json::from_value(json!({
            "query": "attention is all you need",
            "results": [
                {"title": "Attention Is All You Need", "url": "https://arxiv.org/abs/1706.03762", "content": "The Transformer..."},
                {"title": "Annotated Transformer", "url": "https://example.com", "content": "walkthrough"}
            ]
        }))
        .unwrap();

        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[0].title, "Attention Is All You Need");
    }

    #[test]
    fn test_parse_empty_results() {
        let parsed: SearchResponse = serde_json::from_value(json!({"query": "x"})).unwrap();
        assert!(parsed.results.is_empty());
    }
}
