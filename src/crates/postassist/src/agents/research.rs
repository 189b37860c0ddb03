//! The paper research worker.
//!
//! Unlike the plain prompt workers, the researcher makes a web search call
//! before its completion turn and hands the results to the model as extra
//! context. The search query is the paper title seeded into the team state
//! at entry, falling back to the task request text.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use teamgraph::llm::{CompletionModel, CompletionRequest, SearchProvider, SearchResult};
use teamgraph::{GraphError, GraphNode, Message, StateUpdate, TeamState};

use crate::agents::{PAPER_RESEARCHER, RESEARCHER_PROMPT};

/// State field carrying the paper title into the content team.
pub const PAPER_TITLE_FIELD: &str = "paper_title";

/// State field the researcher writes its notes into.
pub const RESEARCH_NOTES_FIELD: &str = "research_notes";

/// Worker that researches a paper via web search plus one completion turn.
pub struct ResearchNode {
    model: Arc<dyn CompletionModel>,
    search: Arc<dyn SearchProvider>,
}

impl ResearchNode {
    /// Create the researcher.
    pub fn new(model: Arc<dyn CompletionModel>, search: Arc<dyn SearchProvider>) -> Self {
        Self { model, search }
    }

    fn query_for(state: &TeamState) -> Option<String> {
        state
            .fields
            .get(PAPER_TITLE_FIELD)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .or_else(|| state.messages.first().map(|m| m.content.clone()))
    }
}

fn render_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No search results found.".to_string();
    }
    results
        .iter()
        .map(|r| format!("- {} ({})\n  {}", r.title, r.url, r.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl GraphNode for ResearchNode {
    fn name(&self) -> &str {
        PAPER_RESEARCHER
    }

    async fn invoke(&self, state: &TeamState) -> Result<StateUpdate, GraphError> {
        let query = Self::query_for(state).ok_or_else(|| {
            GraphError::Validation("researcher invoked with an empty conversation".to_string())
        })?;

        let results = self
            .search
            .search(&query)
            .await
            .map_err(|e| GraphError::upstream(PAPER_RESEARCHER, e.to_string()))?;
        let notes = render_results(&results);
        tracing::debug!(query = %query, results = results.len(), "paper search complete");

        let mut messages = state.messages.clone();
        messages.push(Message::new(format!(
            "Web search results for '{query}':\n{notes}"
        )));

        let output = self
            .model
            .complete(CompletionRequest::new(RESEARCHER_PROMPT, messages))
            .await
            .map_err(|e| GraphError::upstream(PAPER_RESEARCHER, e.to_string()))?;

        Ok(
            StateUpdate::message(Message::from_worker(PAPER_RESEARCHER, output))
                .with_field(RESEARCH_NOTES_FIELD, json!(notes)),
        )
    }
}
