//! Verification workers.
//!
//! Each verifier runs the matching heuristic scan over the post under
//! review and hands the rendered findings to the model alongside the
//! conversation, so the written review is anchored on concrete issues
//! rather than free association.

use std::sync::Arc;

use async_trait::async_trait;

use teamgraph::llm::{CompletionModel, CompletionRequest};
use teamgraph::{GraphError, GraphNode, Message, StateUpdate, TeamState};

use crate::verify;

/// Which heuristic scan a verifier runs.
#[derive(Debug, Clone, Copy)]
pub enum VerifyMode {
    /// Overstatement and attribution checks.
    Technical,
    /// LinkedIn formatting conventions.
    Style,
}

/// Worker that reviews the latest post draft.
pub struct VerifierNode {
    name: String,
    system_prompt: String,
    mode: VerifyMode,
    model: Arc<dyn CompletionModel>,
}

impl VerifierNode {
    /// Create a verifier.
    pub fn new(
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        mode: VerifyMode,
        model: Arc<dyn CompletionModel>,
    ) -> Self {
        Self {
            name: name.into(),
            system_prompt: system_prompt.into(),
            mode,
            model,
        }
    }
}

#[async_trait]
impl GraphNode for VerifierNode {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, state: &TeamState) -> Result<StateUpdate, GraphError> {
        let post = state.last_message().map(|m| m.content.as_str()).ok_or_else(|| {
            GraphError::Validation(format!(
                "verifier '{}' invoked with an empty conversation",
                self.name
            ))
        })?;

        let rendered = match self.mode {
            VerifyMode::Technical => verify::render_section(
                "AUTOMATED TECHNICAL ACCURACY SCAN",
                &verify::verify_technical(post),
            ),
            VerifyMode::Style => {
                verify::render_section("AUTOMATED STYLE SCAN", &verify::check_style(post))
            }
        };

        let mut messages = state.messages.clone();
        messages.push(Message::new(rendered));

        let output = self
            .model
            .complete(CompletionRequest::new(self.system_prompt.clone(), messages))
            .await
            .map_err(|e| GraphError::upstream(&self.name, e.to_string()))?;

        Ok(StateUpdate::message(Message::from_worker(
            &self.name, output,
        )))
    }
}
