//! The uniform node seam and the prompt-driven worker.
//!
//! Everything a supervisor can route to implements [`GraphNode`]: plain
//! workers, and compiled teams wrapped by an adapter
//! ([`TeamNode`](crate::subgraph::TeamNode)). A node receives the current
//! state read-only and emits a partial [`StateUpdate`]; the run loop owns
//! the merge.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{GraphError, Result};
use crate::llm::{CompletionModel, CompletionRequest};
use crate::message::Message;
use crate::state::{StateUpdate, TeamState};

/// One routable unit of work inside a team.
#[async_trait]
pub trait GraphNode: Send + Sync {
    /// Unique name the supervisor routes by.
    fn name(&self) -> &str;

    /// Run one turn against the current state.
    ///
    /// Implementations must not assume they will be called again; every
    /// turn's output goes into the conversation log via the returned update.
    async fn invoke(&self, state: &TeamState) -> Result<StateUpdate>;
}

/// A worker that performs one completion call per turn.
///
/// The worker sends its system prompt plus the full conversation log to the
/// completion service and appends the response to the log under its own
/// name. Upstream failures abort the invocation; the engine never retries a
/// worker call.
pub struct WorkerNode {
    name: String,
    system_prompt: String,
    model: Arc<dyn CompletionModel>,
}

impl WorkerNode {
    /// Create a worker with a name, system prompt, and completion service.
    ///
    /// A standard autonomy suffix is appended to the prompt so workers act
    /// without asking for clarification, mirroring how their peers are
    /// prompted.
    pub fn new(
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        model: Arc<dyn CompletionModel>,
    ) -> Self {
        let mut prompt = system_prompt.into();
        prompt.push_str(
            "\nWork autonomously according to your specialty, using the context available to you. \
             Do not ask for clarification. Your other team members (and other teams) will \
             collaborate with you with their own specialties.",
        );
        Self {
            name: name.into(),
            system_prompt: prompt,
            model,
        }
    }
}

#[async_trait]
impl GraphNode for WorkerNode {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, state: &TeamState) -> Result<StateUpdate> {
        let request = CompletionRequest::new(self.system_prompt.clone(), state.messages.clone());
        let output = self
            .model
            .complete(request)
            .await
            .map_err(|e| GraphError::upstream(&self.name, e.to_string()))?;

        tracing::debug!(worker = %self.name, chars = output.len(), "worker turn complete");
        Ok(StateUpdate::message(Message::from_worker(
            &self.name, output,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{UpstreamError, UpstreamResult};

    struct EchoModel;

    #[async_trait]
    impl CompletionModel for EchoModel {
        async fn complete(&self, request: CompletionRequest) -> UpstreamResult<String> {
            Ok(format!("echo:{}", request.messages.len()))
        }

        async fn choose(
            &self,
            _request: CompletionRequest,
            options: &[String],
        ) -> UpstreamResult<String> {
            Ok(options[0].clone())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl CompletionModel for FailingModel {
        async fn complete(&self, _request: CompletionRequest) -> UpstreamResult<String> {
            Err(UpstreamError::new("service unavailable"))
        }

        async fn choose(
            &self,
            _request: CompletionRequest,
            _options: &[String],
        ) -> UpstreamResult<String> {
            Err(UpstreamError::new("service unavailable"))
        }
    }

    #[tokio::test]
    async fn test_worker_appends_attributed_message() {
        let worker = WorkerNode::new("Researcher", "You research.", Arc::new(EchoModel));
        let state = TeamState::from_message(Message::new("go"));

        let update = worker.invoke(&state).await.unwrap();
        assert_eq!(update.messages.len(), 1);
        assert_eq!(update.messages[0].name.as_deref(), Some("Researcher"));
        assert_eq!(update.messages[0].content, "echo:1");
    }

    #[tokio::test]
    async fn test_worker_maps_upstream_failure() {
        let worker = WorkerNode::new("Researcher", "You research.", Arc::new(FailingModel));
        let state = TeamState::from_message(Message::new("go"));

        let err = worker.invoke(&state).await.unwrap_err();
        match err {
            GraphError::Upstream { node, message } => {
                assert_eq!(node, "Researcher");
                assert_eq!(message, "service unavailable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
