//! Entry/exit adapters for nesting compiled teams.
//!
//! A meta graph is just a team whose members are themselves compiled teams.
//! [`TeamNode`] is the adapter pair that makes that composition opaque:
//!
//! - *entry*: the outer state's last message becomes the inner team's entire
//!   initial state;
//! - *exit*: the inner team's last message comes back as one outer message
//!   authored by the team.
//!
//! The outer graph never sees the inner graph's field names, so teams nest
//! to arbitrary depth over a single-message interface.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{GraphError, Result};
use crate::graph::CompiledTeam;
use crate::message::Message;
use crate::node::GraphNode;
use crate::state::{StateUpdate, TeamState};
use crate::stream::StepSender;

/// Adapter presenting a compiled team as a single worker node.
pub struct TeamNode {
    name: String,
    team: Arc<CompiledTeam>,
    steps: Option<StepSender>,
    seed_fields: Map<String, Value>,
}

impl TeamNode {
    /// Wrap a compiled team under the given member name.
    pub fn new(name: impl Into<String>, team: Arc<CompiledTeam>) -> Self {
        Self {
            name: name.into(),
            team,
            steps: None,
            seed_fields: Map::new(),
        }
    }

    /// Forward the inner team's step events to the given sender.
    ///
    /// Without this, inner worker turns are invisible to consumers; the
    /// outer graph still emits one event when the whole team completes.
    pub fn with_step_sender(mut self, steps: StepSender) -> Self {
        self.steps = Some(steps);
        self
    }

    /// Seed scalar fields into the inner team's initial state.
    pub fn with_seed_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.seed_fields.insert(key.into(), value);
        self
    }
}

#[async_trait]
impl GraphNode for TeamNode {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, state: &TeamState) -> Result<StateUpdate> {
        let last = state.last_message().ok_or_else(|| {
            GraphError::Validation(format!(
                "team '{}' invoked with an empty conversation",
                self.name
            ))
        })?;

        // Entry adapter: the inner run starts from the outer last message
        // alone, unattributed, plus any seeded fields.
        let mut initial = TeamState::from_message(Message::new(last.content.clone()));
        initial.fields = self.seed_fields.clone();

        tracing::info!(team = %self.name, "entering nested team");
        let final_state = self.team.run(initial, self.steps.clone()).await?;

        // Exit adapter: only the inner last message crosses back out.
        let output = final_state
            .last_message()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        Ok(StateUpdate::message(Message::from_worker(
            &self.name, output,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TeamGraph;
    use crate::llm::{CompletionModel, CompletionRequest, UpstreamError, UpstreamResult};
    use crate::supervisor::Supervisor;
    use std::sync::Mutex;

    struct ScriptedModel {
        responses: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(responses: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.iter().rev().map(|s| s.to_string()).collect()),
            })
        }
    }

    #[async_trait]
    impl CompletionModel for ScriptedModel {
        async fn complete(&self, _request: CompletionRequest) -> UpstreamResult<String> {
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| UpstreamError::new("script exhausted"))
        }

        async fn choose(
            &self,
            request: CompletionRequest,
            _options: &[String],
        ) -> UpstreamResult<String> {
            self.complete(request).await
        }
    }

    struct StaticWorker;

    #[async_trait]
    impl GraphNode for StaticWorker {
        fn name(&self) -> &str {
            "Researcher"
        }

        async fn invoke(&self, _state: &TeamState) -> Result<StateUpdate> {
            Ok(StateUpdate::message(Message::from_worker(
                "Researcher",
                "inner findings",
            )))
        }
    }

    fn inner_team(model: Arc<dyn CompletionModel>) -> Arc<CompiledTeam> {
        let mut graph = TeamGraph::new("Content team");
        graph.add_worker(Arc::new(StaticWorker));
        graph.set_supervisor(Supervisor::new(
            "content_supervisor",
            "coordinate",
            vec!["Researcher".into()],
            model,
        ));
        Arc::new(graph.compile().unwrap())
    }

    #[tokio::test]
    async fn test_adapter_round_trip() {
        let team = inner_team(ScriptedModel::new(&["Researcher", "FINISH"]));
        let node = TeamNode::new("Content team", team);

        let outer = TeamState::from_message(Message::new("write about X"));
        let update = node.invoke(&outer).await.unwrap();

        assert_eq!(update.messages.len(), 1);
        assert_eq!(update.messages[0].name.as_deref(), Some("Content team"));
        assert_eq!(update.messages[0].content, "inner findings");
    }

    #[tokio::test]
    async fn test_inner_steps_forwarded() {
        let team = inner_team(ScriptedModel::new(&["Researcher", "FINISH"]));
        let (tx, mut rx) = crate::stream::step_channel();
        let node = TeamNode::new("Content team", team).with_step_sender(tx);

        let outer = TeamState::from_message(Message::new("write about X"));
        node.invoke(&outer).await.unwrap();

        let graphs: Vec<String> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.graph)
            .collect();
        assert!(!graphs.is_empty());
        assert!(graphs.iter().all(|g| g == "Content team"));
    }

    #[tokio::test]
    async fn test_empty_conversation_rejected() {
        let team = inner_team(ScriptedModel::new(&[]));
        let node = TeamNode::new("Content team", team);

        let err = node.invoke(&TeamState::default()).await.unwrap_err();
        assert!(matches!(err, GraphError::Validation(_)));
    }
}
