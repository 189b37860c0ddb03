//! Team builder, validation, and the compiled run loop.
//!
//! A team is a state machine with a fixed transition structure: the
//! supervisor is the entry point, every worker unconditionally hands control
//! back to the supervisor, and the supervisor's decision is the only
//! conditional edge - to a declared member or to the terminal sentinel.
//! Workers never invoke each other directly.
//!
//! [`TeamGraph`] is the mutable builder; [`TeamGraph::compile`] validates
//! the structure and produces an immutable [`CompiledTeam`] that can be run
//! any number of times, each run over its own fresh state. Execution within
//! one run is strictly sequential: the supervisor always observes the full,
//! consistent conversation log before deciding.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{GraphError, Result};
use crate::node::GraphNode;
use crate::state::{TeamState, FINISH};
use crate::stream::{emit, StepEvent, StepSender};
use crate::supervisor::{RouteDecision, Supervisor};

/// Default ceiling on supervisor turns per invocation.
pub const DEFAULT_RECURSION_LIMIT: usize = 50;

/// Builder for a team of workers under one supervisor.
pub struct TeamGraph {
    name: String,
    workers: Vec<Arc<dyn GraphNode>>,
    supervisor: Option<Supervisor>,
    recursion_limit: usize,
}

impl TeamGraph {
    /// Start building a named team.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            workers: Vec::new(),
            supervisor: None,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    /// Add a worker node (or a nested team adapter).
    pub fn add_worker(&mut self, node: Arc<dyn GraphNode>) -> &mut Self {
        self.workers.push(node);
        self
    }

    /// Set the routing supervisor. Exactly one is required.
    pub fn set_supervisor(&mut self, supervisor: Supervisor) -> &mut Self {
        self.supervisor = Some(supervisor);
        self
    }

    /// Override the supervisor-turn ceiling (minimum 1).
    pub fn with_recursion_limit(&mut self, limit: usize) -> &mut Self {
        self.recursion_limit = limit.max(1);
        self
    }

    /// Validate the structure and produce an executable team.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Validation`] when the team has no supervisor or
    /// no workers, when worker names collide or use the reserved sentinel,
    /// or when the supervisor's declared member set does not match the
    /// registered workers.
    pub fn compile(self) -> Result<CompiledTeam> {
        let supervisor = self
            .supervisor
            .ok_or_else(|| GraphError::Validation(format!("team '{}' has no supervisor", self.name)))?;
        if self.workers.is_empty() {
            return Err(GraphError::Validation(format!(
                "team '{}' has no workers",
                self.name
            )));
        }

        let mut workers: HashMap<String, Arc<dyn GraphNode>> = HashMap::new();
        for node in self.workers {
            let name = node.name().to_string();
            if name == FINISH {
                return Err(GraphError::Validation(format!(
                    "'{FINISH}' is reserved and cannot be a worker name"
                )));
            }
            if workers.insert(name.clone(), node).is_some() {
                return Err(GraphError::Validation(format!(
                    "duplicate worker name '{name}' in team '{}'",
                    self.name
                )));
            }
        }

        for member in supervisor.members() {
            if !workers.contains_key(member) {
                return Err(GraphError::Validation(format!(
                    "supervisor member '{member}' has no registered worker in team '{}'",
                    self.name
                )));
            }
        }
        for name in workers.keys() {
            if !supervisor.members().contains(name) {
                return Err(GraphError::Validation(format!(
                    "worker '{name}' is not in the supervisor's member set of team '{}'",
                    self.name
                )));
            }
        }

        Ok(CompiledTeam {
            name: self.name,
            supervisor,
            workers,
            recursion_limit: self.recursion_limit,
        })
    }
}

/// An executable team state machine.
pub struct CompiledTeam {
    name: String,
    supervisor: Supervisor,
    workers: HashMap<String, Arc<dyn GraphNode>>,
    recursion_limit: usize,
}

impl CompiledTeam {
    /// Team name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared member names, in the supervisor's declaration order.
    pub fn member_names(&self) -> &[String] {
        self.supervisor.members()
    }

    /// Run the team to termination over a fresh state.
    ///
    /// Every completed node turn is published on `steps` when a sender is
    /// given. The returned state carries the full conversation log with
    /// `next` set to the terminal sentinel.
    ///
    /// # Errors
    ///
    /// - [`GraphError::RecursionExceeded`] when supervisor turns pass the
    ///   configured ceiling.
    /// - [`GraphError::Routing`] when the routing protocol cannot settle on
    ///   a declared member.
    /// - [`GraphError::Upstream`] when a worker's external call fails; the
    ///   invocation aborts with no partial-team retry.
    pub async fn run(&self, initial: TeamState, steps: Option<StepSender>) -> Result<TeamState> {
        let mut state = initial;
        let mut supervisor_turns = 0usize;

        loop {
            supervisor_turns += 1;
            if supervisor_turns > self.recursion_limit {
                tracing::error!(team = %self.name, limit = self.recursion_limit, "routing ceiling hit");
                return Err(GraphError::RecursionExceeded {
                    limit: self.recursion_limit,
                });
            }

            let decision = self.supervisor.decide(&state.messages).await?;
            emit(
                steps.as_ref(),
                StepEvent::routed(&self.name, self.supervisor.name(), decision.as_str()),
            );

            match decision {
                RouteDecision::Finish => {
                    state.next = Some(FINISH.to_string());
                    tracing::debug!(team = %self.name, turns = supervisor_turns, "team finished");
                    return Ok(state);
                }
                RouteDecision::Next(name) => {
                    // The protocol already validated the name; this guards the
                    // machine itself against an inconsistent member set.
                    let node = self.workers.get(&name).ok_or_else(|| GraphError::Routing {
                        supervisor: self.supervisor.name().to_string(),
                        node: name.clone(),
                    })?;

                    state.next = Some(name.clone());
                    let update = node.invoke(&state).await?;
                    state.apply(update.clone());
                    emit(
                        steps.as_ref(),
                        StepEvent::node_complete(&self.name, &name, update),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CompletionModel, CompletionRequest, UpstreamError, UpstreamResult};
    use crate::message::Message;
    use crate::state::StateUpdate;
    use async_trait::async_trait;
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

    struct StaticWorker {
        name: String,
        output: String,
    }

    impl StaticWorker {
        fn new(name: &str, output: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.into(),
                output: output.into(),
            })
        }
    }

    #[async_trait]
    impl GraphNode for StaticWorker {
        fn name(&self) -> &str {
            &self.name
        }

        async fn invoke(&self, _state: &TeamState) -> Result<StateUpdate> {
            Ok(StateUpdate::message(Message::from_worker(
                &self.name,
                &self.output,
            )))
        }
    }

    fn two_worker_team(model: Arc<dyn CompletionModel>) -> CompiledTeam {
        let mut graph = TeamGraph::new("Content team");
        graph.add_worker(StaticWorker::new("Researcher", "research done"));
        graph.add_worker(StaticWorker::new("Writer", "draft done"));
        graph.set_supervisor(Supervisor::new(
            "content_supervisor",
            "coordinate",
            vec!["Researcher".into(), "Writer".into()],
            model,
        ));
        graph.compile().unwrap()
    }

    #[tokio::test]
    async fn test_run_routes_in_scripted_order() {
        let team = two_worker_team(ScriptedModel::new(&["Researcher", "Writer", "FINISH"]));
        let final_state = team
            .run(TeamState::from_message(Message::new("go")), None)
            .await
            .unwrap();

        let authors: Vec<_> = final_state
            .messages
            .iter()
            .filter_map(|m| m.name.as_deref())
            .collect();
        assert_eq!(authors, vec!["Researcher", "Writer"]);
        assert_eq!(final_state.next.as_deref(), Some(FINISH));
    }

    #[tokio::test]
    async fn test_immediate_finish_runs_no_workers() {
        let team = two_worker_team(ScriptedModel::new(&["FINISH"]));
        let (tx, mut rx) = crate::stream::step_channel();

        let final_state = team
            .run(TeamState::from_message(Message::new("go")), Some(tx))
            .await
            .unwrap();

        // Only the initial message survives; no worker ever ran.
        assert_eq!(final_state.messages.len(), 1);

        // One routing event, nothing after the terminal decision.
        let first = rx.recv().await.unwrap();
        assert_eq!(first.routed_to.as_deref(), Some(FINISH));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_recursion_ceiling() {
        let mut graph = TeamGraph::new("loop team");
        graph.add_worker(StaticWorker::new("Researcher", "again"));
        graph.set_supervisor(Supervisor::new(
            "sup",
            "coordinate",
            vec!["Researcher".into()],
            ScriptedModel::new(&["Researcher"; 10]),
        ));
        graph.with_recursion_limit(3);
        let team = graph.compile().unwrap();

        let err = team
            .run(TeamState::from_message(Message::new("go")), None)
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::RecursionExceeded { limit: 3 }));
    }

    #[tokio::test]
    async fn test_worker_failure_aborts_run() {
        struct FailingWorker;

        #[async_trait]
        impl GraphNode for FailingWorker {
            fn name(&self) -> &str {
                "Researcher"
            }

            async fn invoke(&self, _state: &TeamState) -> Result<StateUpdate> {
                Err(GraphError::upstream("Researcher", "search backend down"))
            }
        }

        let mut graph = TeamGraph::new("t");
        graph.add_worker(Arc::new(FailingWorker));
        graph.set_supervisor(Supervisor::new(
            "sup",
            "coordinate",
            vec!["Researcher".into()],
            ScriptedModel::new(&["Researcher"]),
        ));
        let team = graph.compile().unwrap();

        let err = team
            .run(TeamState::from_message(Message::new("go")), None)
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_compile_rejects_member_mismatch() {
        let mut graph = TeamGraph::new("t");
        graph.add_worker(StaticWorker::new("Researcher", "x"));
        graph.set_supervisor(Supervisor::new(
            "sup",
            "coordinate",
            vec!["Researcher".into(), "Ghost".into()],
            ScriptedModel::new(&[]),
        ));
        assert!(matches!(
            graph.compile(),
            Err(GraphError::Validation(msg)) if msg.contains("Ghost")
        ));
    }

    #[tokio::test]
    async fn test_compile_rejects_reserved_name() {
        let mut graph = TeamGraph::new("t");
        graph.add_worker(StaticWorker::new(FINISH, "x"));
        graph.set_supervisor(Supervisor::new(
            "sup",
            "coordinate",
            vec![FINISH.into()],
            ScriptedModel::new(&[]),
        ));
        assert!(matches!(graph.compile(), Err(GraphError::Validation(_))));
    }

    #[tokio::test]
    async fn test_compile_rejects_missing_supervisor() {
        let mut graph = TeamGraph::new("t");
        graph.add_worker(StaticWorker::new("Researcher", "x"));
        assert!(matches!(graph.compile(), Err(GraphError::Validation(_))));
    }
}
