//! Closed-set routing protocol.
//!
//! A [`Supervisor`] turns the conversation so far into exactly one value
//! from `members ∪ {FINISH}` by delegating to the completion service's
//! constrained-choice mode and validating the answer at this boundary. The
//! external service is unconstrained text output underneath, so this module
//! is the single place where the closed-set guarantee is enforced: anything
//! outside the set is retried with a corrective instruction, and only an
//! exhausted retry budget becomes a [`GraphError::Routing`].

use std::sync::Arc;

use crate::error::{GraphError, Result};
use crate::llm::{CompletionModel, CompletionRequest};
use crate::message::Message;
use crate::state::FINISH;

/// Default number of attempts before an off-set answer becomes fatal.
const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Outcome of one supervisor turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Run the named member next.
    Next(String),

    /// Terminate the invocation.
    Finish,
}

impl RouteDecision {
    /// The routed name, with [`FINISH`] for the terminal decision.
    pub fn as_str(&self) -> &str {
        match self {
            RouteDecision::Next(name) => name,
            RouteDecision::Finish => FINISH,
        }
    }
}

/// Routing decision node for one team.
pub struct Supervisor {
    name: String,
    system_prompt: String,
    members: Vec<String>,
    model: Arc<dyn CompletionModel>,
    max_attempts: usize,
}

impl Supervisor {
    /// Create a supervisor over a fixed member set.
    ///
    /// A `{team_members}` placeholder in the prompt is substituted with the
    /// comma-separated member list.
    pub fn new(
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        members: Vec<String>,
        model: Arc<dyn CompletionModel>,
    ) -> Self {
        let prompt = system_prompt
            .into()
            .replace("{team_members}", &members.join(", "));
        Self {
            name: name.into(),
            system_prompt: prompt,
            members,
            model,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the attempt budget (minimum 1).
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Supervisor name, used for step events and error context.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared member names.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Decide who acts next given the conversation so far.
    ///
    /// The returned decision is always inside the declared set; an answer
    /// that cannot be normalized into the set after the attempt budget is a
    /// [`GraphError::Routing`].
    pub async fn decide(&self, conversation: &[Message]) -> Result<RouteDecision> {
        let options: Vec<String> = self
            .members
            .iter()
            .cloned()
            .chain(std::iter::once(FINISH.to_string()))
            .collect();

        let mut messages = conversation.to_vec();
        messages.push(Message::new(format!(
            "Given the conversation above, who should act next? Or should we {FINISH}? \
             Select one of: {}",
            options.join(", ")
        )));

        let mut last_raw = String::new();
        for attempt in 1..=self.max_attempts {
            let request = CompletionRequest::new(self.system_prompt.clone(), messages.clone());
            let raw = self
                .model
                .choose(request, &options)
                .await
                .map_err(|e| GraphError::upstream(&self.name, e.to_string()))?;

            if let Some(decision) = self.normalize(&raw) {
                tracing::debug!(
                    supervisor = %self.name,
                    decision = decision.as_str(),
                    attempt,
                    "routing decision"
                );
                return Ok(decision);
            }

            tracing::warn!(
                supervisor = %self.name,
                response = %raw,
                attempt,
                "routing response outside declared member set"
            );
            messages.push(Message::new(format!(
                "'{raw}' is not a valid choice. Respond with exactly one of: {}",
                options.join(", ")
            )));
            last_raw = raw;
        }

        Err(GraphError::Routing {
            supervisor: self.name.clone(),
            node: last_raw,
        })
    }

    /// Map a raw response into the closed set, or reject it.
    ///
    /// Exact match after trimming wins; a case-insensitive match is accepted
    /// as a fallback before the response counts as a violation.
    fn normalize(&self, raw: &str) -> Option<RouteDecision> {
        let trimmed = raw.trim();
        if trimmed == FINISH {
            return Some(RouteDecision::Finish);
        }
        if let Some(member) = self.members.iter().find(|m| m.as_str() == trimmed) {
            return Some(RouteDecision::Next(member.clone()));
        }

        if trimmed.eq_ignore_ascii_case(FINISH) {
            return Some(RouteDecision::Finish);
        }
        self.members
            .iter()
            .find(|m| m.eq_ignore_ascii_case(trimmed))
            .map(|m| RouteDecision::Next(m.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{UpstreamError, UpstreamResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays a scripted sequence of responses.
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

    fn supervisor(model: Arc<dyn CompletionModel>) -> Supervisor {
        Supervisor::new(
            "content_supervisor",
            "You manage: {team_members}.",
            vec!["Researcher".into(), "Writer".into()],
            model,
        )
    }

    #[tokio::test]
    async fn test_decide_accepts_declared_member() {
        let sup = supervisor(ScriptedModel::new(&["Researcher"]));
        let decision = sup.decide(&[Message::new("go")]).await.unwrap();
        assert_eq!(decision, RouteDecision::Next("Researcher".into()));
    }

    #[tokio::test]
    async fn test_decide_accepts_finish() {
        let sup = supervisor(ScriptedModel::new(&["FINISH"]));
        let decision = sup.decide(&[Message::new("go")]).await.unwrap();
        assert_eq!(decision, RouteDecision::Finish);
    }

    #[tokio::test]
    async fn test_decide_retries_then_accepts() {
        let sup = supervisor(ScriptedModel::new(&["Ghost", "Writer"]));
        let decision = sup.decide(&[Message::new("go")]).await.unwrap();
        assert_eq!(decision, RouteDecision::Next("Writer".into()));
    }

    #[tokio::test]
    async fn test_decide_case_insensitive_fallback() {
        let sup = supervisor(ScriptedModel::new(&["  writer "]));
        let decision = sup.decide(&[Message::new("go")]).await.unwrap();
        assert_eq!(decision, RouteDecision::Next("Writer".into()));
    }

    #[tokio::test]
    async fn test_decide_exhausted_budget_is_routing_error() {
        let sup = supervisor(ScriptedModel::new(&["Ghost", "Ghoul", "Gremlin"]));
        let err = sup.decide(&[Message::new("go")]).await.unwrap_err();
        match err {
            GraphError::Routing { supervisor, node } => {
                assert_eq!(supervisor, "content_supervisor");
                assert_eq!(node, "Gremlin");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_prompt_placeholder_substitution() {
        let sup = supervisor(ScriptedModel::new(&["FINISH"]));
        assert!(sup.system_prompt.contains("Researcher, Writer"));
    }
}
