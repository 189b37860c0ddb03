//! Projection of graph step events into the task status record.
//!
//! The engine knows nothing about progress percentages; the mapping from
//! node activity to externally visible status lives entirely in this
//! module's lookup table. Checkpoint fractions are hand-authored and
//! non-normative, but the projected progress is guaranteed monotonic: every
//! checkpoint is applied through `max`, and the terminal write (1.0) can
//! never be regressed by a late event.

use chrono::Utc;

use teamgraph::{StepEvent, FINISH};

use crate::agents::{
    CONTENT_TEAM, LINKEDIN_CREATOR, PAPER_RESEARCHER, STYLE_CHECKER, TECH_VERIFIER,
    VERIFICATION_TEAM,
};
use crate::models::{AgentStatus, TaskRecord, TaskStatus, TeamRecord};

/// Progress checkpoint when a task leaves the queue.
pub const CHECKPOINT_STARTING: f32 = 0.1;

/// One row of the node lookup table.
struct NodeInfo {
    team: &'static str,
    agent: &'static str,
    phase: &'static str,
    activity: &'static str,
    /// Checkpoint reached when this agent starts working.
    checkpoint: f32,
}

/// The hand-authored node table. Nodes not listed (supervisors) project no
/// agent state of their own.
fn lookup(agent: &str) -> Option<NodeInfo> {
    match agent {
        PAPER_RESEARCHER => Some(NodeInfo {
            team: CONTENT_TEAM,
            agent: PAPER_RESEARCHER,
            phase: "research",
            activity: "Searching for paper information",
            checkpoint: 0.2,
        }),
        LINKEDIN_CREATOR => Some(NodeInfo {
            team: CONTENT_TEAM,
            agent: LINKEDIN_CREATOR,
            phase: "content_creation",
            activity: "Creating engaging content",
            checkpoint: 0.3,
        }),
        TECH_VERIFIER => Some(NodeInfo {
            team: VERIFICATION_TEAM,
            agent: TECH_VERIFIER,
            phase: "verification",
            activity: "Verifying technical claims",
            checkpoint: 0.7,
        }),
        STYLE_CHECKER => Some(NodeInfo {
            team: VERIFICATION_TEAM,
            agent: STYLE_CHECKER,
            phase: "verification",
            activity: "Checking LinkedIn style compliance",
            checkpoint: 0.7,
        }),
        _ => None,
    }
}

/// Checkpoint reached when a whole team's turn completes at the meta level.
fn team_completion_checkpoint(team: &str) -> Option<f32> {
    match team {
        CONTENT_TEAM => Some(0.6),
        VERIFICATION_TEAM => Some(0.9),
        _ => None,
    }
}

/// The initial team roster for a fresh task record.
pub fn initial_teams() -> Vec<TeamRecord> {
    vec![
        TeamRecord::new(CONTENT_TEAM, &[PAPER_RESEARCHER, LINKEDIN_CREATOR]),
        TeamRecord::new(VERIFICATION_TEAM, &[TECH_VERIFIER, STYLE_CHECKER]),
    ]
}

/// Mutates a task record in response to graph step events.
///
/// Pure over the record: the caller owns persistence after each event.
pub struct Projector {
    record: TaskRecord,
}

impl Projector {
    /// Wrap a record for projection.
    pub fn new(record: TaskRecord) -> Self {
        Self { record }
    }

    /// The projected record, for persistence.
    pub fn record(&self) -> &TaskRecord {
        &self.record
    }

    /// Take the record back out.
    pub fn into_record(self) -> TaskRecord {
        self.record
    }

    /// Mark the task as started.
    pub fn start(&mut self) {
        self.record.status = TaskStatus::InProgress;
        self.record.current_step = Some("starting".to_string());
        self.record.advance_progress(CHECKPOINT_STARTING);
        self.record.touch();
    }

    /// Fold one step event into the record.
    pub fn apply(&mut self, event: &StepEvent) {
        match &event.routed_to {
            Some(target) => self.apply_routing(target),
            None => self.apply_completion(event),
        }
        self.record.touch();
    }

    /// A supervisor routed to `target` (an agent, a team, or FINISH).
    fn apply_routing(&mut self, target: &str) {
        if target == FINISH {
            return;
        }

        if let Some(info) = lookup(target) {
            self.record.phase = Some(info.phase.to_string());
            self.record.current_team = Some(info.team.to_string());
            self.record.current_step = Some(format!("{}_working", info.agent));
            self.record.detailed_status =
                Some(format!("{} is {}", info.agent, info.activity.to_lowercase()));
            self.record.advance_progress(info.checkpoint);

            if let Some(team) = self.record.team_mut(info.team) {
                team.current_focus = Some(info.activity.to_string());
                team.started_at.get_or_insert_with(Utc::now);
                if let Some(agent) = team.agent_mut(info.agent) {
                    if agent.status != AgentStatus::Completed {
                        agent.status = AgentStatus::Working;
                    }
                    agent.current_activity = Some(info.activity.to_string());
                    agent.last_update = Utc::now();
                }
                team.recompute();
            }
        } else if target == CONTENT_TEAM || target == VERIFICATION_TEAM {
            // Meta supervisor handing control to a team.
            self.record.current_team = Some(target.to_string());
            if let Some(team) = self.record.team_mut(target) {
                team.started_at.get_or_insert_with(Utc::now);
            }
        }
    }

    /// A worker (or a whole nested team) completed its turn.
    fn apply_completion(&mut self, event: &StepEvent) {
        let output = event.update.messages.last().map(|m| m.content.clone());

        if let Some(info) = lookup(&event.node) {
            if let Some(team) = self.record.team_mut(info.team) {
                if let Some(agent) = team.agent_mut(info.agent) {
                    agent.status = AgentStatus::Completed;
                    agent.progress = 1.0;
                    agent.current_activity = None;
                    if output.is_some() {
                        agent.findings = output;
                    }
                    agent.last_update = Utc::now();
                }
                team.recompute();
            }
            return;
        }

        if let Some(checkpoint) = team_completion_checkpoint(&event.node) {
            // The whole team returned to the meta supervisor; any agent the
            // inner stream missed is completed by implication.
            if let Some(team) = self.record.team_mut(&event.node) {
                for agent in &mut team.agents {
                    agent.status = AgentStatus::Completed;
                    agent.progress = 1.0;
                    agent.current_activity = None;
                    agent.last_update = Utc::now();
                }
                team.current_focus = None;
                if output.is_some() {
                    team.team_findings = output;
                }
                team.completed_at = Some(Utc::now());
                team.recompute();
            }
            self.record.advance_progress(checkpoint);
        }
    }

    /// Terminal success: attach the result and seal the record.
    pub fn complete(&mut self, result: crate::models::LinkedInPost) {
        self.record.status = TaskStatus::Completed;
        self.record.phase = Some("completion".to_string());
        self.record.current_step = Some("completed".to_string());
        self.record.current_team = None;
        self.record.result = Some(result);
        self.record.advance_progress(1.0);
        self.record.touch();
    }

    /// Terminal failure: record the error and mark active agents errored.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.record.status = TaskStatus::Failed;
        self.record.current_step = Some("failed".to_string());
        self.record.error_message = Some(message.clone());
        for team in &mut self.record.teams {
            for agent in &mut team.agents {
                if agent.status == AgentStatus::Working {
                    agent.status = AgentStatus::Error;
                    agent.error_message = Some(message.clone());
                    agent.last_update = Utc::now();
                }
            }
            team.recompute();
        }
        self.record.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use teamgraph::{Message, StateUpdate};

    fn projector() -> Projector {
        Projector::new(TaskRecord::new("t1", Value::Null, initial_teams()))
    }

    fn routed(graph: &str, supervisor: &str, target: &str) -> StepEvent {
        StepEvent::routed(graph, supervisor, target)
    }

    fn completed(graph: &str, node: &str) -> StepEvent {
        StepEvent::node_complete(graph, node, StateUpdate::message(Message::from_worker(node, "out")))
    }

    #[test]
    fn test_routing_marks_agent_working() {
        let mut p = projector();
        p.start();
        p.apply(&routed(CONTENT_TEAM, "content_supervisor", PAPER_RESEARCHER));

        let record = p.record();
        assert_eq!(record.phase.as_deref(), Some("research"));
        assert_eq!(record.current_team.as_deref(), Some(CONTENT_TEAM));
        assert!((record.progress - 0.2).abs() < f32::EPSILON);

        let team = &record.teams[0];
        assert_eq!(team.status, TaskStatus::InProgress);
        assert_eq!(team.agents[0].status, AgentStatus::Working);
    }

    #[test]
    fn test_worker_completion_updates_team_mean() {
        let mut p = projector();
        p.start();
        p.apply(&routed(CONTENT_TEAM, "content_supervisor", PAPER_RESEARCHER));
        p.apply(&completed(CONTENT_TEAM, PAPER_RESEARCHER));

        let team = &p.record().teams[0];
        assert_eq!(team.agents[0].status, AgentStatus::Completed);
        // One of two agents done.
        assert!((team.progress - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_team_completion_checkpoint_and_sweep() {
        let mut p = projector();
        p.start();
        p.apply(&routed("linkedin_meta", "meta_supervisor", CONTENT_TEAM));
        p.apply(&completed("linkedin_meta", CONTENT_TEAM));

        let record = p.record();
        assert!((record.progress - 0.6).abs() < f32::EPSILON);
        let team = &record.teams[0];
        assert_eq!(team.status, TaskStatus::Completed);
        assert!(team.agents.iter().all(|a| a.progress == 1.0));
    }

    #[test]
    fn test_progress_is_monotonic_across_events() {
        let mut p = projector();
        p.start();
        p.apply(&routed("linkedin_meta", "meta_supervisor", CONTENT_TEAM));
        p.apply(&completed("linkedin_meta", CONTENT_TEAM));
        // A late research routing event cannot pull progress back to 0.2.
        p.apply(&routed(CONTENT_TEAM, "content_supervisor", PAPER_RESEARCHER));
        assert!(p.record().progress >= 0.6);
    }

    #[test]
    fn test_finish_routing_is_inert() {
        let mut p = projector();
        p.start();
        let before = p.record().progress;
        p.apply(&routed("linkedin_meta", "meta_supervisor", FINISH));
        assert_eq!(p.record().progress, before);
    }

    #[test]
    fn test_complete_seals_the_record() {
        let mut p = projector();
        p.start();
        p.complete(crate::models::LinkedInPost::from_content("Done! #AI"));

        let record = p.record();
        assert_eq!(record.status, TaskStatus::Completed);
        assert_eq!(record.progress, 1.0);
        assert!(record.result.is_some());
    }

    #[test]
    fn test_routing_sets_detailed_status_and_start_time() {
        let mut p = projector();
        p.start();
        p.apply(&routed(CONTENT_TEAM, "content_supervisor", PAPER_RESEARCHER));

        let record = p.record();
        assert_eq!(
            record.detailed_status.as_deref(),
            Some("PaperResearcher is searching for paper information")
        );
        assert!(record.teams[0].started_at.is_some());
        assert!(record.teams[1].started_at.is_none());
    }

    #[test]
    fn test_worker_completion_captures_findings() {
        let mut p = projector();
        p.start();
        p.apply(&routed(CONTENT_TEAM, "content_supervisor", PAPER_RESEARCHER));
        p.apply(&completed(CONTENT_TEAM, PAPER_RESEARCHER));

        let agent = &p.record().teams[0].agents[0];
        assert_eq!(agent.findings.as_deref(), Some("out"));
    }

    #[test]
    fn test_team_completion_captures_findings_and_end_time() {
        let mut p = projector();
        p.start();
        p.apply(&routed("linkedin_meta", "meta_supervisor", CONTENT_TEAM));
        p.apply(&completed("linkedin_meta", CONTENT_TEAM));

        let team = &p.record().teams[0];
        assert_eq!(team.team_findings.as_deref(), Some("out"));
        assert!(team.started_at.is_some());
        assert!(team.completed_at.is_some());
    }

    #[test]
    fn test_fail_marks_working_agents_errored() {
        let mut p = projector();
        p.start();
        p.apply(&routed(CONTENT_TEAM, "content_supervisor", PAPER_RESEARCHER));
        p.fail("search backend down");

        let record = p.record();
        assert_eq!(record.status, TaskStatus::Failed);
        assert_eq!(record.error_message.as_deref(), Some("search backend down"));
        assert_eq!(record.teams[0].agents[0].status, AgentStatus::Error);
        assert_eq!(
            record.teams[0].agents[0].error_message.as_deref(),
            Some("search backend down")
        );
        assert_eq!(record.teams[0].status, TaskStatus::Failed);
    }
}
