//! Task, team, and agent status records.
//!
//! These are the externally visible progress projections kept in the status
//! store under `task:{id}` (and `batch:{id}` for batches). Task status is
//! forward-only: once a record reaches a terminal state the store refuses to
//! move it back. Team status and progress are derived from the agents and
//! recomputed after every mutation, never stored authoritatively elsewhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::post::LinkedInPost;

/// Lifecycle status of a generation task (or a batch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    /// Terminal states are immutable except by administrative override.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }
}

/// Status of one agent within a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Idle,
    Working,
    Completed,
    Error,
}

/// Progress of one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Agent name, e.g. `PaperResearcher`.
    pub agent_name: String,

    /// Current agent status.
    pub status: AgentStatus,

    /// Short description of what the agent is doing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_activity: Option<String>,

    /// Agent progress in `[0.0, 1.0]`.
    pub progress: f32,

    /// Key findings or output from the agent's last completed turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub findings: Option<String>,

    /// When this agent last changed.
    pub last_update: DateTime<Utc>,

    /// Failure message, set when the agent errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl AgentRecord {
    /// A fresh idle agent.
    pub fn idle(agent_name: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            status: AgentStatus::Idle,
            current_activity: None,
            progress: 0.0,
            findings: None,
            last_update: Utc::now(),
            error_message: None,
        }
    }
}

/// Progress of one team, derived from its agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRecord {
    /// Team name, e.g. `Content team`.
    pub team_name: String,

    /// Derived team status.
    pub status: TaskStatus,

    /// Derived team progress: arithmetic mean of agent progress.
    pub progress: f32,

    /// What the team is currently focused on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_focus: Option<String>,

    /// Member agents.
    pub agents: Vec<AgentRecord>,

    /// Key outputs from the team, set when the team's turn completes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_findings: Option<String>,

    /// When the team first started working.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When the team completed its work.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TeamRecord {
    /// A fresh pending team with the given idle agents.
    pub fn new(team_name: impl Into<String>, agent_names: &[&str]) -> Self {
        Self {
            team_name: team_name.into(),
            status: TaskStatus::Pending,
            progress: 0.0,
            current_focus: None,
            agents: agent_names.iter().map(|n| AgentRecord::idle(*n)).collect(),
            team_findings: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// Look up an agent by name.
    pub fn agent_mut(&mut self, name: &str) -> Option<&mut AgentRecord> {
        self.agents.iter_mut().find(|a| a.agent_name == name)
    }

    /// Recompute derived status and progress from the agents.
    ///
    /// Progress is the mean of agent progress. Status rules apply in order:
    /// all agents completed makes the team completed, any working agent
    /// makes it in progress, any errored agent makes it failed, otherwise
    /// it stays pending.
    pub fn recompute(&mut self) {
        if self.agents.is_empty() {
            return;
        }
        self.progress =
            self.agents.iter().map(|a| a.progress).sum::<f32>() / self.agents.len() as f32;

        self.status = if self.agents.iter().all(|a| a.status == AgentStatus::Completed) {
            TaskStatus::Completed
        } else if self.agents.iter().any(|a| a.status == AgentStatus::Working) {
            TaskStatus::InProgress
        } else if self.agents.iter().any(|a| a.status == AgentStatus::Error) {
            TaskStatus::Failed
        } else {
            TaskStatus::Pending
        };
    }
}

/// Full status record for one generation task.
///
/// This is also the body returned by `GET /status/:task_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Task identifier.
    pub task_id: String,

    /// Batch this task belongs to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,

    /// Overall task status, forward-only.
    pub status: TaskStatus,

    /// Overall progress in `[0.0, 1.0]`, monotonically non-decreasing.
    pub progress: f32,

    /// Current processing step, e.g. `researching_paper`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,

    /// Current workflow phase, e.g. `research`, `verification`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    /// Status message from the currently active agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_status: Option<String>,

    /// The team currently active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_team: Option<String>,

    /// Per-team progress detail.
    pub teams: Vec<TeamRecord>,

    /// Generated post, set on completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<LinkedInPost>,

    /// Failure message, set on terminal failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Original request payload, echoed for clients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_data: Option<Value>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp, non-decreasing.
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    /// A fresh pending record with the given team roster.
    pub fn new(task_id: impl Into<String>, request_data: Value, teams: Vec<TeamRecord>) -> Self {
        let now = Utc::now();
        Self {
            task_id: task_id.into(),
            batch_id: None,
            status: TaskStatus::Pending,
            progress: 0.0,
            current_step: Some("queued".to_string()),
            phase: None,
            detailed_status: None,
            current_team: None,
            teams,
            result: None,
            error_message: None,
            request_data: Some(request_data),
            created_at: now,
            updated_at: now,
        }
    }

    /// Look up a team by name.
    pub fn team_mut(&mut self, name: &str) -> Option<&mut TeamRecord> {
        self.teams.iter_mut().find(|t| t.team_name == name)
    }

    /// Advance overall progress; never regresses.
    pub fn advance_progress(&mut self, checkpoint: f32) {
        self.progress = self.progress.max(checkpoint);
    }

    /// Bump the update timestamp, keeping it non-decreasing.
    pub fn touch(&mut self) {
        self.updated_at = self.updated_at.max(Utc::now());
    }
}

/// Status record for one batch request, stored under `batch:{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRecord {
    /// Batch identifier.
    pub batch_id: String,

    /// Number of tasks in the batch.
    pub total_posts: usize,

    /// Member task identifiers, in submission order.
    pub task_ids: Vec<String>,

    /// Overall batch status.
    pub status: TaskStatus,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
