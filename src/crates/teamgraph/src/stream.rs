//! Step events emitted while a graph runs.
//!
//! Every completed node turn - worker, nested team, or supervisor decision -
//! is published as one [`StepEvent`] on an unbounded channel. Consumers
//! (the service's stream projector) mirror these into externally visible
//! task status; the engine itself never reads them back. Senders are
//! optional everywhere: a run without a consumer simply drops the events.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::state::StateUpdate;

/// Channel sender for step events.
pub type StepSender = mpsc::UnboundedSender<StepEvent>;

/// Channel receiver for step events.
pub type StepReceiver = mpsc::UnboundedReceiver<StepEvent>;

/// One completed node turn in a running graph.
#[derive(Debug, Clone, Serialize)]
pub struct StepEvent {
    /// Name of the graph (team) the node belongs to.
    pub graph: String,

    /// Node that just completed.
    pub node: String,

    /// For supervisor turns: the member it routed to, or `FINISH`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routed_to: Option<String>,

    /// Partial state the node emitted.
    pub update: StateUpdate,
}

impl StepEvent {
    /// Event for a completed worker (or nested team) turn.
    pub fn node_complete(
        graph: impl Into<String>,
        node: impl Into<String>,
        update: StateUpdate,
    ) -> Self {
        Self {
            graph: graph.into(),
            node: node.into(),
            routed_to: None,
            update,
        }
    }

    /// Event for a supervisor decision.
    pub fn routed(
        graph: impl Into<String>,
        supervisor: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        let target = target.into();
        Self {
            graph: graph.into(),
            node: supervisor.into(),
            routed_to: Some(target.clone()),
            update: StateUpdate::route_to(target),
        }
    }
}

/// Create a step event channel.
pub fn step_channel() -> (StepSender, StepReceiver) {
    mpsc::unbounded_channel()
}

/// Send an event, ignoring a departed consumer.
pub(crate) fn emit(sender: Option<&StepSender>, event: StepEvent) {
    if let Some(tx) = sender {
        let _ = tx.send(event);
    }
}
