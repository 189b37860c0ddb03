//! Per-invocation graph state and partial update merging.
//!
//! Every run of a compiled team creates a fresh [`TeamState`] and destroys
//! it when the run returns. Nodes never mutate the state directly; they emit
//! a [`StateUpdate`] which the run loop merges with fixed reducer semantics:
//! messages append (the log is monotonic), the `next` pointer and scalar
//! fields overwrite.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::message::Message;

/// Terminal routing sentinel returned by supervisors.
///
/// `FINISH` is reserved: it can never be used as a member name.
pub const FINISH: &str = "FINISH";

/// State for one graph invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamState {
    /// Append-only conversation log shared by all nodes of this run.
    pub messages: Vec<Message>,

    /// Name of the node to run next, or [`FINISH`] once terminal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,

    /// Team-specific scalar fields (e.g. current research text).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
}

impl TeamState {
    /// Create a state seeded with a single initial message.
    pub fn from_message(message: Message) -> Self {
        Self {
            messages: vec![message],
            next: None,
            fields: Map::new(),
        }
    }

    /// The most recent message in the log, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Merge a partial update into this state.
    ///
    /// Messages are appended, never replaced; `next` and individual fields
    /// overwrite when present in the update.
    pub fn apply(&mut self, update: StateUpdate) {
        self.messages.extend(update.messages);
        if let Some(next) = update.next {
            self.next = Some(next);
        }
        for (key, value) in update.fields {
            self.fields.insert(key, value);
        }
    }
}

/// Partial state emitted by one node turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateUpdate {
    /// Messages to append to the conversation log.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,

    /// New value for the `next` routing pointer, if the node sets one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,

    /// Scalar fields to overwrite.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
}

impl StateUpdate {
    /// An update that appends a single message.
    pub fn message(message: Message) -> Self {
        Self {
            messages: vec![message],
            ..Default::default()
        }
    }

    /// An update that only moves the routing pointer.
    pub fn route_to(next: impl Into<String>) -> Self {
        Self {
            next: Some(next.into()),
            ..Default::default()
        }
    }

    /// Attach a scalar field to this update.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// True when the update carries nothing.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.next.is_none() && self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apply_appends_messages() {
        let mut state = TeamState::from_message(Message::new("start"));
        state.apply(StateUpdate::message(Message::from_worker("a", "one")));
        state.apply(StateUpdate::message(Message::from_worker("b", "two")));

        assert_eq!(state.messages.len(), 3);
        assert_eq!(state.last_message().unwrap().content, "two");
    }

    #[test]
    fn test_apply_overwrites_next_and_fields() {
        let mut state = TeamState::default();
        state.apply(StateUpdate::route_to("Researcher"));
        assert_eq!(state.next.as_deref(), Some("Researcher"));

        state.apply(StateUpdate::default().with_field("draft", json!("v1")));
        state.apply(StateUpdate::default().with_field("draft", json!("v2")));
        assert_eq!(state.fields["draft"], json!("v2"));

        // An update without `next` leaves the pointer alone.
        state.apply(StateUpdate::default());
        assert_eq!(state.next.as_deref(), Some("Researcher"));
    }

    #[test]
    fn test_empty_update() {
        assert!(StateUpdate::default().is_empty());
        assert!(!StateUpdate::route_to(FINISH).is_empty());
    }
}
