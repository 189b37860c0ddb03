//! Conversation log types.
//!
//! A graph invocation owns one conversation log: an ordered, append-only
//! sequence of [`Message`]s. Workers append their output to it, the
//! supervisor reads it in full before every routing decision, and nothing
//! ever removes or reorders an entry. The log is the graph's working memory.

use serde::{Deserialize, Serialize};

/// One entry in a conversation log.
///
/// `name` identifies the worker (or team) that authored the message; the
/// initial request message carries no author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message text.
    pub content: String,

    /// Author worker name, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    /// Create an unattributed message (typically the initial request).
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            name: None,
        }
    }

    /// Create a message authored by a named worker or team.
    pub fn from_worker(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            name: Some(name.into()),
        }
    }
}

/// Render a conversation for inclusion in a completion prompt.
///
/// Attributed messages are prefixed with their author so the model can tell
/// which team member said what.
pub fn render_conversation(messages: &[Message]) -> String {
    let mut out = String::new();
    for msg in messages {
        match &msg.name {
            Some(name) => {
                out.push_str(name);
                out.push_str(": ");
            }
            None => {}
        }
        out.push_str(&msg.content);
        out.push('\n');
    }
    out
}
