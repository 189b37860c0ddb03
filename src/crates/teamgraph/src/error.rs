//! Error types for graph construction and execution.
//!
//! All variants implement `std::error::Error` via `thiserror`. Execution
//! errors are fatal to the invocation that raised them: the run loop returns
//! immediately and the caller decides how to surface the failure. Nothing in
//! this crate retries upstream calls.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised while building or running a team graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The supervisor settled on a name outside the declared member set.
    ///
    /// Only raised after the routing protocol has exhausted its retry
    /// budget; a single off-set response is corrected, not fatal.
    #[error("supervisor '{supervisor}' routed to undeclared node '{node}'")]
    Routing {
        /// Supervisor that produced the decision.
        supervisor: String,
        /// The undeclared name it returned.
        node: String,
    },

    /// The number of supervisor turns exceeded the configured ceiling.
    ///
    /// This is the backstop against routing loops from an ambiguous or
    /// misbehaving supervisor decision.
    #[error("routing ceiling of {limit} supervisor turns exceeded")]
    RecursionExceeded {
        /// The configured ceiling that was hit.
        limit: usize,
    },

    /// An external completion or search call failed inside a node.
    ///
    /// The underlying service message is preserved verbatim so it can be
    /// reported on the failed task.
    #[error("upstream service failed in node '{node}': {message}")]
    Upstream {
        /// Node whose external call failed.
        node: String,
        /// Message from the upstream service.
        message: String,
    },

    /// Graph structure rejected at compile time.
    #[error("graph validation failed: {0}")]
    Validation(String),

    /// State could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GraphError {
    /// Convenience constructor for upstream failures.
    pub fn upstream(node: impl Into<String>, message: impl Into<String>) -> Self {
        GraphError::Upstream {
            node: node.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphError::Routing {
            supervisor: "meta_supervisor".into(),
            node: "Ghost team".into(),
        };
        assert_eq!(
            err.to_string(),
            "supervisor 'meta_supervisor' routed to undeclared node 'Ghost team'"
        );

        let err = GraphError::RecursionExceeded { limit: 50 };
        assert!(err.to_string().contains("50"));

        let err = GraphError::upstream("Researcher", "timeout");
        assert!(err.to_string().contains("Researcher"));
        assert!(err.to_string().contains("timeout"));
    }
}
