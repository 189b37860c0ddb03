//! Two-level hierarchical graph execution engine with supervisor routing.
//!
//! `teamgraph` executes *teams*: state machines in which a set of worker
//! nodes is coordinated by a single supervisor node. The supervisor is the
//! entry point; after every worker turn control returns to the supervisor,
//! which either routes to another member or terminates the run. Teams
//! compose: a compiled team can itself act as a worker inside an outer
//! "meta" team through a message-level adapter, allowing arbitrary nesting
//! without the outer graph knowing the inner graph's state shape.
//!
//! # Architecture
//!
//! ```text
//!            ┌──────────────┐
//!     ┌─────▶│  Supervisor  │────── FINISH ──▶ (terminal)
//!     │      └──────┬───────┘
//!     │             │ routes to one member
//!     │      ┌──────▼───────┐
//!     └──────│ Worker node  │   (workers never call each other)
//!            └──────────────┘
//! ```
//!
//! The supervisor's routing decision is delegated to an external completion
//! service through [`llm::CompletionModel::choose`], constrained to a closed
//! set of member names plus the `FINISH` sentinel. The protocol layer in
//! [`supervisor`] enforces the closed set at the boundary, so the state
//! machine can never enter an undeclared state.
//!
//! # Modules
//!
//! - [`message`] - conversation log types shared by all nodes of a run
//! - [`state`] - per-invocation graph state and partial update merging
//! - [`node`] - the uniform [`GraphNode`] seam plus the prompt-driven worker
//! - [`supervisor`] - closed-set routing protocol
//! - [`graph`] - team builder, validation, and the compiled run loop
//! - [`subgraph`] - entry/exit adapters for nesting compiled teams
//! - [`stream`] - step events emitted while a graph runs
//! - [`llm`] - traits for the external completion and search collaborators
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use teamgraph::{Message, Supervisor, TeamGraph, TeamState, WorkerNode};
//!
//! let mut graph = TeamGraph::new("Content team");
//! graph.add_worker(Arc::new(WorkerNode::new("Researcher", "You research.", model.clone())));
//! graph.add_worker(Arc::new(WorkerNode::new("Writer", "You write.", model.clone())));
//! graph.set_supervisor(Supervisor::new(
//!     "content_supervisor",
//!     "You coordinate research and writing.",
//!     vec!["Researcher".into(), "Writer".into()],
//!     model,
//! ));
//!
//! let team = graph.compile()?;
//! let final_state = team
//!     .run(TeamState::from_message(Message::new("Write about X")), None)
//!     .await?;
//! ```

pub mod error;
pub mod graph;
pub mod llm;
pub mod message;
pub mod node;
pub mod state;
pub mod stream;
pub mod subgraph;
pub mod supervisor;

pub use error::{GraphError, Result};
pub use graph::{CompiledTeam, TeamGraph};
pub use message::Message;
pub use node::{GraphNode, WorkerNode};
pub use state::{StateUpdate, TeamState, FINISH};
pub use stream::{step_channel, StepEvent, StepReceiver, StepSender};
pub use subgraph::TeamNode;
pub use supervisor::{RouteDecision, Supervisor};
