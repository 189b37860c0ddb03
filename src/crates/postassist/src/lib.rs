//! PostAssist: LinkedIn post generation for ML papers, coordinated by a
//! two-level multi-agent graph.
//!
//! The service layers on top of the `teamgraph` engine:
//!
//! - [`agents`] defines the two concrete teams (content, verification), the
//!   meta supervisor that coordinates them, and the research worker that
//!   pulls in web search results.
//! - [`runner`] owns one generation task end to end: it runs the meta graph
//!   on a spawned Tokio task and mirrors its step events into the status
//!   store through the [`projector`].
//! - [`store`] is the two-tier task status store: a file-backed SQLite KV
//!   with sliding TTL, falling back to an in-process map when the file
//!   backend is unavailable.
//! - [`verify`] holds the heuristic post checks (overstatement, attribution,
//!   LinkedIn style) used both by the verification team and the standalone
//!   verification endpoint.
//! - [`api`] is the Axum HTTP surface.

pub mod agents;
pub mod api;
pub mod config;
pub mod models;
pub mod projector;
pub mod runner;
pub mod store;
pub mod verify;

pub use config::Settings;
