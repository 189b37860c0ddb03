//! HTTP surface: application context, routing, handlers, and error mapping.

pub mod error;
pub mod handlers;
pub mod routes;

use std::sync::Arc;

use teamgraph::llm::{CompletionModel, SearchProvider};

use crate::config::Settings;
use crate::store::TaskStore;

/// Everything handlers need, built once in `main` and injected as Axum
/// state. No global singletons.
pub struct AppContext {
    /// Runtime settings.
    pub settings: Settings,

    /// Two-tier task status store.
    pub store: TaskStore,

    /// Chat completion service shared by all workers and supervisors.
    pub model: Arc<dyn CompletionModel>,

    /// Web search service for the research worker.
    pub search: Arc<dyn SearchProvider>,
}

/// Shared handler state.
pub type AppState = Arc<AppContext>;
