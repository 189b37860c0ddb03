//! Route table.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers;
use crate::api::AppState;

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/health", get(handlers::health))
        .route("/generate-post", post(handlers::generate_post))
        .route("/status/:task_id", get(handlers::get_status))
        .route("/tasks", get(handlers::list_tasks))
        .route("/verify-post", post(handlers::verify_post))
        .route("/batch-generate", post(handlers::batch_generate))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
