//! One generation task, end to end.
//!
//! The runner owns a spawned task's whole lifecycle: build the meta graph,
//! run it while mirroring step events into the status store, then write the
//! terminal record. Any graph error becomes a terminal `failed` record; the
//! runner itself never propagates an error back into the server.

use std::time::Duration;

use teamgraph::{step_channel, Message, TeamState};

use crate::agents;
use crate::api::AppState;
use crate::models::{LinkedInPost, PostGenerationRequest, TaskRecord};
use crate::projector::Projector;

/// Run one generation task to its terminal state.
///
/// `delay` postpones the start for scheduled batch members; the record
/// stays `pending` until the delay elapses.
pub async fn run_generation(
    state: AppState,
    task_id: String,
    request: PostGenerationRequest,
    delay: Option<Duration>,
) {
    if let Some(delay) = delay {
        tracing::info!(task_id = %task_id, delay_secs = delay.as_secs(), "generation scheduled");
        tokio::time::sleep(delay).await;
    }

    // The record was written at submission; re-read it so batch metadata
    // and request echo survive. A vanished record (TTL, degraded store)
    // gets rebuilt from scratch.
    let record = match state.store.get_task(&task_id).await {
        Ok(Some(record)) => record,
        _ => TaskRecord::new(
            task_id.clone(),
            serde_json::to_value(&request).unwrap_or_default(),
            crate::projector::initial_teams(),
        ),
    };

    let mut projector = Projector::new(record);
    projector.start();
    persist(&state, &projector).await;

    let (tx, mut rx) = step_channel();
    let graph = match agents::meta_graph(
        state.model.clone(),
        state.search.clone(),
        state.settings.recursion_limit,
        &request.paper_title,
        Some(tx.clone()),
    ) {
        Ok(graph) => graph,
        Err(e) => {
            tracing::error!(task_id = %task_id, error = %e, "graph construction failed");
            projector.fail(e.to_string());
            persist(&state, &projector).await;
            return;
        }
    };

    let initial = TeamState::from_message(Message::new(agents::format_request(&request)));
    let run = tokio::spawn(async move { graph.run(initial, Some(tx)).await });

    // Mirror step events into the store as they arrive. All senders live
    // inside the spawned run, so the channel closes when it finishes.
    while let Some(event) = rx.recv().await {
        projector.apply(&event);
        persist(&state, &projector).await;
    }

    match run.await {
        Ok(Ok(final_state)) => {
            let content = final_state
                .last_message()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            projector.complete(LinkedInPost::from_content(content));
            tracing::info!(task_id = %task_id, "generation completed");
        }
        Ok(Err(e)) => {
            tracing::warn!(task_id = %task_id, error = %e, "generation failed");
            projector.fail(e.to_string());
        }
        Err(e) => {
            tracing::error!(task_id = %task_id, error = %e, "generation task panicked");
            projector.fail(format!("internal task failure: {e}"));
        }
    }
    persist(&state, &projector).await;
}

async fn persist(state: &AppState, projector: &Projector) {
    if let Err(e) = state.store.put_task(projector.record()).await {
        tracing::warn!(task_id = %projector.record().task_id, error = %e, "status write failed");
    }
}
