//! Request handlers.

use std::collections::BTreeMap;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{Duration as ChronoDuration, Utc};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::AppState;
use crate::models::{
    BatchPostRequest, BatchPostResponse, BatchRecord, HealthCheckResponse, PostGenerationRequest,
    PostGenerationResponse, PostVerificationRequest, PostVerificationResponse, TaskRecord,
    TaskStatus,
};
use crate::projector;
use crate::runner;
use crate::verify;

/// Rough per-post wall time used for completion estimates.
const ESTIMATE_MINUTES_PER_POST: i64 = 3;

/// `POST /generate-post`: accept a generation request and spawn its task.
pub async fn generate_post(
    State(state): State<AppState>,
    Json(request): Json<PostGenerationRequest>,
) -> ApiResult<Json<PostGenerationResponse>> {
    request.validate()?;

    let task_id = Uuid::new_v4().to_string();
    let record = TaskRecord::new(
        &task_id,
        serde_json::to_value(&request).map_err(|e| ApiError::Internal(e.to_string()))?,
        projector::initial_teams(),
    );
    state.store.put_task(&record).await?;

    tokio::spawn(runner::run_generation(
        state.clone(),
        task_id.clone(),
        request,
        None,
    ));
    tracing::info!(task_id = %task_id, "generation task accepted");

    Ok(Json(PostGenerationResponse {
        task_id,
        status: TaskStatus::Pending,
        message: "LinkedIn post generation started successfully".to_string(),
        estimated_completion_time: Utc::now() + ChronoDuration::minutes(ESTIMATE_MINUTES_PER_POST),
    }))
}

/// `GET /status/:task_id`: current task record.
pub async fn get_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<TaskRecord>> {
    match state.store.get_task(&task_id).await? {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::NotFound(format!("task {task_id} not found"))),
    }
}

/// `GET /tasks`: all live task records, newest first.
pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<TaskRecord>>> {
    Ok(Json(state.store.list_tasks().await?))
}

/// `POST /verify-post`: run the heuristic checks synchronously.
pub async fn verify_post(
    Json(request): Json<PostVerificationRequest>,
) -> ApiResult<Json<PostVerificationResponse>> {
    request.validate()?;

    let report = verify::build_report(&request.post_content, &request.verification_type);
    let approved = verify::is_approved(&report);

    Ok(Json(PostVerificationResponse {
        verification_id: Uuid::new_v4().to_string(),
        post_content: request.post_content,
        verification_report: report,
        approved,
    }))
}

/// `POST /batch-generate`: one task per paper, optionally spaced out.
pub async fn batch_generate(
    State(state): State<AppState>,
    Json(request): Json<BatchPostRequest>,
) -> ApiResult<Json<BatchPostResponse>> {
    request.validate()?;

    let batch_id = Uuid::new_v4().to_string();
    let mut task_ids = Vec::with_capacity(request.papers.len());

    for (index, paper) in request.papers.iter().enumerate() {
        let task_id = Uuid::new_v4().to_string();
        let mut record = TaskRecord::new(
            &task_id,
            serde_json::to_value(paper).map_err(|e| ApiError::Internal(e.to_string()))?,
            projector::initial_teams(),
        );
        record.batch_id = Some(batch_id.clone());
        state.store.put_task(&record).await?;

        // Scheduled batches space member i by i * interval.
        let delay = (request.schedule_posts && index > 0).then(|| {
            Duration::from_secs(index as u64 * u64::from(request.time_interval_minutes) * 60)
        });

        tokio::spawn(runner::run_generation(
            state.clone(),
            task_id.clone(),
            paper.clone(),
            delay,
        ));
        task_ids.push(task_id);
    }

    let now = Utc::now();
    let batch = BatchRecord {
        batch_id: batch_id.clone(),
        total_posts: task_ids.len(),
        task_ids: task_ids.clone(),
        status: TaskStatus::Pending,
        created_at: now,
        updated_at: now,
    };
    state.store.put_batch(&batch).await?;
    tracing::info!(batch_id = %batch_id, posts = task_ids.len(), "batch accepted");

    Ok(Json(BatchPostResponse {
        batch_id,
        total_posts: task_ids.len(),
        task_ids,
        status: TaskStatus::Pending,
        estimated_completion_time: now
            + ChronoDuration::minutes(ESTIMATE_MINUTES_PER_POST * request.papers.len() as i64),
    }))
}

/// `GET /health` (and `GET /`): dependency status map.
pub async fn health(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    let mut services = BTreeMap::new();
    services.insert(
        "openai".to_string(),
        configured(&state.settings.openai_api_key),
    );
    services.insert(
        "tavily".to_string(),
        configured(&state.settings.tavily_api_key),
    );
    services.insert(
        "store".to_string(),
        if state.store.primary_available().await {
            "connected".to_string()
        } else {
            "not_available".to_string()
        },
    );

    // A missing store only degrades durability, not the service.
    let status = if services["openai"] == "configured" && services["tavily"] == "configured" {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthCheckResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        services,
    })
}

fn configured(key: &str) -> String {
    if key.trim().is_empty() {
        "not_configured".to_string()
    } else {
        "configured".to_string()
    }
}
