//! Outbound response DTOs.
//!
//! `GET /status/:task_id` returns the [`TaskRecord`](crate::models::TaskRecord)
//! itself; everything else has a dedicated shape here.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::record::TaskStatus;

/// Acknowledgement for a single generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostGenerationResponse {
    /// Identifier for polling `GET /status/:task_id`.
    pub task_id: String,

    /// Initial task status (always pending).
    pub status: TaskStatus,

    /// Human-readable message.
    pub message: String,

    /// Rough completion estimate.
    pub estimated_completion_time: DateTime<Utc>,
}

/// One verification section (technical or style).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSection {
    /// Section score in `[0.0, 1.0]`.
    pub score: f32,

    /// Issues found, empty when clean.
    pub issues: Vec<String>,

    /// Suggested improvements, parallel to the issues.
    pub recommendations: Vec<String>,
}

/// Combined verification result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Technical accuracy section, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical_accuracy: Option<VerificationSection>,

    /// Style compliance section, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_compliance: Option<VerificationSection>,

    /// Mean of the present section scores.
    pub overall_score: f32,

    /// All recommendations, merged across sections.
    pub recommendations: Vec<String>,

    /// When verification ran.
    pub verified_at: DateTime<Utc>,
}

/// Response for `POST /verify-post`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostVerificationResponse {
    /// Verification identifier.
    pub verification_id: String,

    /// The content that was verified.
    pub post_content: String,

    /// Detailed results.
    pub verification_report: VerificationReport,

    /// Whether the post passed (overall score at least 0.7).
    pub approved: bool,
}

/// Acknowledgement for a batch request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPostResponse {
    /// Batch identifier.
    pub batch_id: String,

    /// Number of tasks created.
    pub total_posts: usize,

    /// Member task identifiers, in submission order.
    pub task_ids: Vec<String>,

    /// Initial batch status.
    pub status: TaskStatus,

    /// Rough completion estimate for the whole batch.
    pub estimated_completion_time: DateTime<Utc>,
}

/// Response for `GET /health` and `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// `healthy` or `degraded`.
    pub status: String,

    /// Service version.
    pub version: String,

    /// Check timestamp.
    pub timestamp: DateTime<Utc>,

    /// Per-dependency status, e.g. `{"openai": "configured"}`.
    pub services: BTreeMap<String, String>,
}
