//! Data model: task status records, post payloads, and API DTOs.

pub mod post;
pub mod record;
pub mod request;
pub mod response;

pub use post::LinkedInPost;
pub use record::{AgentRecord, AgentStatus, BatchRecord, TaskRecord, TaskStatus, TeamRecord};
pub use request::{BatchPostRequest, PostGenerationRequest, PostVerificationRequest};
pub use response::{
    BatchPostResponse, HealthCheckResponse, PostGenerationResponse, PostVerificationResponse,
    VerificationReport, VerificationSection,
};
