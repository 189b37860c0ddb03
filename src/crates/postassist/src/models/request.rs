//! Inbound request DTOs and their validation rules.
//!
//! Validation is deliberately basic: bounds and membership checks only, no
//! schema layer. Handlers map a [`ValidationError`] to a 422 response.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A request field failed validation.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

fn default_target_audience() -> String {
    "professional".to_string()
}

fn default_tone() -> String {
    "professional".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_hashtags() -> u32 {
    10
}

/// Request to generate a post about one paper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostGenerationRequest {
    /// Title or topic of the ML paper.
    pub paper_title: String,

    /// Extra context or aspects to focus on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,

    /// Target audience: professional, academic, or general.
    #[serde(default = "default_target_audience")]
    pub target_audience: String,

    /// Whether to include technical details.
    #[serde(default = "default_true")]
    pub include_technical_details: bool,

    /// Maximum number of hashtags in the post.
    #[serde(default = "default_max_hashtags")]
    pub max_hashtags: u32,

    /// Post tone: professional, casual, or academic.
    #[serde(default = "default_tone")]
    pub tone: String,
}

impl PostGenerationRequest {
    /// Check field bounds.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first violated rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let title = self.paper_title.trim();
        if title.is_empty() {
            return Err(ValidationError("paper_title cannot be empty".to_string()));
        }
        if title.chars().count() < 5 || title.chars().count() > 500 {
            return Err(ValidationError(
                "paper_title must be 5 to 500 characters".to_string(),
            ));
        }
        if let Some(context) = &self.additional_context {
            if context.chars().count() > 1000 {
                return Err(ValidationError(
                    "additional_context must be at most 1000 characters".to_string(),
                ));
            }
        }
        if !(1..=20).contains(&self.max_hashtags) {
            return Err(ValidationError(
                "max_hashtags must be between 1 and 20".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_verification_type() -> String {
    "both".to_string()
}

/// Request to verify an existing post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostVerificationRequest {
    /// Post text to verify.
    pub post_content: String,

    /// Source paper title, for context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_title: Option<String>,

    /// Which checks to run: `technical`, `style`, or `both`.
    #[serde(default = "default_verification_type")]
    pub verification_type: String,
}

impl PostVerificationRequest {
    /// Check field bounds and the verification type.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first violated rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let len = self.post_content.chars().count();
        if !(10..=3000).contains(&len) {
            return Err(ValidationError(
                "post_content must be 10 to 3000 characters".to_string(),
            ));
        }
        match self.verification_type.as_str() {
            "technical" | "style" | "both" => Ok(()),
            other => Err(ValidationError(format!(
                "verification_type must be one of technical, style, both; got '{other}'"
            ))),
        }
    }
}

fn default_interval_minutes() -> u32 {
    60
}

/// Request to generate posts for several papers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPostRequest {
    /// Papers to generate posts for.
    pub papers: Vec<PostGenerationRequest>,

    /// Whether to space out the generations.
    #[serde(default)]
    pub schedule_posts: bool,

    /// Interval between scheduled generations, in minutes.
    #[serde(default = "default_interval_minutes")]
    pub time_interval_minutes: u32,
}

impl BatchPostRequest {
    /// Check batch bounds and every member request.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first violated rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.papers.is_empty() || self.papers.len() > 5 {
            return Err(ValidationError(
                "papers must contain 1 to 5 entries".to_string(),
            ));
        }
        if !(30..=1440).contains(&self.time_interval_minutes) {
            return Err(ValidationError(
                "time_interval_minutes must be between 30 and 1440".to_string(),
            ));
        }
        for paper in &self.papers {
            paper.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generation_request(title: &str) -> PostGenerationRequest {
        PostGenerationRequest {
            paper_title: title.to_string(),
            additional_context: None,
            target_audience: default_target_audience(),
            include_technical_details: true,
            max_hashtags: 10,
            tone: default_tone(),
        }
    }

    #[test]
    fn test_title_bounds() {
        assert!(generation_request("Attention Is All You Need").validate().is_ok());
        assert!(generation_request("    ").validate().is_err());
        assert!(generation_request("abc").validate().is_err());
        assert!(generation_request(&"x".repeat(501)).validate().is_err());
    }

    #[test]
    fn test_hashtag_bounds() {
        let mut req = generation_request("Attention Is All You Need");
        req.max_hashtags = 0;
        assert!(req.validate().is_err());
        req.max_hashtags = 21;
        assert!(req.validate().is_err());
        req.max_hashtags = 20;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_verification_type_membership() {
        let mut req = PostVerificationRequest {
            post_content: "a perfectly reasonable LinkedIn post".to_string(),
            paper_title: None,
            verification_type: "both".to_string(),
        };
        assert!(req.validate().is_ok());
        req.verification_type = "grammar".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_batch_bounds() {
        let paper = generation_request("Attention Is All You Need");
        let mut req = BatchPostRequest {
            papers: vec![paper.clone(), paper.clone()],
            schedule_posts: false,
            time_interval_minutes: 60,
        };
        assert!(req.validate().is_ok());

        req.time_interval_minutes = 10;
        assert!(req.validate().is_err());

        req.time_interval_minutes = 60;
        req.papers = vec![paper; 6];
        assert!(req.validate().is_err());

        req.papers = vec![];
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_request_defaults_from_minimal_json() {
        let req: PostGenerationRequest =
            serde_json::from_str(r#"{"paper_title": "Attention Is All You Need"}"#).unwrap();
        assert_eq!(req.target_audience, "professional");
        assert_eq!(req.max_hashtags, 10);
        assert!(req.include_technical_details);
    }
}
