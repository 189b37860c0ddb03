//! The generated post payload.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static HASHTAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\w+").unwrap());

/// A generated LinkedIn post, the terminal `result` of a completed task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedInPost {
    /// Post text.
    pub content: String,

    /// Hashtags found in the content.
    pub hashtags: Vec<String>,

    /// Word count of the content.
    pub word_count: usize,

    /// Character count of the content.
    pub character_count: usize,

    /// Predicted engagement score in `[0.0, 1.0]`, when scored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engagement_score: Option<f32>,
}

impl LinkedInPost {
    /// Build a post from its final content, deriving counts and hashtags.
    pub fn from_content(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            hashtags: extract_hashtags(&content),
            word_count: content.split_whitespace().count(),
            character_count: content.chars().count(),
            engagement_score: None,
            content,
        }
    }
}

/// Pull `#hashtags` out of post text, in order of first appearance.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for m in HASHTAG_REGEX.find_iter(content) {
        let tag = m.as_str().to_string();
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_content_derives_counts() {
        let post = LinkedInPost::from_content("Great paper! #AI #MachineLearning #AI");
        assert_eq!(post.word_count, 5);
        assert_eq!(post.character_count, 37);
        assert_eq!(post.hashtags, vec!["#AI", "#MachineLearning"]);
        assert!(post.engagement_score.is_none());
    }

    #[test]
    fn test_no_hashtags() {
        let post = LinkedInPost::from_content("plain text");
        assert!(post.hashtags.is_empty());
    }
}
