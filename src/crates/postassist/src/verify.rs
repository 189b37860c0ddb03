//! Heuristic post verification.
//!
//! Cheap, deterministic checks over post text: overstated-claim and
//! attribution scanning for technical accuracy, and LinkedIn formatting
//! conventions for style. Each issue found deducts a fixed amount from the
//! section score; a post is approved when the overall score reaches 0.7.
//! These checks back both the standalone `/verify-post` endpoint and the
//! verification team's workers, which receive the rendered report as
//! context for their review.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;

use crate::models::post::extract_hashtags;
use crate::models::{VerificationReport, VerificationSection};

static OVERSTATED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)revolutionary|breakthrough|unprecedented|solves all|perfect|100%|completely")
        .unwrap()
});

/// Minimum overall score for approval.
pub const APPROVAL_THRESHOLD: f32 = 0.7;

/// Scan for overstated claims and missing attribution.
///
/// Each finding deducts 0.2 from the score, floored at zero.
pub fn verify_technical(post_content: &str) -> VerificationSection {
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    for m in OVERSTATED_REGEX.find_iter(post_content) {
        issues.push(format!(
            "Potentially overstated claim detected: '{}'",
            m.as_str()
        ));
        recommendations.push("Consider using more measured language".to_string());
    }

    let lowered = post_content.to_lowercase();
    if !post_content.contains("et al") && !lowered.contains("by") {
        issues.push("Missing author attribution".to_string());
        recommendations.push("Add proper attribution to paper authors".to_string());
    }

    VerificationSection {
        score: (1.0 - issues.len() as f32 * 0.2).max(0.0),
        issues,
        recommendations,
    }
}

/// Check LinkedIn formatting conventions.
///
/// Each finding deducts 0.15 from the score, floored at zero.
pub fn check_style(post_content: &str) -> VerificationSection {
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    let char_count = post_content.chars().count();
    if char_count > 3000 {
        issues.push(format!("Post too long ({char_count} chars, limit: 3000)"));
        recommendations.push("Shorten content for better engagement".to_string());
    } else if char_count < 100 {
        issues.push(format!("Post too short ({char_count} chars)"));
        recommendations.push("Add more valuable content".to_string());
    }

    let emoji_count = count_emoji(post_content);
    if emoji_count > 10 {
        issues.push(format!("Too many emojis ({emoji_count})"));
        recommendations.push("Reduce emoji usage for professional tone".to_string());
    } else if emoji_count == 0 {
        issues.push("No emojis used".to_string());
        recommendations.push("Add 1-3 relevant emojis for engagement".to_string());
    }

    let hashtag_count = extract_hashtags(post_content).len();
    if hashtag_count > 20 {
        issues.push(format!("Too many hashtags ({hashtag_count})"));
        recommendations.push("Limit hashtags to 5-10 for better reach".to_string());
    } else if hashtag_count == 0 {
        issues.push("No hashtags found".to_string());
        recommendations.push("Add relevant hashtags for discoverability".to_string());
    }

    if !post_content.contains('?') {
        issues.push("Missing engagement question".to_string());
        recommendations.push("Add a question to encourage comments".to_string());
    }

    if !post_content.contains('\n') {
        issues.push("Poor formatting - no line breaks".to_string());
        recommendations.push("Add line breaks for better readability".to_string());
    }

    VerificationSection {
        score: (1.0 - issues.len() as f32 * 0.15).max(0.0),
        issues,
        recommendations,
    }
}

/// Run the requested sections and combine them into one report.
///
/// `verification_type` is `technical`, `style`, or `both` (validated
/// upstream). The overall score is the mean of the sections that ran.
pub fn build_report(post_content: &str, verification_type: &str) -> VerificationReport {
    let technical = matches!(verification_type, "technical" | "both")
        .then(|| verify_technical(post_content));
    let style = matches!(verification_type, "style" | "both").then(|| check_style(post_content));

    let sections: Vec<&VerificationSection> =
        technical.iter().chain(style.iter()).collect();
    let overall_score = if sections.is_empty() {
        0.0
    } else {
        sections.iter().map(|s| s.score).sum::<f32>() / sections.len() as f32
    };

    let recommendations = sections
        .iter()
        .flat_map(|s| s.recommendations.iter().cloned())
        .collect();

    VerificationReport {
        technical_accuracy: technical,
        style_compliance: style,
        overall_score,
        recommendations,
        verified_at: Utc::now(),
    }
}

/// Whether a report clears the approval bar.
pub fn is_approved(report: &VerificationReport) -> bool {
    report.overall_score >= APPROVAL_THRESHOLD
}

/// Render a section as a plain-text report for an agent's context.
pub fn render_section(title: &str, section: &VerificationSection) -> String {
    let issues = if section.issues.is_empty() {
        "- No major issues detected".to_string()
    } else {
        section
            .issues
            .iter()
            .map(|i| format!("- {i}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let recommendations = if section.recommendations.is_empty() {
        "- None".to_string()
    } else {
        section
            .recommendations
            .iter()
            .map(|r| format!("- {r}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        "{title}\nScore: {:.2}/1.0\nIssues:\n{issues}\nRecommendations:\n{recommendations}",
        section.score
    )
}

fn count_emoji(text: &str) -> usize {
    text.chars()
        .filter(|c| {
            matches!(u32::from(*c),
                0x1F300..=0x1F5FF | 0x1F600..=0x1F64F | 0x1F680..=0x1F6FF | 0x1F1E0..=0x1F1FF)
        })
        .count()
}
