//! The concrete teams and their meta supervisor.
//!
//! Two teams under one meta supervisor:
//!
//! ```text
//! meta_supervisor ──▶ Content team      {PaperResearcher, LinkedInCreator}
//!                 ──▶ Verification team {TechVerifier, StyleChecker}
//! ```
//!
//! The expected flow is Content team, then Verification team, then FINISH,
//! but the supervisors decide turn by turn; nothing here hard-codes the
//! order beyond the prompts.

pub mod research;
pub mod verifier;

use std::sync::Arc;

use serde_json::json;

use teamgraph::llm::{CompletionModel, SearchProvider};
use teamgraph::{CompiledTeam, StepSender, Supervisor, TeamGraph, TeamNode, WorkerNode};

use crate::models::PostGenerationRequest;

pub use research::ResearchNode;
pub use verifier::{VerifierNode, VerifyMode};

/// Name of the content team (a meta-graph member).
pub const CONTENT_TEAM: &str = "Content team";

/// Name of the verification team (a meta-graph member).
pub const VERIFICATION_TEAM: &str = "Verification team";

/// Research worker in the content team.
pub const PAPER_RESEARCHER: &str = "PaperResearcher";

/// Drafting worker in the content team.
pub const LINKEDIN_CREATOR: &str = "LinkedInCreator";

/// Accuracy reviewer in the verification team.
pub const TECH_VERIFIER: &str = "TechVerifier";

/// Style reviewer in the verification team.
pub const STYLE_CHECKER: &str = "StyleChecker";

pub(crate) const RESEARCHER_PROMPT: &str =
    "You are an expert AI researcher who specializes in understanding and summarizing \
     machine learning papers. Research papers thoroughly and extract key insights, \
     methodologies, and results. Focus on accuracy and clarity. Always provide \
     comprehensive information about the paper including its main contributions, \
     methodology, results, and potential impact.";

const CREATOR_PROMPT: &str =
    "You are a social media expert who specializes in creating engaging LinkedIn posts \
     about technical topics. Make complex AI research accessible and engaging for a \
     professional audience. Create posts that drive engagement while maintaining \
     technical accuracy. Always include relevant hashtags and ask engaging questions \
     to encourage comments and discussions.";

const TECH_VERIFIER_PROMPT: &str =
    "You are a technical reviewer and fact-checker specializing in machine learning \
     research. Verify that LinkedIn posts accurately represent the research they \
     discuss. Check for technical accuracy, proper methodology description, and \
     correct representation of results. Flag any oversimplified or incorrect claims, \
     ensure proper attribution to authors, and avoid overstated language.";

const STYLE_CHECKER_PROMPT: &str =
    "You are a LinkedIn content strategist who ensures posts follow best practices for \
     professional social media. Check for appropriate tone, formatting, hashtag usage, \
     engagement elements, and overall LinkedIn style compliance. Suggest improvements \
     to maximize professional impact and engagement.";

const CONTENT_SUPERVISOR_PROMPT: &str =
    "You are a supervisor managing a content creation team with the following workers: \
     {team_members}. Coordinate research and post creation: first have the researcher \
     gather information about the paper, then have the creator make a LinkedIn post \
     based on that research. Ensure the research is thorough before moving to content \
     creation. When both research and post creation are complete, respond with FINISH.";

const VERIFICATION_SUPERVISOR_PROMPT: &str =
    "You are a supervisor managing a verification team with the following workers: \
     {team_members}. Ensure quality control for LinkedIn posts about ML research. Have \
     the technical verifier check accuracy first, then have the style checker ensure \
     LinkedIn compliance. Both verifications must be completed before finishing. When \
     both technical and style verifications are complete, respond with FINISH.";

const META_SUPERVISOR_PROMPT: &str =
    "You are a meta-supervisor managing LinkedIn post generation. You coordinate between \
     the following teams: {team_members}. First direct the Content team to research a \
     paper and create a LinkedIn post. Then send the completed post to the Verification \
     team to check technical accuracy and LinkedIn style compliance. The workflow should \
     be: Content team, then Verification team, then FINISH. Only finish when both teams \
     have completed their work successfully.";

/// Build the content creation team.
pub fn content_team(
    model: Arc<dyn CompletionModel>,
    search: Arc<dyn SearchProvider>,
    recursion_limit: usize,
) -> teamgraph::Result<CompiledTeam> {
    let mut graph = TeamGraph::new(CONTENT_TEAM);
    graph.add_worker(Arc::new(ResearchNode::new(model.clone(), search)));
    graph.add_worker(Arc::new(WorkerNode::new(
        LINKEDIN_CREATOR,
        CREATOR_PROMPT,
        model.clone(),
    )));
    graph.set_supervisor(Supervisor::new(
        "content_supervisor",
        CONTENT_SUPERVISOR_PROMPT,
        vec![PAPER_RESEARCHER.to_string(), LINKEDIN_CREATOR.to_string()],
        model,
    ));
    graph.with_recursion_limit(recursion_limit);
    graph.compile()
}

/// Build the verification team.
pub fn verification_team(
    model: Arc<dyn CompletionModel>,
    recursion_limit: usize,
) -> teamgraph::Result<CompiledTeam> {
    let mut graph = TeamGraph::new(VERIFICATION_TEAM);
    graph.add_worker(Arc::new(VerifierNode::new(
        TECH_VERIFIER,
        TECH_VERIFIER_PROMPT,
        VerifyMode::Technical,
        model.clone(),
    )));
    graph.add_worker(Arc::new(VerifierNode::new(
        STYLE_CHECKER,
        STYLE_CHECKER_PROMPT,
        VerifyMode::Style,
        model.clone(),
    )));
    graph.set_supervisor(Supervisor::new(
        "verification_supervisor",
        VERIFICATION_SUPERVISOR_PROMPT,
        vec![TECH_VERIFIER.to_string(), STYLE_CHECKER.to_string()],
        model,
    ));
    graph.with_recursion_limit(recursion_limit);
    graph.compile()
}

/// Build the full two-level generation graph.
///
/// The content team is seeded with the paper title so the researcher can
/// form its search query; both nested teams forward their step events to
/// `steps` when a sender is given.
///
/// # Errors
///
/// Propagates team compilation failures.
pub fn meta_graph(
    model: Arc<dyn CompletionModel>,
    search: Arc<dyn SearchProvider>,
    recursion_limit: usize,
    paper_title: &str,
    steps: Option<StepSender>,
) -> teamgraph::Result<CompiledTeam> {
    let content = Arc::new(content_team(model.clone(), search, recursion_limit)?);
    let verification = Arc::new(verification_team(model.clone(), recursion_limit)?);

    let mut content_node = TeamNode::new(CONTENT_TEAM, content)
        .with_seed_field(research::PAPER_TITLE_FIELD, json!(paper_title));
    let mut verification_node = TeamNode::new(VERIFICATION_TEAM, verification);
    if let Some(tx) = &steps {
        content_node = content_node.with_step_sender(tx.clone());
        verification_node = verification_node.with_step_sender(tx.clone());
    }

    let mut graph = TeamGraph::new("linkedin_meta");
    graph.add_worker(Arc::new(content_node));
    graph.add_worker(Arc::new(verification_node));
    graph.set_supervisor(Supervisor::new(
        "meta_supervisor",
        META_SUPERVISOR_PROMPT,
        vec![CONTENT_TEAM.to_string(), VERIFICATION_TEAM.to_string()],
        model,
    ));
    graph.with_recursion_limit(recursion_limit);
    graph.compile()
}

/// Format a generation request as the task's opening message.
pub fn format_request(request: &PostGenerationRequest) -> String {
    let mut parts = vec![format!(
        "Create a LinkedIn post about the machine learning paper: '{}'",
        request.paper_title.trim()
    )];

    if let Some(context) = &request.additional_context {
        parts.push(format!("Additional context: {context}"));
    }

    parts.push(format!("Target audience: {}", request.target_audience));
    parts.push(format!(
        "Include technical details: {}",
        if request.include_technical_details { "Yes" } else { "No" }
    ));
    parts.push(format!("Maximum hashtags: {}", request.max_hashtags));
    parts.push(format!("Tone: {}", request.tone));
    parts.push(String::new());
    parts.push("Process:".to_string());
    parts.push("1. First, research the paper thoroughly to understand its methodology, results, and impact".to_string());
    parts.push("2. Create an engaging LinkedIn post based on the research".to_string());
    parts.push("3. Verify the technical accuracy of all claims".to_string());
    parts.push("4. Check that the post follows LinkedIn style best practices".to_string());
    parts.push("5. Provide the final, verified post ready for publication".to_string());

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use teamgraph::llm::{CompletionRequest, UpstreamResult};

    struct NullModel;

    #[async_trait]
    impl CompletionModel for NullModel {
        async fn complete(&self, _request: CompletionRequest) -> UpstreamResult<String> {
            Ok("ok".to_string())
        }

        async fn choose(
            &self,
            _request: CompletionRequest,
            options: &[String],
        ) -> UpstreamResult<String> {
            Ok(options[0].clone())
        }
    }

    struct NullSearch;

    #[async_trait]
    impl teamgraph::llm::SearchProvider for NullSearch {
        async fn search(
            &self,
            _query: &str,
        ) -> UpstreamResult<Vec<teamgraph::llm::SearchResult>> {
            Ok(vec![])
        }
    }

    #[test]
    fn test_graphs_compile() {
        let model: Arc<dyn CompletionModel> = Arc::new(NullModel);
        let search: Arc<dyn teamgraph::llm::SearchProvider> = Arc::new(NullSearch);

        let content = content_team(model.clone(), search.clone(), 50).unwrap();
        assert_eq!(content.member_names(), &[PAPER_RESEARCHER, LINKEDIN_CREATOR]);

        let meta = meta_graph(model, search, 50, "Attention Is All You Need", None).unwrap();
        assert_eq!(meta.member_names(), &[CONTENT_TEAM, VERIFICATION_TEAM]);
    }

    #[test]
    fn test_format_request_includes_all_fields() {
        let request = PostGenerationRequest {
            paper_title: "Attention Is All You Need".to_string(),
            additional_context: Some("Focus on NLP applications".to_string()),
            target_audience: "professional".to_string(),
            include_technical_details: true,
            max_hashtags: 8,
            tone: "professional".to_string(),
        };

        let message = format_request(&request);
        assert!(message.contains("'Attention Is All You Need'"));
        assert!(message.contains("Focus on NLP applications"));
        assert!(message.contains("Maximum hashtags: 8"));
        assert!(message.contains("Include technical details: Yes"));
    }
}
