//! Provider implementations for the `teamgraph` collaborator traits.
//!
//! The engine depends only on the narrow traits in [`teamgraph::llm`]; this
//! crate supplies the concrete clients:
//!
//! - [`OpenAiClient`] - an OpenAI-compatible chat completion client. Its
//!   constrained-choice mode forces a `route` function call whose parameter
//!   schema is an enum over the allowed options, so supervisors get a
//!   single value from the closed set whenever the provider cooperates.
//! - [`TavilyClient`] - the Tavily web search API, used by the research
//!   worker.
//!
//! Both clients are plain `reqwest` wrappers with bounded timeouts; all
//! retry and validation policy lives in the engine, not here.

pub mod config;
pub mod error;
pub mod openai;
pub mod tavily;

pub use config::{OpenAiConfig, TavilyConfig};
pub use error::LlmError;
pub use openai::OpenAiClient;
pub use tavily::TavilyClient;
