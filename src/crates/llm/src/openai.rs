//! OpenAI-compatible chat completion client.
//!
//! Implements [`CompletionModel`] over the `/chat/completions` endpoint.
//! The constrained-choice mode used by supervisors forces a `route` function
//! call whose single `next` parameter is an enum over the allowed options -
//! the same mechanism the service's routing protocol expects providers to
//! honor. When a provider answers with plain text instead of a tool call,
//! the text is returned as-is and the engine's closed-set validation takes
//! over.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use teamgraph::llm::{CompletionModel, CompletionRequest, UpstreamError, UpstreamResult};
use teamgraph::Message;

use crate::config::OpenAiConfig;
use crate::error::LlmError;

/// OpenAI API client.
#[derive(Clone)]
pub struct OpenAiClient {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiClient {
    /// Create a client with the given configuration.
    ///
    /// # Errors
    ///
    /// Fails if the underlying HTTP client cannot be constructed.
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Convert a conversation message to the wire format.
    ///
    /// Attributed messages keep their author as a content prefix so the
    /// model can tell team members apart; the API-level `name` field is
    /// avoided because worker names may contain spaces.
    fn convert_message(msg: &Message) -> ApiMessage {
        let content = match &msg.name {
            Some(name) => format!("{name}: {}", msg.content),
            None => msg.content.clone(),
        };
        ApiMessage {
            role: "user".to_string(),
            content,
        }
    }

    fn build_messages(request: &CompletionRequest) -> Vec<ApiMessage> {
        let mut messages = vec![ApiMessage {
            role: "system".to_string(),
            content: request.system.clone(),
        }];
        messages.extend(request.messages.iter().map(Self::convert_message));
        messages
    }

    async fn send(&self, body: ChatRequestBody) -> Result<ChatCompletionResponse, LlmError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut message = response.text().await.unwrap_or_default();
            message.truncate(500);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<ChatCompletionResponse>().await?)
    }
}

#[async_trait]
impl CompletionModel for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> UpstreamResult<String> {
        let body = ChatRequestBody {
            model: self.config.model.clone(),
            messages: Self::build_messages(&request),
            temperature: Some(request.temperature.unwrap_or(self.config.temperature)),
            tools: None,
            tool_choice: None,
        };

        let response = self.send(body).await.map_err(UpstreamError::from)?;
        let text = extract_text(&response).map_err(UpstreamError::from)?;
        tracing::debug!(model = %self.config.model, chars = text.len(), "completion received");
        Ok(text)
    }

    async fn choose(
        &self,
        request: CompletionRequest,
        options: &[String],
    ) -> UpstreamResult<String> {
        let body = ChatRequestBody {
            model: self.config.model.clone(),
            messages: Self::build_messages(&request),
            // Routing decisions are sampled cold.
            temperature: Some(0.0),
            tools: Some(vec![route_tool(options)]),
            tool_choice: Some(json!({"type": "function", "function": {"name": "route"}})),
        };

        let response = self.send(body).await.map_err(UpstreamError::from)?;
        let choice = extract_choice(&response).map_err(UpstreamError::from)?;
        Ok(choice)
    }
}

/// Build the forced `route` tool over a closed option set.
fn route_tool(options: &[String]) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": "route",
            "description": "Select the next role.",
            "parameters": {
                "type": "object",
                "properties": {
                    "next": {
                        "type": "string",
                        "enum": options,
                    },
                },
                "required": ["next"],
            },
        },
    })
}

/// Extract plain completion text.
fn extract_text(response: &ChatCompletionResponse) -> Result<String, LlmError> {
    response
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .ok_or_else(|| LlmError::InvalidResponse("no completion content".into()))
}

/// Extract the routed value from a `route` tool call, falling back to the
/// message text when the provider ignored the forced tool.
fn extract_choice(response: &ChatCompletionResponse) -> Result<String, LlmError> {
    let message = response
        .choices
        .first()
        .map(|c| &c.message)
        .ok_or_else(|| LlmError::InvalidResponse("no choices in response".into()))?;

    if let Some(call) = message
        .tool_calls
        .as_ref()
        .and_then(|calls| calls.iter().find(|c| c.function.name == "route"))
    {
        let args: Value = serde_json::from_str(&call.function.arguments)
            .map_err(|e| LlmError::InvalidResponse(format!("bad route arguments: {e}")))?;
        return args
            .get("next")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| LlmError::InvalidResponse("route call missing 'next'".into()));
    }

    message
        .content
        .clone()
        .ok_or_else(|| LlmError::InvalidResponse("no tool call and no content".into()))
}

#[derive(Debug, Serialize)]
struct ChatRequestBody {
    model: String,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    arguments: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_tool_schema() {
        let tool = route_tool(&["A".into(), "FINISH".into()]);
        assert_eq!(tool["function"]["name"], "route");
        assert_eq!(
            tool["function"]["parameters"]["properties"]["next"]["enum"],
            json!(["A", "FINISH"])
        );
    }

    #[test]
    fn test_convert_message_prefixes_author() {
        let msg = OpenAiClient::convert_message(&Message::from_worker("TechVerifier", "ok"));
        assert_eq!(msg.content, "TechVerifier: ok");
        assert_eq!(msg.role, "user");
    }

    #[test]
    fn test_extract_choice_from_tool_call() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "function": {
                            "name": "route",
                            "arguments": "{\"next\": \"Content team\"}",
                        }
                    }]
                }
            }]
        }))
        .unwrap();

        assert_eq!(extract_choice(&response).unwrap(), "Content team");
    }

    #[test]
    fn test_extract_choice_text_fallback() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": "FINISH"}}]
        }))
        .unwrap();

        assert_eq!(extract_choice(&response).unwrap(), "FINISH");
    }

    #[test]
    fn test_extract_choice_rejects_empty() {
        let response: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(extract_choice(&response).is_err());
    }

    #[test]
    fn test_extract_errors_map_to_upstream() {
        let response: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": []})).unwrap();
        let mapped: UpstreamResult<String> =
            extract_text(&response).map_err(UpstreamError::from);
        assert!(mapped.unwrap_err().to_string().contains("no completion content"));
    }

    #[test]
    fn test_extract_text() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": "a post"}}]
        }))
        .unwrap();
        assert_eq!(extract_text(&response).unwrap(), "a post");
    }
}
