//! Anthropic messages API provider.
//!
//! Tool calling is not sent as native tool blocks. When a request carries
//! tools, their descriptions are appended to the last user turn and the reply
//! is scanned for `Tool:` / `Arguments:` lines instead.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sprintflow_traits::ToolSchema;

use crate::error::{AiError, Result};
use crate::http_client::build_http_client;
use crate::llm::client::{
    CompletionRequest, CompletionResponse, FinishReason, LlmClient, Role, TokenUsage, ToolCall,
};
use crate::llm::retry::response_to_error;

pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Anthropic client
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl AnthropicClient {
    /// Create a new Anthropic client
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: build_http_client(),
            api_key: api_key.into(),
            model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
        }
    }

    /// Set the model to use
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set custom base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn build_body(&self, request: &CompletionRequest) -> AnthropicRequest {
        let system = request.system_prompt().map(str::to_string);

        let mut messages: Vec<AnthropicMessage> = request
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| AnthropicMessage {
                role: if m.role == Role::Assistant {
                    "assistant"
                } else {
                    "user"
                },
                content: m.content.clone(),
            })
            .collect();

        if !request.tools.is_empty()
            && let Some(last_user) = messages.iter_mut().rev().find(|m| m.role == "user")
        {
            last_user.content = with_tool_instructions(&last_user.content, &request.tools);
        }

        AnthropicRequest {
            model: request.model.clone().unwrap_or_else(|| self.model.clone()),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system,
            messages,
            temperature: request.temperature,
        }
    }
}

/// Append the text-protocol tool menu to a prompt.
pub fn with_tool_instructions(prompt: &str, tools: &[ToolSchema]) -> String {
    let descriptions = tools
        .iter()
        .map(|t| format!("- {}: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{prompt}\n\nAvailable tools:\n{descriptions}\n\nIf you need to use a tool, respond with:\nTool: [tool_name]\nArguments: [JSON arguments]\n\nOtherwise, provide your response directly."
    )
}

/// Extract a `Tool:` / `Arguments:` call from reply text.
///
/// Arguments may continue over following lines until the next `Tool:` line and
/// must decode as a JSON object.
pub fn parse_text_tool_call(content: &str) -> Option<ToolCall> {
    if !content.contains("Tool:") || !content.contains("Arguments:") {
        return None;
    }

    let lines: Vec<&str> = content.lines().collect();
    let mut tool_name = String::new();
    let mut arguments = String::new();

    for (i, line) in lines.iter().enumerate() {
        if let Some(rest) = line.strip_prefix("Tool:") {
            tool_name = rest.trim().to_string();
        }
        if let Some(rest) = line.strip_prefix("Arguments:") {
            arguments = rest.trim().to_string();
            for next in lines.iter().skip(i + 1) {
                if next.starts_with("Tool:") {
                    break;
                }
                arguments.push('\n');
                arguments.push_str(next);
            }
        }
    }

    if tool_name.is_empty() || arguments.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(arguments.trim()) {
        Ok(args @ Value::Object(_)) => Some(ToolCall {
            id: format!("call_{}", uuid::Uuid::new_v4().simple()),
            name: tool_name,
            arguments: args,
        }),
        _ => None,
    }
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicResponseBlock>,
    stop_reason: Option<String>,
    usage: Option<AnthropicUsage>,
}

#[derive(Deserialize)]
struct AnthropicResponseBlock {
    r#type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[async_trait]
impl LlmClient for AnthropicClient {
    fn provider(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = self.build_body(&request);

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(response_to_error(response, "Anthropic").await);
        }

        let data: AnthropicResponse = response.json().await?;
        let content: String = data
            .content
            .iter()
            .filter(|block| block.r#type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("");

        if content.is_empty() && data.content.is_empty() {
            return Err(AiError::Llm("Empty response from Anthropic".to_string()));
        }

        let tool_calls: Vec<ToolCall> = if request.tools.is_empty() {
            Vec::new()
        } else {
            parse_text_tool_call(&content).into_iter().collect()
        };

        let finish_reason = if tool_calls.is_empty() {
            data.stop_reason
                .as_deref()
                .map(FinishReason::from_provider)
                .unwrap_or_default()
        } else {
            FinishReason::ToolCalls
        };

        Ok(CompletionResponse {
            content: Some(content),
            tool_calls,
            finish_reason,
            usage: data.usage.map(|u| TokenUsage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
                total_tokens: u.input_tokens + u.output_tokens,
            }),
        })
    }
}
