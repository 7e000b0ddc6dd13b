//! OpenAI-compatible chat completions provider

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AiError, Result};
use crate::http_client::build_http_client;
use crate::llm::client::{
    CompletionRequest, CompletionResponse, FinishReason, LlmClient, Role, TokenUsage, ToolCall,
};
use crate::llm::retry::{LlmRetryConfig, response_to_error};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

/// OpenAI client
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    retry_config: LlmRetryConfig,
}

impl OpenAIClient {
    /// Create a new OpenAI client
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: build_http_client(),
            api_key: api_key.into(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            retry_config: LlmRetryConfig::default(),
        }
    }

    /// Set the model to use
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set custom base URL (for API-compatible services)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_config(mut self, config: LlmRetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    fn build_body(&self, request: CompletionRequest) -> OpenAIRequest {
        let messages = request
            .messages
            .into_iter()
            .map(|m| OpenAIMessage {
                role: match m.role {
                    Role::System => "system",
                    Role::User => "user",
                    Role::Assistant => "assistant",
                },
                content: m.content,
            })
            .collect();

        let tools = (!request.tools.is_empty()).then(|| {
            request
                .tools
                .into_iter()
                .map(|t| OpenAITool {
                    r#type: "function",
                    function: OpenAIFunction {
                        name: t.name,
                        description: t.description,
                        parameters: t.parameters,
                    },
                })
                .collect()
        });

        OpenAIRequest {
            model: request.model.unwrap_or_else(|| self.model.clone()),
            messages,
            tools,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct OpenAITool {
    r#type: &'static str,
    function: OpenAIFunction,
}

#[derive(Serialize)]
struct OpenAIFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Deserialize)]
struct OpenAIToolCall {
    id: String,
    function: OpenAIFunctionCall,
}

#[derive(Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl OpenAIResponse {
    fn into_completion(self) -> Option<CompletionResponse> {
        let usage = self.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        let choice = self.choices.into_iter().next()?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: serde_json::from_str(&tc.function.arguments).unwrap_or(Value::Null),
            })
            .collect();

        Some(CompletionResponse {
            content: choice.message.content,
            tool_calls,
            finish_reason: choice
                .finish_reason
                .as_deref()
                .map(FinishReason::from_provider)
                .unwrap_or_default(),
            usage,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    fn provider(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = self.build_body(request);
        let url = format!("{}/chat/completions", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.retry_config.max_retries {
            let sent = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await;

            let error = match sent {
                Ok(response) if response.status().is_success() => {
                    let data: OpenAIResponse = response.json().await?;
                    return data
                        .into_completion()
                        .ok_or_else(|| AiError::Llm("No response from OpenAI".to_string()));
                }
                Ok(response) => response_to_error(response, "OpenAI").await,
                Err(e) => AiError::Http(e),
            };

            if !error.is_retryable() || attempt == self.retry_config.max_retries {
                return Err(error);
            }

            let delay = self
                .retry_config
                .delay_for(attempt + 1, error.retry_after());
            tracing::warn!(
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Retrying OpenAI request"
            );
            tokio::time::sleep(delay).await;
            last_error = Some(error);
        }

        Err(last_error
            .unwrap_or_else(|| AiError::Llm("OpenAI request failed after retries".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::{LlmOptions, Message};
    use sprintflow_traits::ToolSchema;

    #[test]
    fn test_build_body_uses_request_model_override() {
        let client = OpenAIClient::new("sk-test").with_model("gpt-4o");
        let request = CompletionRequest::from_prompt(
            "hello",
            &LlmOptions::new().with_model("gpt-4o-mini").with_system_prompt("sys"),
        );

        let body = serde_json::to_value(client.build_body(request)).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_build_body_includes_tools() {
        let client = OpenAIClient::new("sk-test");
        let request = CompletionRequest::new(vec![Message::user("hi")]).with_tools(vec![
            ToolSchema {
                name: "web_search".to_string(),
                description: "Search".to_string(),
                parameters: serde_json::json!({"type": "object"}),
            },
        ]);

        let body = serde_json::to_value(client.build_body(request)).unwrap();
        assert_eq!(body["model"], DEFAULT_OPENAI_MODEL);
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "web_search");
    }

    #[test]
    fn test_response_conversion() {
        let data: OpenAIResponse = serde_json::from_value(serde_json::json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "function": {"name": "brainstorm", "arguments": "{\"topic\":\"pricing\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 3, "completion_tokens": 4, "total_tokens": 7}
        }))
        .unwrap();

        let response = data.into_completion().unwrap();
        assert_eq!(response.finish_reason, FinishReason::ToolCalls);
        assert_eq!(response.tool_calls[0].arguments["topic"], "pricing");
        assert_eq!(response.usage.unwrap().total_tokens, 7);
    }

    #[tokio::test]
    #[ignore = "requires OPENAI_API_KEY"]
    async fn test_real_completion() {
        let key = std::env::var("OPENAI_API_KEY").unwrap();
        let client = OpenAIClient::new(key).with_model("gpt-4o-mini");
        let text = client
            .complete_text("Say hi", &LlmOptions::new().with_max_tokens(10))
            .await
            .unwrap();
        assert!(!text.is_empty());
    }
}
