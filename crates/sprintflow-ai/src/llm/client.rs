//! LLM client trait and types

use std::pin::Pin;

use async_stream::try_stream;
use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sprintflow_traits::ToolSchema;

use crate::error::Result;

/// Chat message role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Tool call request from LLM
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// LLM completion response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: FinishReason,
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// Response text, empty when the model returned none.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

/// Reason for completion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    #[default]
    Stop,
    ToolCalls,
    MaxTokens,
    Error,
}

impl FinishReason {
    /// Map a provider finish/stop reason string.
    pub fn from_provider(reason: &str) -> Self {
        match reason {
            "stop" | "end_turn" | "stop_sequence" => FinishReason::Stop,
            "tool_calls" | "tool_use" => FinishReason::ToolCalls,
            "length" | "max_tokens" => FinishReason::MaxTokens,
            _ => FinishReason::Error,
        }
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Per-call generation options. Unset fields take provider defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl LlmOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// LLM completion request
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolSchema>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Overrides the client's configured model for this call.
    pub model: Option<String>,
}

impl CompletionRequest {
    /// Create a new completion request
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// Build a single-prompt request, applying the options.
    pub fn from_prompt(prompt: &str, options: &LlmOptions) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = options.system_prompt.as_deref()
            && !system.is_empty()
        {
            messages.push(Message::system(system));
        }
        messages.push(Message::user(prompt));

        Self {
            messages,
            tools: Vec::new(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            model: options.model.clone(),
        }
    }

    /// Add tools to the request
    pub fn with_tools(mut self, tools: Vec<ToolSchema>) -> Self {
        self.tools = tools;
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// First system message, if any.
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
    }
}

/// Incremental piece of a streamed completion.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamChunk {
    pub text: String,
    pub finish_reason: Option<FinishReason>,
}

impl StreamChunk {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: None,
        }
    }

    pub fn final_chunk(finish_reason: FinishReason) -> Self {
        Self {
            text: String::new(),
            finish_reason: Some(finish_reason),
        }
    }
}

pub type StreamResult = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>;

/// LLM client trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Get provider name
    fn provider(&self) -> &str;

    /// Get model name
    fn model(&self) -> &str;

    /// Complete a chat request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Complete a single prompt and return the text.
    async fn complete_text(&self, prompt: &str, options: &LlmOptions) -> Result<String> {
        let response = self
            .complete(CompletionRequest::from_prompt(prompt, options))
            .await?;
        Ok(response.content.unwrap_or_default())
    }

    /// Complete a single prompt while advertising the given tools.
    async fn complete_with_tools(
        &self,
        prompt: &str,
        tools: &[ToolSchema],
        options: &LlmOptions,
    ) -> Result<CompletionResponse> {
        let request = CompletionRequest::from_prompt(prompt, options).with_tools(tools.to_vec());
        self.complete(request).await
    }
}

/// Stream a completion from any shared client.
///
/// Runs one full completion and replays it word by word; no provider here
/// streams over the wire.
pub fn complete_stream(
    client: std::sync::Arc<dyn LlmClient>,
    request: CompletionRequest,
) -> StreamResult {
    Box::pin(try_stream! {
        let response = client.complete(request).await?;
        let text = response.content.unwrap_or_default();
        for word in text.split_inclusive(char::is_whitespace) {
            yield StreamChunk::text(word);
        }
        yield StreamChunk::final_chunk(response.finish_reason);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_prompt_applies_options() {
        let options = LlmOptions::new()
            .with_temperature(0.5)
            .with_max_tokens(200)
            .with_system_prompt("be brief")
            .with_model("gpt-4o-mini");
        let request = CompletionRequest::from_prompt("hello", &options);

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.system_prompt(), Some("be brief"));
        assert_eq!(request.messages[1], Message::user("hello"));
        assert_eq!(request.temperature, Some(0.5));
        assert_eq!(request.max_tokens, Some(200));
        assert_eq!(request.model.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn test_from_prompt_skips_empty_system_prompt() {
        let request = CompletionRequest::from_prompt("hi", &LlmOptions::new().with_system_prompt(""));
        assert_eq!(request.messages.len(), 1);
        assert!(request.system_prompt().is_none());
    }

    #[test]
    fn test_finish_reason_mapping() {
        assert_eq!(FinishReason::from_provider("stop"), FinishReason::Stop);
        assert_eq!(FinishReason::from_provider("tool_use"), FinishReason::ToolCalls);
        assert_eq!(FinishReason::from_provider("length"), FinishReason::MaxTokens);
        assert_eq!(FinishReason::from_provider("weird"), FinishReason::Error);
    }
}
