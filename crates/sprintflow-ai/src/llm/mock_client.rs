//! Deterministic mock LLM client for engine tests and offline runs.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{Duration, sleep};

use crate::error::{AiError, Result};

use super::{CompletionRequest, CompletionResponse, FinishReason, LlmClient, TokenUsage};

/// Reply used once the script runs dry.
pub const MOCK_FALLBACK_REPLY: &str =
    "Thought: I have enough to answer.\nAction: Final Answer\nAction Input: mock-ok";

/// Deterministic step for scripted mock completions.
#[derive(Debug, Clone)]
pub enum MockStepKind {
    /// Return a plain assistant message.
    Text(String),
    /// Return an LLM error.
    Error(String),
    /// Return a timeout-like error after optional delay.
    Timeout,
}

/// Scripted completion step with optional delay.
#[derive(Debug, Clone)]
pub struct MockStep {
    pub delay_ms: u64,
    pub kind: MockStepKind,
}

impl MockStep {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            delay_ms: 0,
            kind: MockStepKind::Text(content.into()),
        }
    }

    /// A ReAct-formatted reply.
    pub fn react(thought: &str, action: &str, action_input: &str) -> Self {
        Self::text(format!(
            "Thought: {thought}\nAction: {action}\nAction Input: {action_input}"
        ))
    }

    /// A ReAct reply carrying a final answer.
    pub fn final_answer(answer: &str) -> Self {
        Self::react("I now have what I need.", "Final Answer", answer)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            delay_ms: 0,
            kind: MockStepKind::Error(message.into()),
        }
    }

    pub fn timeout(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            kind: MockStepKind::Timeout,
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

/// A deterministic mock LLM client driven by scripted steps.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    model: String,
    script: Arc<Mutex<VecDeque<MockStep>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockLlmClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self::from_steps(model, Vec::new())
    }

    pub fn from_steps(model: impl Into<String>, steps: Vec<MockStep>) -> Self {
        Self {
            model: model.into(),
            script: Arc::new(Mutex::new(VecDeque::from(steps))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn push_step(&self, step: MockStep) {
        self.script.lock().await.push_back(step);
    }

    /// Steps not yet consumed.
    pub async fn remaining(&self) -> usize {
        self.script.lock().await.len()
    }

    /// Every request received so far, in order.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_step(&self) -> Option<MockStep> {
        self.script.lock().await.pop_front()
    }

    fn text_response(content: String) -> CompletionResponse {
        let completion_tokens = content.len() as u32;
        CompletionResponse {
            content: Some(content),
            tool_calls: Vec::new(),
            finish_reason: FinishReason::Stop,
            usage: Some(TokenUsage {
                prompt_tokens: 1,
                completion_tokens,
                total_tokens: 1 + completion_tokens,
            }),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.requests.lock().await.push(request);

        let Some(step) = self.next_step().await else {
            return Ok(Self::text_response(MOCK_FALLBACK_REPLY.to_string()));
        };

        if step.delay_ms > 0 {
            sleep(Duration::from_millis(step.delay_ms)).await;
        }

        match step.kind {
            MockStepKind::Text(content) => Ok(Self::text_response(content)),
            MockStepKind::Error(message) => Err(AiError::Llm(message)),
            MockStepKind::Timeout => Err(AiError::Llm("mock timeout".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmOptions, complete_stream};
    use futures::StreamExt;

    #[tokio::test]
    async fn test_scripted_steps_then_fallback() {
        let client = MockLlmClient::from_steps(
            "mock-model",
            vec![MockStep::text("first"), MockStep::error("boom")],
        );
        let options = LlmOptions::new();

        assert_eq!(client.complete_text("a", &options).await.unwrap(), "first");
        assert!(client.complete_text("b", &options).await.is_err());
        assert_eq!(
            client.complete_text("c", &options).await.unwrap(),
            MOCK_FALLBACK_REPLY
        );
        assert_eq!(client.requests().await.len(), 3);
    }

    #[tokio::test]
    async fn test_stream_replays_words() {
        let client: Arc<dyn LlmClient> = Arc::new(MockLlmClient::from_steps(
            "mock-model",
            vec![MockStep::text("hello brave world")],
        ));

        let chunks: Vec<_> = complete_stream(
            client,
            CompletionRequest::from_prompt("hi", &LlmOptions::new()),
        )
        .collect()
        .await;

        let text: String = chunks
            .iter()
            .map(|c| c.as_ref().unwrap().text.clone())
            .collect();
        assert_eq!(text, "hello brave world");
        assert_eq!(chunks.len(), 4);
        assert_eq!(
            chunks.last().unwrap().as_ref().unwrap().finish_reason,
            Some(FinishReason::Stop)
        );
    }
}
