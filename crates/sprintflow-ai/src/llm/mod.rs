//! LLM module - Multi-provider LLM client abstraction

mod anthropic;
mod client;
pub mod factory;
mod mock_client;
mod openai;
pub mod retry;

pub use anthropic::{AnthropicClient, parse_text_tool_call, with_tool_instructions};
pub use client::{
    CompletionRequest, CompletionResponse, FinishReason, LlmClient, LlmOptions, Message, Role,
    StreamChunk, StreamResult, TokenUsage, ToolCall, complete_stream,
};
pub use factory::{LlmProvider, create_client, from_env};
pub use mock_client::{MOCK_FALLBACK_REPLY, MockLlmClient, MockStep, MockStepKind};
pub use openai::OpenAIClient;
pub use retry::LlmRetryConfig;
