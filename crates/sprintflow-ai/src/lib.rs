//! SprintFlow AI - Interactive ReAct agents for Foundation Sprint workshops
//!
//! This crate provides:
//! - ReAct (Reasoning + Acting) loop for workshop agents
//! - Interactive sessions that pause for human input and resume later
//! - Session stores (in-memory with background sweeping, redb-backed)
//! - Multi-provider LLM client (OpenAI, Anthropic, scripted mock)
//! - The Think, Critique and Research agent profiles and their tools

pub mod agent;
pub mod config;
pub mod error;
mod http_client;
pub mod llm;
pub mod session;
pub mod tools;

// Re-export commonly used types
pub use agent::{
    Agent, AgentInput, AgentOutput, AgentProfile, AgentService, InteractionType,
    InteractiveOutput, InteractiveReActProcessor, Phase, ReActProcessor, ReActSessionState,
    SessionStatus, TurnOptions, is_interruption,
};
pub use config::{ConfidencePolicy, DEFAULT_MAX_ITERATIONS, EngineConfig};
pub use error::{AiError, Result};
pub use llm::{
    AnthropicClient, LlmClient, LlmOptions, LlmProvider, MockLlmClient, MockStep, OpenAIClient,
};
pub use session::{MemorySessionStore, PersistentSessionStore, SessionStore, SweeperHandle};
pub use tools::{register_workshop_tools, workshop_registry};
