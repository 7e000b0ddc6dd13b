//! Agent module - Foundation Sprint workshop agents
//!
//! ## Reasoning loop: ReAct (Reasoning + Acting)
//!
//! 1. Think - LLM reasons about the conversation so far
//! 2. Act - Execute the chosen workshop tool
//! 3. Observe - Record the tool result
//! 4. Reflect - Ask the LLM what the observation means
//! 5. Repeat until a final answer or the iteration budget runs out
//!
//! The interactive variant can stop between steps to ask the human a
//! question, persist the session, and pick up again when the reply arrives.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sprintflow_ai::agent::{Agent, AgentInput, AgentProfile, TurnOptions};
//!
//! let agent = Agent::new(AgentProfile::critique(), llm, &registry, store, config);
//! let first = agent
//!     .process_interactive(&AgentInput::new("Review my idea"), None, &TurnOptions::default())
//!     .await?;
//! if first.needs_interaction {
//!     let reply = AgentInput::new("Small bakeries");
//!     agent
//!         .process_interactive(&reply, Some(&first.session_id), &TurnOptions::default())
//!         .await?;
//! }
//! ```

pub mod input;
pub mod interactive;
pub mod output;
pub mod profile;
pub mod prompt;
pub mod react;
mod service;
mod turn;

pub use input::{AgentInput, ConversationTurn, Phase, render_transcript};
pub use interactive::{
    InteractionRecord, InteractionType, InteractiveOutput, InteractiveReActProcessor,
    PendingAction, ReActSessionState, SessionStatus,
};
pub use output::{AgentOutput, FINAL_ANSWER_ACTION, ReasoningStep, Reference, ToolExecution};
pub use profile::{
    AgentProfile, CRITIQUE_AGENT, RESEARCH_AGENT, RegistryExt, THINK_AGENT,
};
pub use react::{ReActProcessor, synthesize_response};
pub use service::{Agent, AgentService};
pub use turn::{TurnOptions, is_interruption};
