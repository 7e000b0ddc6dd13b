//! Resumable ReAct session state.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::agent::input::{AgentInput, ConversationTurn};
use crate::agent::output::ReasoningStep;
use crate::error::AiError;

/// Session lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// The loop may run.
    Active,
    /// Blocked on a pending action.
    Paused,
    Completed,
    Failed,
    /// Idle longer than the store's time-to-live.
    Expired,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Paused => "paused",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
            SessionStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Failed | SessionStatus::Expired
        )
    }

    pub fn can_continue(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SessionStatus::Active),
            "paused" => Ok(SessionStatus::Paused),
            "completed" => Ok(SessionStatus::Completed),
            "failed" => Ok(SessionStatus::Failed),
            "expired" => Ok(SessionStatus::Expired),
            other => Err(AiError::Session(format!("Unknown session status '{other}'"))),
        }
    }
}

/// Kind of human input a paused session waits for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    #[default]
    None,
    NeedInput,
    Confirmation,
    Choice,
    Clarification,
}

impl InteractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::None => "none",
            InteractionType::NeedInput => "need_input",
            InteractionType::Confirmation => "confirmation",
            InteractionType::Choice => "choice",
            InteractionType::Clarification => "clarification",
        }
    }

    pub fn needs_user(&self) -> bool {
        !matches!(self, InteractionType::None)
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a paused session is blocked on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAction {
    pub action: String,
    pub action_input: String,
    pub waiting_for: InteractionType,
    pub requested_at: DateTime<Utc>,
    pub timeout_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub validation_rules: BTreeMap<String, String>,
}

impl PendingAction {
    pub fn new(
        action: impl Into<String>,
        action_input: impl Into<String>,
        waiting_for: InteractionType,
        timeout: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            action: action.into(),
            action_input: action_input.into(),
            waiting_for,
            requested_at: now,
            timeout_at: now.checked_add_signed(timeout).unwrap_or(DateTime::<Utc>::MAX_UTC),
            required_fields: Vec::new(),
            validation_rules: BTreeMap::new(),
        }
    }

    pub fn is_timed_out(&self, now: DateTime<Utc>) -> bool {
        now > self.timeout_at
    }
}

/// One human reply merged into a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: InteractionType,
    pub prompt: String,
    pub user_response: String,
    pub validated: bool,
    pub used_in_step: usize,
}

/// The resumable unit of work for one agent conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReActSessionState {
    pub session_id: String,
    pub agent_name: String,
    pub start_time: DateTime<Utc>,
    pub last_update_time: DateTime<Utc>,
    pub current_iteration: usize,
    pub max_iterations: usize,
    pub conversation: Vec<ConversationTurn>,
    pub system_prompt: String,
    /// Captured at creation and never overwritten.
    pub original_input: AgentInput,
    pub completed_steps: Vec<ReasoningStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_action: Option<PendingAction>,
    #[serde(default)]
    pub collected_data: Map<String, Value>,
    #[serde(default)]
    pub interactions: Vec<InteractionRecord>,
    pub status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReActSessionState {
    pub fn new(
        session_id: impl Into<String>,
        agent_name: impl Into<String>,
        system_prompt: impl Into<String>,
        original_input: AgentInput,
        conversation: Vec<ConversationTurn>,
        max_iterations: usize,
    ) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            agent_name: agent_name.into(),
            start_time: now,
            last_update_time: now,
            current_iteration: 0,
            max_iterations,
            conversation,
            system_prompt: system_prompt.into(),
            original_input,
            completed_steps: Vec::new(),
            pending_action: None,
            collected_data: Map::new(),
            interactions: Vec::new(),
            status: SessionStatus::Active,
            error: None,
        }
    }

    pub fn touch(&mut self) {
        self.last_update_time = Utc::now();
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn has_budget(&self) -> bool {
        self.current_iteration < self.max_iterations
    }

    /// Park the loop on `pending`, keeping the partial step.
    pub fn pause(&mut self, step: ReasoningStep, pending: PendingAction) {
        self.completed_steps.push(step);
        self.pending_action = Some(pending);
        self.status = SessionStatus::Paused;
        self.touch();
    }

    pub fn complete(&mut self) {
        self.pending_action = None;
        self.status = SessionStatus::Completed;
        self.touch();
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.pending_action = None;
        self.error = Some(error.into());
        self.status = SessionStatus::Failed;
        self.touch();
    }

    /// Time since the last update.
    pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        now - self.last_update_time
    }

    /// Lazy-expiry view: non-terminal sessions idle past `ttl` read as expired.
    pub fn apply_expiry(&mut self, ttl: Duration, now: DateTime<Utc>) {
        if !self.is_terminal() && self.idle_for(now) > ttl {
            self.status = SessionStatus::Expired;
            self.pending_action = None;
        }
    }

    /// First structural invariant this state breaks, if any.
    pub fn invariant_violation(&self) -> Option<String> {
        if self.current_iteration > self.max_iterations {
            return Some(format!(
                "current_iteration {} exceeds max_iterations {}",
                self.current_iteration, self.max_iterations
            ));
        }

        let paused = self.status == SessionStatus::Paused;
        if paused != self.pending_action.is_some() {
            return Some(format!(
                "status {} with pending action present = {}",
                self.status,
                self.pending_action.is_some()
            ));
        }

        self.completed_steps
            .iter()
            .enumerate()
            .find(|(index, step)| step.step_number != index + 1)
            .map(|(index, step)| {
                format!(
                    "step at position {} is numbered {}",
                    index + 1,
                    step.step_number
                )
            })
    }
}
