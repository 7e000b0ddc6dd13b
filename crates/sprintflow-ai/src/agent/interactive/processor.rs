//! ReAct loop with suspend and resume around human input.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::agent::input::{AgentInput, ConversationTurn};
use crate::agent::output::AgentOutput;
use crate::agent::prompt;
use crate::agent::react::{ReActProcessor, should_provide_answer, step_from, synthesize_response};
use crate::agent::turn::{TurnOptions, is_interruption};
use crate::error::Result;
use crate::session::SessionStore;

use super::interaction::{classify_interaction, interaction_options, interaction_prompt};
use super::session::{
    InteractionRecord, InteractionType, PendingAction, ReActSessionState, SessionStatus,
};

/// Response for a resume attempt against a finished session.
pub const SESSION_ENDED_RESPONSE: &str = "Session has ended and cannot be continued";

/// Result of one interactive turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractiveOutput {
    #[serde(flatten)]
    pub output: AgentOutput,
    pub needs_interaction: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_type: Option<InteractionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_context: Option<Map<String, Value>>,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_state: Option<ReActSessionState>,
    pub can_continue: bool,
}

impl InteractiveOutput {
    pub fn status(&self) -> Option<SessionStatus> {
        self.session_state.as_ref().map(|s| s.status)
    }
}

/// Wraps a [`ReActProcessor`] with persisted, resumable sessions.
pub struct InteractiveReActProcessor {
    processor: ReActProcessor,
    store: Arc<dyn SessionStore>,
}

impl InteractiveReActProcessor {
    pub fn new(processor: ReActProcessor, store: Arc<dyn SessionStore>) -> Self {
        Self { processor, store }
    }

    pub fn processor(&self) -> &ReActProcessor {
        &self.processor
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Start a session, or continue `session_id` with `input.query` as the
    /// human reply.
    ///
    /// Unknown ids start fresh. Finished sessions are reported, not resumed,
    /// and are left untouched in the store. The session is saved after every
    /// turn that was not cancelled; a failed save is logged only.
    #[tracing::instrument(skip_all, fields(agent = %self.agent_name(), session_id = session_id.unwrap_or("")))]
    pub async fn process_interactive(
        &self,
        input: &AgentInput,
        session_id: Option<&str>,
        turn: &TurnOptions,
    ) -> Result<InteractiveOutput> {
        turn.check()?;

        let existing = match session_id.filter(|id| !id.is_empty()) {
            Some(id) => match self.store.load(id).await {
                Ok(session) => Some(session),
                Err(err) => {
                    debug!(error = %err, "Session not resumable, starting a new one");
                    None
                }
            },
            None => None,
        };

        let mut session = match existing {
            Some(session) if session.is_terminal() => {
                info!(status = %session.status, "Resume attempted on finished session");
                return Ok(self.ended_output(session));
            }
            Some(mut session) => {
                self.merge_input(&mut session, input);
                session
            }
            None => self.start_session(input),
        };

        let result = match self.run_loop(&mut session, turn).await {
            Err(err) if is_interruption(&err) => return Err(err),
            other => other,
        };

        if let Err(err) = self.store.save(&session).await {
            warn!(session_id = %session.session_id, error = %err, "Failed to save session");
        }

        let (output, paused) = result?;
        Ok(self.build_output(output, paused, session))
    }

    fn agent_name(&self) -> &str {
        &self.processor.profile().name
    }

    fn start_session(&self, input: &AgentInput) -> ReActSessionState {
        let session_id = format!("{}_{}", self.agent_name(), Uuid::new_v4().simple());
        info!(session_id = %session_id, "Starting session");
        ReActSessionState::new(
            session_id,
            self.agent_name(),
            self.processor.system_prompt(),
            input.clone(),
            self.processor.opening_transcript(input),
            self.processor.max_iterations(),
        )
    }

    /// Fold a caller's reply into a live session.
    fn merge_input(&self, session: &mut ReActSessionState, input: &AgentInput) {
        session
            .conversation
            .push(ConversationTurn::user(input.query.clone()));

        if let Some(pending) = &session.pending_action {
            let now = Utc::now();
            let validated = !pending.is_timed_out(now);
            if !validated {
                warn!(session_id = %session.session_id, "Reply arrived after the pending action timed out");
            }
            session.interactions.push(InteractionRecord {
                timestamp: now,
                kind: pending.waiting_for,
                prompt: interaction_prompt(pending),
                user_response: input.query.clone(),
                validated,
                used_in_step: session.current_iteration,
            });
            session.collected_data.insert(
                format!("user_input_{}", session.interactions.len()),
                Value::String(input.query.clone()),
            );
        }

        session.status = SessionStatus::Active;
        session.touch();
    }

    /// Backfill the paused step with the reply and clear the pending action.
    async fn resolve_pending(&self, session: &mut ReActSessionState, turn: &TurnOptions) -> Result<()> {
        if session.pending_action.is_none() {
            return Ok(());
        }

        let reply = session.interactions.last().map(|i| i.user_response.clone());
        if let (Some(reply), Some(step)) = (reply, session.completed_steps.last_mut())
            && step.observation.is_empty()
        {
            step.observation = format!("User provided: {reply}");
            step.reflection = self.processor.reflect(step, turn).await?;
            let merged = step.format_for_history();
            session
                .conversation
                .push(ConversationTurn::assistant(merged, self.agent_name()));
        }

        session.pending_action = None;
        Ok(())
    }

    /// Drive the session until it pauses, completes or fails.
    ///
    /// Returns the turn's output and whether the session paused.
    async fn run_loop(
        &self,
        session: &mut ReActSessionState,
        turn: &TurnOptions,
    ) -> Result<(AgentOutput, bool)> {
        let mut output = AgentOutput::new();
        self.resolve_pending(session, turn).await?;

        let config = self.processor.config();
        let pending_timeout = Duration::from_std(config.pending_timeout()).unwrap_or(Duration::MAX);
        let mut paused = false;

        while session.has_budget() {
            let step_number = session.current_iteration + 1;
            let thought_prompt =
                prompt::interactive_thought_prompt(&session.conversation, step_number);

            let parsed = match self
                .processor
                .think(&thought_prompt, &session.system_prompt, turn)
                .await
            {
                Ok(parsed) => parsed,
                Err(err) if is_interruption(&err) => return Err(err),
                Err(err) => {
                    warn!(session_id = %session.session_id, error = %err, "Thought request failed");
                    session.fail(err.to_string());
                    return Err(err);
                }
            };
            session.current_iteration = step_number;
            let mut step = step_from(step_number, parsed);
            debug!(step = step_number, action = %step.action, "Interactive step");

            let kind = classify_interaction(&step.thought, &step.action);
            if kind.needs_user() {
                let pending = PendingAction::new(
                    step.action.clone(),
                    step.action_input.clone(),
                    kind,
                    pending_timeout,
                );
                session.conversation.push(ConversationTurn::assistant(
                    step.format_for_history(),
                    self.agent_name(),
                ));
                session.pause(step, pending);
                info!(session_id = %session.session_id, interaction = %kind, "Session paused");
                paused = true;
                break;
            }

            if step.is_final() {
                output.response = step.action_input.clone();
                session.conversation.push(ConversationTurn::assistant(
                    step.format_for_history(),
                    self.agent_name(),
                ));
                session.completed_steps.push(step);
                session.complete();
                break;
            }

            if !step.action.is_empty() {
                self.processor.act(&mut step, &mut output, turn).await?;
            }

            session.conversation.push(ConversationTurn::assistant(
                step.format_for_history(),
                self.agent_name(),
            ));
            session.completed_steps.push(step);
            output.reasoning = session.completed_steps.clone();

            if should_provide_answer(
                &output,
                session.max_iterations,
                config.stop_after_tool_calls,
            ) {
                output.response = self
                    .processor
                    .generate_final_answer(&session.original_input, &output, turn)
                    .await?;
                session.complete();
                break;
            }

            session.touch();
        }

        output.reasoning = session.completed_steps.clone();
        if !paused {
            if output.response.is_empty() {
                output.response = synthesize_response(&output.reasoning);
            }
            if !session.is_terminal() {
                session.complete();
            }
            info!(
                session_id = %session.session_id,
                steps = output.reasoning.len(),
                "Session completed"
            );
        }

        output.metadata = session.collected_data.clone();
        self.processor.finish(&mut output, &session.original_input);
        Ok((output, paused))
    }

    fn build_output(
        &self,
        output: AgentOutput,
        paused: bool,
        session: ReActSessionState,
    ) -> InteractiveOutput {
        let pending = session.pending_action.as_ref().filter(|_| paused);

        InteractiveOutput {
            needs_interaction: pending.is_some(),
            interaction_type: pending.map(|p| p.waiting_for),
            interaction_prompt: pending.map(interaction_prompt),
            interaction_options: pending.and_then(interaction_options),
            interaction_context: pending
                .filter(|p| !p.validation_rules.is_empty())
                .map(|p| {
                    p.validation_rules
                        .iter()
                        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                        .collect()
                }),
            session_id: session.session_id.clone(),
            can_continue: session.status.can_continue(),
            session_state: Some(session),
            output,
        }
    }

    fn ended_output(&self, session: ReActSessionState) -> InteractiveOutput {
        let mut output = AgentOutput::new();
        output.response = SESSION_ENDED_RESPONSE.to_string();
        output.confidence = self.processor.confidence(&output);

        InteractiveOutput {
            output,
            needs_interaction: false,
            interaction_type: None,
            interaction_prompt: None,
            interaction_options: None,
            interaction_context: None,
            session_id: session.session_id.clone(),
            session_state: Some(session),
            can_continue: false,
        }
    }

    /// Sessions owned by this processor's agent.
    pub async fn list_sessions(&self) -> Result<Vec<ReActSessionState>> {
        self.store.list(self.agent_name()).await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<ReActSessionState> {
        self.store.load(session_id).await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.store.delete(session_id).await
    }
}
