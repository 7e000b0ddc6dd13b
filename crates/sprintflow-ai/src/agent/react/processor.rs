//! Single-shot ReAct loop and the step primitives it shares with the
//! interactive processor.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use sprintflow_traits::{ToolError, ToolRegistry, ToolSchema, normalize_input};
use tracing::{debug, info, warn};

use crate::agent::input::{AgentInput, ConversationTurn};
use crate::agent::output::{AgentOutput, ReasoningStep, ToolExecution};
use crate::agent::profile::AgentProfile;
use crate::agent::prompt;
use crate::agent::turn::{TurnOptions, is_interruption};
use crate::config::EngineConfig;
use crate::error::{AiError, Result};
use crate::llm::LlmClient;

use super::heuristics::{extract_suggestions, score_confidence, should_provide_answer};
use super::parser::ParsedStep;

const NO_STEPS_RESPONSE: &str = "I need more information to provide a helpful response.";
const NO_INSIGHTS_RESPONSE: &str = "I'm still processing your request. Please try again.";

/// Bounded thought, action, observation and reflection loop for one agent.
pub struct ReActProcessor {
    profile: AgentProfile,
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    tool_schemas: Vec<ToolSchema>,
    system_prompt: String,
    config: EngineConfig,
}

impl ReActProcessor {
    pub fn new(
        profile: AgentProfile,
        llm: Arc<dyn LlmClient>,
        tools: ToolRegistry,
        config: EngineConfig,
    ) -> Self {
        let tool_schemas = tools.schemas();
        let system_prompt = prompt::system_prompt(&profile, &tools);
        Self {
            profile,
            llm,
            tools,
            tool_schemas,
            system_prompt,
            config,
        }
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn max_iterations(&self) -> usize {
        self.config.effective_max_iterations()
    }

    /// Run the loop to completion without caller bounds.
    pub async fn process(&self, input: &AgentInput) -> Result<AgentOutput> {
        self.process_with(input, &TurnOptions::default()).await
    }

    /// Run the loop to completion.
    ///
    /// Only a failed thought request (or cancellation) is an error. Tool and
    /// reflection failures are absorbed into the trace, and running out of
    /// iterations yields a synthesized answer.
    #[tracing::instrument(skip_all, fields(agent = %self.profile.name))]
    pub async fn process_with(&self, input: &AgentInput, turn: &TurnOptions) -> Result<AgentOutput> {
        let mut output = AgentOutput::new();
        let mut transcript = self.opening_transcript(input);
        let max_iterations = self.max_iterations();

        for step_number in 1..=max_iterations {
            let thought_prompt = prompt::thought_prompt(&transcript, step_number);
            let parsed = self.think(&thought_prompt, &self.system_prompt, turn).await?;
            let mut step = step_from(step_number, parsed);
            debug!(step = step_number, action = %step.action, "ReAct step");

            if step.is_final() {
                output.response = step.action_input.clone();
                output.reasoning.push(step);
                break;
            }

            if !step.action.is_empty() {
                self.act(&mut step, &mut output, turn).await?;
            }

            transcript.push(ConversationTurn::assistant(
                step.format_for_history(),
                self.profile.name.as_str(),
            ));
            output.reasoning.push(step);

            if should_provide_answer(&output, max_iterations, self.config.stop_after_tool_calls) {
                output.response = self.generate_final_answer(input, &output, turn).await?;
                break;
            }
        }

        if output.response.is_empty() {
            output.response = synthesize_response(&output.reasoning);
        }
        self.finish(&mut output, input);

        info!(
            steps = output.reasoning.len(),
            tools = output.tools.len(),
            confidence = output.confidence,
            "ReAct loop finished"
        );
        Ok(output)
    }

    /// System prompt, prior conversation, then the user prompt.
    pub(crate) fn opening_transcript(&self, input: &AgentInput) -> Vec<ConversationTurn> {
        let mut transcript = Vec::with_capacity(input.history.len() + 2);
        transcript.push(ConversationTurn::system(self.system_prompt.clone()));
        transcript.extend(input.history.iter().cloned());
        transcript.push(ConversationTurn::user(prompt::user_prompt(input)));
        transcript
    }

    /// Request and parse the next thought and action.
    pub(crate) async fn think(
        &self,
        thought_prompt: &str,
        system_prompt: &str,
        turn: &TurnOptions,
    ) -> Result<ParsedStep> {
        let options = self
            .config
            .thought
            .clone()
            .with_system_prompt(system_prompt);
        let response = turn
            .run(
                self.llm
                    .complete_with_tools(thought_prompt, &self.tool_schemas, &options),
            )
            .await?;
        Ok(ParsedStep::from_response(&response))
    }

    /// Execute the step's action and reflect on the observation.
    pub(crate) async fn act(
        &self,
        step: &mut ReasoningStep,
        output: &mut AgentOutput,
        turn: &TurnOptions,
    ) -> Result<()> {
        let (observation, record) = self
            .execute_tool(&step.action, &step.action_input, turn)
            .await?;
        step.observation = observation;
        if let Some(record) = record {
            output.tools.push(record);
        }
        step.reflection = self.reflect(step, turn).await?;
        Ok(())
    }

    /// Run a tool and turn the outcome into an observation.
    ///
    /// Unknown tools and invalid input produce an observation without an
    /// audit record. Only cancellation surfaces as an error.
    pub(crate) async fn execute_tool(
        &self,
        name: &str,
        raw_input: &str,
        turn: &TurnOptions,
    ) -> Result<(String, Option<ToolExecution>)> {
        let Some(tool) = self.tools.get(name) else {
            debug!(tool = name, "Unknown tool requested");
            return Ok((format!("Error: Tool '{name}' not found"), None));
        };

        let input = normalize_input(raw_input);
        if let Err(err) = tool.validate(&input) {
            let detail = match err {
                ToolError::InvalidInput(message) => message,
                other => other.to_string(),
            };
            return Ok((
                format!("Error: Invalid input for tool '{name}': {detail}"),
                None,
            ));
        }

        let started = Instant::now();
        let outcome = turn
            .run(async { Ok::<_, AiError>(tool.execute(input.clone()).await) })
            .await?;
        let duration_ms = started.elapsed().as_millis() as u64;

        let (observation, result, failure) = match outcome {
            Ok(out) if out.success => (out.render(), out.result, None),
            Ok(out) => {
                let error = out
                    .error
                    .unwrap_or_else(|| "tool reported failure".to_string());
                (format!("Error executing tool '{name}': {error}"), out.result, Some(error))
            }
            Err(err) => {
                let error = err.to_string();
                (format!("Error executing tool '{name}': {error}"), Value::Null, Some(error))
            }
        };
        if let Some(error) = &failure {
            warn!(tool = name, error = %error, "Tool execution failed");
        }

        let record = ToolExecution {
            tool_name: name.to_string(),
            input,
            output: result,
            duration_ms,
            success: failure.is_none(),
            error: failure,
        };
        Ok((observation, Some(record)))
    }

    /// Short commentary on a step. Failures leave it empty.
    pub(crate) async fn reflect(&self, step: &ReasoningStep, turn: &TurnOptions) -> Result<String> {
        let reflection_prompt = prompt::reflection_prompt(step);
        match turn
            .run(
                self.llm
                    .complete_text(&reflection_prompt, &self.config.reflection),
            )
            .await
        {
            Ok(text) => Ok(text.trim().to_string()),
            Err(err) if is_interruption(&err) => Err(err),
            Err(err) => {
                debug!(error = %err, "Reflection failed, continuing without it");
                Ok(String::new())
            }
        }
    }

    /// Ask the model for a final answer, synthesizing one if that fails.
    pub(crate) async fn generate_final_answer(
        &self,
        input: &AgentInput,
        output: &AgentOutput,
        turn: &TurnOptions,
    ) -> Result<String> {
        let final_prompt = prompt::final_answer_prompt(input, &output.reasoning);
        match turn
            .run(
                self.llm
                    .complete_text(&final_prompt, &self.config.final_answer),
            )
            .await
        {
            Ok(text) if !text.trim().is_empty() => Ok(text),
            Ok(_) => Ok(synthesize_response(&output.reasoning)),
            Err(err) if is_interruption(&err) => Err(err),
            Err(err) => {
                warn!(error = %err, "Final answer request failed, synthesizing");
                Ok(synthesize_response(&output.reasoning))
            }
        }
    }

    /// Confidence, suggestions and next actions derived from the trace.
    pub(crate) fn finish(&self, output: &mut AgentOutput, input: &AgentInput) {
        output.confidence = score_confidence(&self.config.confidence, output);
        output.suggestions = extract_suggestions(&output.reasoning);
        output.next_actions = self.profile.next_actions_for(input.phase);
    }

    pub(crate) fn confidence(&self, output: &AgentOutput) -> f64 {
        score_confidence(&self.config.confidence, output)
    }
}

pub(crate) fn step_from(step_number: usize, parsed: ParsedStep) -> ReasoningStep {
    ReasoningStep {
        step_number,
        thought: parsed.thought,
        action: parsed.action,
        action_input: parsed.action_input,
        observation: String::new(),
        reflection: String::new(),
    }
}

/// Offline answer built from reflections, or observations where no
/// reflection exists.
pub fn synthesize_response(steps: &[ReasoningStep]) -> String {
    if steps.is_empty() {
        return NO_STEPS_RESPONSE.to_string();
    }

    let insights: Vec<&str> = steps
        .iter()
        .filter_map(|step| {
            if !step.reflection.is_empty() {
                Some(step.reflection.as_str())
            } else if !step.observation.is_empty() {
                Some(step.observation.as_str())
            } else {
                None
            }
        })
        .collect();

    if insights.is_empty() {
        return NO_INSIGHTS_RESPONSE.to_string();
    }

    format!("Based on my analysis:\n\n{}", insights.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::input::Phase;
    use crate::llm::{MockLlmClient, MockStep};
    use crate::tools::register_workshop_tools;

    fn processor(profile: AgentProfile, steps: Vec<MockStep>) -> (ReActProcessor, MockLlmClient) {
        let mock = MockLlmClient::from_steps("mock", steps);
        let mut registry = ToolRegistry::new();
        register_workshop_tools(&mut registry);
        let tools = registry.subset(&profile.tools);
        let processor = ReActProcessor::new(
            profile,
            Arc::new(mock.clone()),
            tools,
            EngineConfig::default(),
        );
        (processor, mock)
    }

    #[tokio::test]
    async fn test_immediate_final_answer() {
        let (processor, mock) = processor(
            AgentProfile::think(),
            vec![MockStep::final_answer("Position it for busy parents")],
        );

        let output = processor
            .process(&AgentInput::new("How should I position this product?"))
            .await
            .unwrap();

        assert_eq!(output.response, "Position it for busy parents");
        assert_eq!(output.reasoning.len(), 1);
        assert_eq!(output.confidence, 0.5);
        assert!(output.tools.is_empty());

        let requests = mock.requests().await;
        assert_eq!(requests.len(), 1);
        assert!(requests[0].system_prompt().unwrap().starts_with("You are ThinkAgent"));
        assert_eq!(requests[0].tools.len(), 5);
    }

    #[tokio::test]
    async fn test_two_tool_calls_trigger_final_answer() {
        let (processor, mock) = processor(
            AgentProfile::critique(),
            vec![
                MockStep::react(
                    "Check the premise",
                    "assumption_checker",
                    r#"{"statement": "Parents lack time"}"#,
                ),
                MockStep::text("The premise is plausible."),
                MockStep::react(
                    "Now look at risk",
                    "risk_assessor",
                    r#"{"venture": "meal kits", "industry": "food"}"#,
                ),
                MockStep::text("Execution risk dominates."),
                MockStep::text("Focus on logistics first."),
            ],
        );

        let output = processor
            .process(&AgentInput::new("Is this viable?").with_phase(Phase::Foundation))
            .await
            .unwrap();

        assert_eq!(output.response, "Focus on logistics first.");
        assert_eq!(output.reasoning.len(), 2);
        assert_eq!(output.tools.len(), 2);
        assert!(output.tools.iter().all(|t| t.success));
        assert_eq!(output.reasoning[1].reflection, "Execution risk dominates.");
        assert_eq!(output.tools[0].input["statement"], "Parents lack time");
        // 0.5 + 2 * 0.1 + 2 * 0.05 + 2 * 0.05
        assert!((output.confidence - 0.9).abs() < 1e-9);
        assert_eq!(
            output.next_actions,
            vec![
                "Collect market data to validate assumptions",
                "Interview potential users"
            ]
        );
        assert_eq!(mock.remaining().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_soft() {
        let (processor, _mock) = processor(
            AgentProfile::research(),
            vec![
                MockStep::react("Try something", "crystal_ball", "future"),
                MockStep::error("reflection unavailable"),
                MockStep::final_answer("Done"),
            ],
        );

        let output = processor.process(&AgentInput::new("q")).await.unwrap();
        assert_eq!(
            output.reasoning[0].observation,
            "Error: Tool 'crystal_ball' not found"
        );
        assert!(output.reasoning[0].reflection.is_empty());
        assert!(output.tools.is_empty());
        assert_eq!(output.response, "Done");
    }

    #[tokio::test]
    async fn test_missing_required_field_is_observed() {
        let (processor, _mock) = processor(
            AgentProfile::critique(),
            vec![
                MockStep::react("Validate", "market_validator", r#"{"target_market": "EU"}"#),
                MockStep::text("Need the idea itself."),
                MockStep::final_answer("Tell me the idea"),
            ],
        );

        let output = processor.process(&AgentInput::new("q")).await.unwrap();
        assert_eq!(
            output.reasoning[0].observation,
            "Error: Invalid input for tool 'market_validator': required field 'product_idea' is missing"
        );
        assert!(output.tools.is_empty());
    }

    #[tokio::test]
    async fn test_thought_failure_is_fatal() {
        let (processor, _mock) =
            processor(AgentProfile::think(), vec![MockStep::error("provider down")]);
        let err = processor.process(&AgentInput::new("q")).await.unwrap_err();
        assert!(matches!(err, AiError::Llm(_)));
    }

    #[tokio::test]
    async fn test_empty_final_answer_synthesizes() {
        let mock = MockLlmClient::from_steps(
            "mock",
            vec![MockStep::react("Hmm", "", ""), MockStep::text("")],
        );
        let processor = ReActProcessor::new(
            AgentProfile::think(),
            Arc::new(mock),
            ToolRegistry::new(),
            EngineConfig::default().with_max_iterations(2),
        );

        let output = processor.process(&AgentInput::new("q")).await.unwrap();
        assert_eq!(output.reasoning.len(), 1);
        assert!(output.reasoning[0].action.is_empty());
        assert_eq!(output.response, NO_INSIGHTS_RESPONSE);
    }

    #[test]
    fn test_synthesize_prefers_reflection() {
        assert_eq!(synthesize_response(&[]), NO_STEPS_RESPONSE);

        let mut first = ReasoningStep::new(1);
        first.observation = "raw".to_string();
        first.reflection = "refined".to_string();
        let mut second = ReasoningStep::new(2);
        second.observation = "only raw".to_string();

        assert_eq!(
            synthesize_response(&[first, second]),
            "Based on my analysis:\n\nrefined\n\nonly raw"
        );
    }
}
