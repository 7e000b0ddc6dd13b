//! Text heuristics over the reasoning trace.
//!
//! These are approximate substring checks on free-form model output. The
//! phrase tables and numeric policies are tunable; nothing here is a protocol.

use crate::agent::output::{AgentOutput, ReasoningStep};
use crate::config::ConfidencePolicy;

/// Thought phrases that signal the agent considers itself done.
pub const READY_PHRASES: &[&str] = &[
    "sufficient",
    "ready",
    "complete",
    "足够",
    "充分",
    "准备好",
    "完成",
];

/// Sentence markers that turn reasoning text into a suggestion.
pub const SUGGESTION_MARKERS: &[&str] = &["suggest", "recommend", "consider"];

/// Whether the loop should stop and write a final answer now.
///
/// Fires on any of: `stop_after_tool_calls` tool runs this turn (0 disables
/// the check), a trace one step short of the budget, or a ready phrase in the
/// latest thought.
pub fn should_provide_answer(
    output: &AgentOutput,
    max_iterations: usize,
    stop_after_tool_calls: usize,
) -> bool {
    if stop_after_tool_calls > 0 && output.tools.len() >= stop_after_tool_calls {
        return true;
    }

    if output.reasoning.len() >= max_iterations.saturating_sub(1) {
        return true;
    }

    output.reasoning.last().is_some_and(|step| {
        let thought = step.thought.to_lowercase();
        READY_PHRASES.iter().any(|phrase| thought.contains(phrase))
    })
}

/// Additive confidence score, capped by the policy ceiling.
pub fn score_confidence(policy: &ConfidencePolicy, output: &AgentOutput) -> f64 {
    let score = policy.base
        + policy.per_tool * output.tools.len() as f64
        + policy.per_successful_tool * output.successful_tools() as f64
        + policy.per_observation * output.observed_steps() as f64;
    score.min(policy.cap)
}

/// Sentences of thought and reflection text that read as advice.
pub fn extract_suggestions(steps: &[ReasoningStep]) -> Vec<String> {
    let mut suggestions = Vec::new();
    for step in steps {
        let text = format!("{} {}", step.thought, step.reflection);
        for sentence in text.split('.') {
            let lower = sentence.to_lowercase();
            if SUGGESTION_MARKERS.iter().any(|m| lower.contains(m)) {
                suggestions.push(sentence.trim().to_string());
            }
        }
    }
    suggestions
}
