//! Structured agent output and the per-step reasoning record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sprintflow_traits::InputMap;

/// Action value that marks a final answer.
pub const FINAL_ANSWER_ACTION: &str = "Final Answer";

/// One iteration of the ReAct loop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    /// 1-based, strictly increasing within a session.
    pub step_number: usize,
    pub thought: String,
    pub action: String,
    pub action_input: String,
    pub observation: String,
    pub reflection: String,
}

impl ReasoningStep {
    pub fn new(step_number: usize) -> Self {
        Self {
            step_number,
            ..Default::default()
        }
    }

    pub fn is_final(&self) -> bool {
        self.action == FINAL_ANSWER_ACTION
    }

    /// Render for the conversation transcript.
    pub fn format_for_history(&self) -> String {
        let mut text = format!(
            "Step {}:\nThought: {}\nAction: {}\nAction Input: {}",
            self.step_number, self.thought, self.action, self.action_input
        );
        if !self.observation.is_empty() {
            text.push_str("\nObservation: ");
            text.push_str(&self.observation);
        }
        if !self.reflection.is_empty() {
            text.push_str("\nReflection: ");
            text.push_str(&self.reflection);
        }
        text
    }
}

/// Audit record for one tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExecution {
    pub tool_name: String,
    pub input: InputMap,
    pub output: Value,
    pub duration_ms: u64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// External reference or source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
}

impl Reference {
    pub fn new(kind: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            title: title.into(),
            url: None,
            author: None,
            date: None,
            quote: None,
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_quote(mut self, quote: impl Into<String>) -> Self {
        self.quote = Some(quote.into());
        self
    }
}

/// Accumulated result of one agent turn.
///
/// `confidence` is derived by the processor from the reasoning trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentOutput {
    pub response: String,
    pub reasoning: Vec<ReasoningStep>,
    pub tools: Vec<ToolExecution>,
    pub suggestions: Vec<String>,
    pub references: Vec<Reference>,
    pub confidence: f64,
    pub next_actions: Vec<String>,
    pub metadata: Map<String, Value>,
}

impl AgentOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn successful_tools(&self) -> usize {
        self.tools.iter().filter(|t| t.success).count()
    }

    pub fn observed_steps(&self) -> usize {
        self.reasoning
            .iter()
            .filter(|s| !s.observation.is_empty())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_for_history_omits_empty_sections() {
        let mut step = ReasoningStep::new(2);
        step.thought = "look it up".to_string();
        step.action = "web_search".to_string();
        step.action_input = "coffee".to_string();
        assert_eq!(
            step.format_for_history(),
            "Step 2:\nThought: look it up\nAction: web_search\nAction Input: coffee"
        );

        step.observation = "results".to_string();
        step.reflection = "useful".to_string();
        assert!(
            step.format_for_history()
                .ends_with("\nObservation: results\nReflection: useful")
        );
    }

    #[test]
    fn test_reference_serializes_kind_as_type() {
        let reference = Reference::new("report", "Industry report").with_date("2024");
        let json = serde_json::to_value(&reference).unwrap();
        assert_eq!(json["type"], "report");
        assert!(json.get("url").is_none());
    }
}
