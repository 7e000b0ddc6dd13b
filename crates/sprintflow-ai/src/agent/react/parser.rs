//! Line-oriented parser for `Thought:` / `Action:` / `Action Input:` replies.

use crate::agent::output::FINAL_ANSWER_ACTION;
use crate::llm::CompletionResponse;

const THOUGHT: &str = "Thought:";
const ACTION: &str = "Action:";
const ACTION_INPUT: &str = "Action Input:";

/// One model reply split into its ReAct sections.
///
/// Malformed replies are never an error; missing sections stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedStep {
    pub thought: String,
    pub action: String,
    pub action_input: String,
}

impl ParsedStep {
    pub fn from_text(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        let mut parsed = Self::default();

        let mut i = 0;
        while i < lines.len() {
            let line = lines[i].trim();
            if let Some(rest) = line.strip_prefix(THOUGHT) {
                parsed.thought = rest.trim().to_string();
            } else if let Some(rest) = line.strip_prefix(ACTION_INPUT) {
                let mut input = rest.trim().to_string();
                while i + 1 < lines.len() && !starts_section(lines[i + 1]) {
                    i += 1;
                    input.push('\n');
                    input.push_str(lines[i]);
                }
                parsed.action_input = input.trim().to_string();
            } else if let Some(rest) = line.strip_prefix(ACTION) {
                parsed.action = rest.trim().to_string();
            }
            i += 1;
        }

        parsed
    }

    /// Parse the text, falling back to the first native tool call when the
    /// text names no action.
    pub fn from_response(response: &CompletionResponse) -> Self {
        let mut parsed = Self::from_text(response.text());
        if parsed.action.is_empty()
            && let Some(call) = response.tool_calls.first()
        {
            parsed.action = call.name.clone();
            parsed.action_input = match &call.arguments {
                serde_json::Value::String(raw) => raw.clone(),
                other => other.to_string(),
            };
        }
        parsed
    }

    pub fn is_final(&self) -> bool {
        self.action == FINAL_ANSWER_ACTION
    }
}

fn starts_section(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with(THOUGHT) || line.starts_with(ACTION) || line.starts_with(ACTION_INPUT)
}
