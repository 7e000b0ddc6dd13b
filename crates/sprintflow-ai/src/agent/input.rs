//! Agent input: the query for one turn plus its workshop context.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AiError;
use crate::llm::Role;

/// Foundation Sprint workflow phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Foundation,
    Differentiation,
    Approach,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Foundation => "foundation",
            Phase::Differentiation => "differentiation",
            Phase::Approach => "approach",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "foundation" => Ok(Phase::Foundation),
            "differentiation" => Ok(Phase::Differentiation),
            "approach" => Ok(Phase::Approach),
            other => Err(AiError::Config(format!("Unknown phase '{other}'"))),
        }
    }
}

/// One turn of conversation, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    /// Agent that produced the turn, for assistant turns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

impl ConversationTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            agent: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            agent: None,
        }
    }

    pub fn assistant(content: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            agent: Some(agent.into()),
        }
    }

    fn role_label(&self) -> &'static str {
        match self.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Render a transcript as `role: content` blocks separated by blank lines.
pub fn render_transcript(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .map(|turn| format!("{}: {}\n\n", turn.role_label(), turn.content))
        .collect()
}

/// Input for one agent turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentInput {
    pub query: String,
    pub context: String,
    pub room_id: String,
    pub history: Vec<ConversationTurn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    /// Phase-specific extension data.
    pub data: Map<String, Value>,
}

impl AgentInput {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = room_id.into();
        self
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_round_trip_through_serde() {
        let input = AgentInput::new("q").with_phase(Phase::Differentiation);
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["phase"], "differentiation");

        let parsed: AgentInput = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.phase, Some(Phase::Differentiation));
    }

    #[test]
    fn test_phase_parse_is_case_insensitive() {
        assert_eq!("Approach".parse::<Phase>().unwrap(), Phase::Approach);
        assert!("launch".parse::<Phase>().is_err());
    }

    #[test]
    fn test_missing_fields_default() {
        let input: AgentInput = serde_json::from_str(r#"{"query": "hi"}"#).unwrap();
        assert_eq!(input.query, "hi");
        assert!(input.phase.is_none());
        assert!(input.history.is_empty());
    }

    #[test]
    fn test_render_transcript() {
        let turns = vec![
            ConversationTurn::system("sys"),
            ConversationTurn::user("hello"),
            ConversationTurn::assistant("Step 1", "ThinkAgent"),
        ];
        assert_eq!(
            render_transcript(&turns),
            "system: sys\n\nuser: hello\n\nassistant: Step 1\n\n"
        );
    }
}
