//! Tool trait and types for agent tools.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{Result, ToolError};

/// Key-value input handed to a tool.
pub type InputMap = Map<String, Value>;

/// Decode raw action input into a tool input map.
///
/// Anything that is not a JSON object is wrapped as `{"query": raw}`.
pub fn normalize_input(raw: &str) -> InputMap {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        _ => {
            let mut map = InputMap::new();
            map.insert("query".to_string(), Value::String(raw.to_string()));
            map
        }
    }
}

/// JSON Schema for tool parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value, // JSON Schema object
}

/// Result of tool execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolOutput {
    pub success: bool,
    pub result: Value,
    pub error: Option<String>,
}

impl ToolOutput {
    /// Create a successful tool output.
    pub fn success(result: Value) -> Self {
        Self {
            success: true,
            result,
            error: None,
        }
    }

    /// Create an error tool output.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: Value::Null,
            error: Some(message.into()),
        }
    }

    /// Render the result as observation text.
    ///
    /// Strings are passed through verbatim, everything else is JSON-encoded.
    pub fn render(&self) -> String {
        match &self.result {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => serde_json::to_string(other).unwrap_or_else(|_| other.to_string()),
        }
    }
}

/// Core trait for agent tools.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name (used in the `Action:` line).
    fn name(&self) -> &str;

    /// Human-readable description for LLM context.
    fn description(&self) -> &str;

    /// Input fields that must be present.
    fn required_fields(&self) -> &[&'static str] {
        &[]
    }

    /// Input fields the tool understands but does not require.
    fn optional_fields(&self) -> &[&'static str] {
        &[]
    }

    /// Execute the tool with given input.
    async fn execute(&self, input: InputMap) -> Result<ToolOutput>;

    /// Check that every declared required field is present.
    fn validate(&self, input: &InputMap) -> Result<()> {
        for field in self.required_fields() {
            if !input.contains_key(*field) {
                return Err(ToolError::InvalidInput(format!(
                    "required field '{field}' is missing"
                )));
            }
        }
        Ok(())
    }

    /// JSON Schema for input parameters, derived from the declared fields.
    fn parameters_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .required_fields()
            .iter()
            .chain(self.optional_fields())
            .map(|field| (field.to_string(), json!({ "type": "string" })))
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": self.required_fields(),
        })
    }

    /// Build complete schema for LLM.
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Fetch a required string field from tool input.
pub fn require_str<'a>(input: &'a InputMap, field: &str) -> Result<&'a str> {
    input
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidInput(format!("{field} must be a string")))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SampleTool;

    #[async_trait]
    impl Tool for SampleTool {
        fn name(&self) -> &str {
            "sample"
        }

        fn description(&self) -> &str {
            "Echoes its topic"
        }

        fn required_fields(&self) -> &[&'static str] {
            &["topic"]
        }

        fn optional_fields(&self) -> &[&'static str] {
            &["depth"]
        }

        async fn execute(&self, input: InputMap) -> Result<ToolOutput> {
            let topic = require_str(&input, "topic")?;
            Ok(ToolOutput::success(Value::String(topic.to_string())))
        }
    }

    #[test]
    fn normalize_input_accepts_json_object() {
        let input = normalize_input(r#"{"topic": "pricing"}"#);
        assert_eq!(input.get("topic"), Some(&json!("pricing")));
    }

    #[test]
    fn normalize_input_wraps_plain_text() {
        let input = normalize_input("find competitors");
        assert_eq!(input.len(), 1);
        assert_eq!(input.get("query"), Some(&json!("find competitors")));
    }

    #[test]
    fn normalize_input_wraps_non_object_json() {
        let input = normalize_input(r#"["a", "b"]"#);
        assert_eq!(input.get("query"), Some(&json!(r#"["a", "b"]"#)));
    }

    #[test]
    fn validate_reports_missing_field() {
        let err = SampleTool.validate(&InputMap::new()).unwrap_err();
        assert!(err.to_string().contains("'topic'"));
        assert!(SampleTool.validate(&normalize_input(r#"{"topic": "x"}"#)).is_ok());
    }

    #[test]
    fn schema_lists_declared_fields() {
        let schema = SampleTool.schema();
        assert_eq!(schema.name, "sample");
        assert_eq!(schema.parameters["required"], json!(["topic"]));
        assert!(schema.parameters["properties"].get("depth").is_some());
    }

    #[test]
    fn render_passes_strings_through() {
        assert_eq!(ToolOutput::success(json!("plain")).render(), "plain");
        assert_eq!(ToolOutput::success(json!({"a": 1})).render(), r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn execute_rejects_non_string_field() {
        let mut input = InputMap::new();
        input.insert("topic".to_string(), json!(3));
        assert!(SampleTool.execute(input).await.is_err());
    }
}
