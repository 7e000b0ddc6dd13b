//! Tool registry for managing available tools

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Result, ToolError};
use crate::tool::{InputMap, Tool, ToolOutput, ToolSchema};

/// Registry for managing available tools.
///
/// Populated once at start-up and then shared read-only behind an `Arc`.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.list())
            .finish()
    }
}

impl ToolRegistry {
    /// Create a new empty tool registry
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_arc(Arc::new(tool));
    }

    /// Register a tool from Arc
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Register a tool, rejecting empty or duplicate names
    pub fn try_register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        if name.is_empty() {
            return Err(ToolError::InvalidInput(
                "tool name cannot be empty".to_string(),
            ));
        }
        if self.tools.contains_key(&name) {
            return Err(ToolError::Duplicate(name));
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Check if tool exists
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all tool names, sorted
    pub fn list(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Iterate registered tools in name order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.values()
    }

    /// Get schemas for all registered tools
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema()).collect()
    }

    /// Build a registry holding only the named tools.
    ///
    /// Names that are not registered are skipped.
    pub fn subset<S: AsRef<str>>(&self, names: &[S]) -> ToolRegistry {
        let tools = names
            .iter()
            .filter_map(|name| {
                let name = name.as_ref();
                self.tools
                    .get(name)
                    .map(|tool| (name.to_string(), tool.clone()))
            })
            .collect();
        ToolRegistry { tools }
    }

    /// Validate and execute a tool by name
    pub async fn execute(&self, name: &str, input: InputMap) -> Result<ToolOutput> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.validate(&input)?;
        tool.execute(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct Named(&'static str);

    #[async_trait]
    impl Tool for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "test tool"
        }

        fn required_fields(&self) -> &[&'static str] {
            &["query"]
        }

        async fn execute(&self, _input: InputMap) -> Result<ToolOutput> {
            Ok(ToolOutput::success(json!(self.0)))
        }
    }

    #[test]
    fn test_tool_registry_empty() {
        let registry = ToolRegistry::new();
        assert!(!registry.has("unknown"));
        assert_eq!(registry.list().len(), 0);
        assert_eq!(registry.schemas().len(), 0);
    }

    #[test]
    fn test_try_register_rejects_duplicates_and_empty_names() {
        let mut registry = ToolRegistry::new();
        registry.try_register(Arc::new(Named("alpha"))).unwrap();
        assert!(matches!(
            registry.try_register(Arc::new(Named("alpha"))),
            Err(ToolError::Duplicate(_))
        ));
        assert!(registry.try_register(Arc::new(Named(""))).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_subset_skips_unknown_names() {
        let mut registry = ToolRegistry::new();
        registry.register(Named("alpha"));
        registry.register(Named("beta"));
        registry.register(Named("gamma"));

        let subset = registry.subset(&["gamma", "alpha", "missing"]);
        assert_eq!(subset.list(), vec!["alpha", "gamma"]);
    }

    #[tokio::test]
    async fn test_execute_not_found() {
        let registry = ToolRegistry::new();
        let result = registry.execute("missing", InputMap::new()).await;
        assert!(matches!(result, Err(ToolError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_execute_validates_required_fields() {
        let mut registry = ToolRegistry::new();
        registry.register(Named("alpha"));

        let result = registry.execute("alpha", InputMap::new()).await;
        assert!(matches!(result, Err(ToolError::InvalidInput(_))));

        let mut input = InputMap::new();
        input.insert("query".to_string(), json!("x"));
        let output = registry.execute("alpha", input).await.unwrap();
        assert!(output.success);
    }
}
