//! Built-in Foundation Sprint workshop tools.
//!
//! Every tool is deterministic and side-effect free. Agents see the subset
//! named in their profile.

mod critique;
mod research;
mod think;

pub use critique::{
    AssumptionCheckerTool, CompetitorAnalyzerTool, FeasibilityAnalyzerTool, MarketValidatorTool,
    RiskAssessorTool,
};
pub use research::{
    DataCollectorTool, MarketResearchTool, SourceValidatorTool, TrendAnalyzerTool, WebSearchTool,
};
pub use think::{
    AnalogyFinderTool, BlindSpotDetectionTool, BrainstormTool, PerspectiveAnalysisTool,
    QuestionGeneratorTool,
};

use serde_json::Value;
use sprintflow_traits::{InputMap, ToolRegistry};

/// Register all fifteen workshop tools.
pub fn register_workshop_tools(registry: &mut ToolRegistry) {
    registry.register(BrainstormTool);
    registry.register(PerspectiveAnalysisTool);
    registry.register(BlindSpotDetectionTool);
    registry.register(AnalogyFinderTool);
    registry.register(QuestionGeneratorTool);

    registry.register(AssumptionCheckerTool);
    registry.register(MarketValidatorTool);
    registry.register(FeasibilityAnalyzerTool);
    registry.register(RiskAssessorTool);
    registry.register(CompetitorAnalyzerTool);

    registry.register(WebSearchTool);
    registry.register(MarketResearchTool);
    registry.register(TrendAnalyzerTool);
    registry.register(DataCollectorTool);
    registry.register(SourceValidatorTool);
}

/// A registry holding every workshop tool.
pub fn workshop_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    register_workshop_tools(&mut registry);
    registry
}

/// Non-empty string field, if present.
pub(crate) fn optional_str<'a>(input: &'a InputMap, field: &str) -> Option<&'a str> {
    input
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registers_all_tools_with_schemas() {
        let registry = workshop_registry();
        assert_eq!(registry.len(), 15);

        for schema in registry.schemas() {
            assert!(!schema.description.is_empty(), "{}", schema.name);
            let required = schema.parameters["required"].as_array().unwrap();
            assert_eq!(required.len(), 1, "{}", schema.name);
        }
    }

    #[tokio::test]
    async fn test_registry_rejects_missing_required_field() {
        let registry = workshop_registry();
        let err = registry
            .execute("risk_assessor", InputMap::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("venture"));
    }
}
