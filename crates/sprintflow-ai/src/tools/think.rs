//! Divergent-thinking tools used by the Think agent.

use async_trait::async_trait;
use serde_json::{Value, json};
use sprintflow_traits::{InputMap, Tool, ToolOutput, ToolResult, require_str};

use super::optional_str;

/// Generate creative ideas and alternative perspectives on a topic.
pub struct BrainstormTool;

#[async_trait]
impl Tool for BrainstormTool {
    fn name(&self) -> &str {
        "brainstorm"
    }

    fn description(&self) -> &str {
        "Generate creative ideas and alternative perspectives on a topic"
    }

    fn required_fields(&self) -> &[&'static str] {
        &["topic"]
    }

    fn optional_fields(&self) -> &[&'static str] {
        &["constraints", "domain"]
    }

    async fn execute(&self, input: InputMap) -> ToolResult<ToolOutput> {
        let topic = require_str(&input, "topic")?;

        let mut ideas = vec![
            format!("What if we approach {topic} from a completely opposite angle?"),
            format!("Consider {topic} from the perspective of different stakeholders"),
            format!("How would {topic} work in different industries or contexts?"),
            format!("What are the hidden assumptions in {topic} that we can challenge?"),
            format!("How can we combine {topic} with unrelated concepts for innovation?"),
        ];
        if let Some(domain) = optional_str(&input, "domain") {
            ideas.push(format!("Apply {domain} best practices to {topic}"));
        }
        if let Some(constraints) = optional_str(&input, "constraints") {
            ideas.push(format!("Which of these survive the constraint: {constraints}?"));
        }

        Ok(ToolOutput::success(json!({
            "topic": topic,
            "ideas": ideas,
            "suggestions": "Consider each idea and explore the most promising ones further",
        })))
    }
}

/// Analyze a problem from several stakeholder perspectives.
pub struct PerspectiveAnalysisTool;

const DEFAULT_STAKEHOLDERS: [&str; 5] = ["users", "business", "investors", "employees", "society"];

#[async_trait]
impl Tool for PerspectiveAnalysisTool {
    fn name(&self) -> &str {
        "perspective_analysis"
    }

    fn description(&self) -> &str {
        "Analyze a problem from multiple stakeholder perspectives"
    }

    fn required_fields(&self) -> &[&'static str] {
        &["problem"]
    }

    fn optional_fields(&self) -> &[&'static str] {
        &["stakeholders"]
    }

    async fn execute(&self, input: InputMap) -> ToolResult<ToolOutput> {
        let problem = require_str(&input, "problem")?;

        // Accepts a JSON array or a comma separated string.
        let stakeholders: Vec<String> = match input.get("stakeholders") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Some(Value::String(list)) => list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            _ => Vec::new(),
        };
        let stakeholders = if stakeholders.is_empty() {
            DEFAULT_STAKEHOLDERS.iter().map(|s| s.to_string()).collect()
        } else {
            stakeholders
        };

        let perspectives: serde_json::Map<String, Value> = stakeholders
            .iter()
            .map(|who| {
                (
                    who.clone(),
                    json!({
                        "concern": format!("What do {who} care about most?"),
                        "benefit": format!("What do {who} gain?"),
                        "risk": format!("What risks do {who} face?"),
                        "expectation": format!("What do {who} expect?"),
                    }),
                )
            })
            .collect();

        Ok(ToolOutput::success(json!({
            "problem": problem,
            "perspectives": perspectives,
            "insight": "Different stakeholders care about different things; balance their interests",
        })))
    }
}

/// Surface overlooked aspects of a concept.
pub struct BlindSpotDetectionTool;

#[async_trait]
impl Tool for BlindSpotDetectionTool {
    fn name(&self) -> &str {
        "blind_spot_detection"
    }

    fn description(&self) -> &str {
        "Identify potential blind spots and overlooked aspects"
    }

    fn required_fields(&self) -> &[&'static str] {
        &["concept"]
    }

    fn optional_fields(&self) -> &[&'static str] {
        &["context"]
    }

    async fn execute(&self, input: InputMap) -> ToolResult<ToolOutput> {
        let concept = require_str(&input, "concept")?;

        let mut blind_spots = vec![
            json!({
                "area": "Technical feasibility",
                "question": "Are we too optimistic about how hard this is to build?",
                "risk": "Technical bottlenecks can delay or sink the project",
            }),
            json!({
                "area": "Market demand",
                "question": "Have we validated that the need is real and strong?",
                "risk": "We may be solving a problem nobody has",
            }),
            json!({
                "area": "Competition",
                "question": "Do we understand direct and indirect competitors?",
                "risk": "Competition may be fiercer than expected",
            }),
            json!({
                "area": "Resources",
                "question": "Have we estimated time, money and people accurately?",
                "risk": "Running out of resources before launch",
            }),
            json!({
                "area": "Legal compliance",
                "question": "Have the relevant regulations been considered?",
                "risk": "Compliance gaps create legal exposure",
            }),
        ];

        if optional_str(&input, "context").is_some_and(|c| c.to_lowercase().contains("ai")) {
            blind_spots.push(json!({
                "area": "AI ethics",
                "question": "Have bias and ethical use of the AI system been considered?",
                "risk": "Biased behaviour erodes user trust",
            }));
        }

        Ok(ToolOutput::success(json!({
            "concept": concept,
            "blind_spots": blind_spots,
            "recommendation": "Review each blind spot and plan a mitigation for it",
        })))
    }
}

/// Borrow patterns from unrelated domains.
pub struct AnalogyFinderTool;

#[async_trait]
impl Tool for AnalogyFinderTool {
    fn name(&self) -> &str {
        "analogy_finder"
    }

    fn description(&self) -> &str {
        "Find analogies from other industries or domains"
    }

    fn required_fields(&self) -> &[&'static str] {
        &["concept"]
    }

    fn optional_fields(&self) -> &[&'static str] {
        &["target_domain"]
    }

    async fn execute(&self, input: InputMap) -> ToolResult<ToolOutput> {
        let concept = require_str(&input, "concept")?;

        let mut analogies = vec![
            json!({
                "domain": "Nature",
                "analogy": "Swarm coordination",
                "application": "Decentralised collaboration",
                "insight": "Simple individual rules can produce collective intelligence",
            }),
            json!({
                "domain": "Military",
                "analogy": "Special forces",
                "application": "Small expert teams for critical missions",
                "insight": "Specialisation beats scale",
            }),
            json!({
                "domain": "Sports",
                "analogy": "Marathon training",
                "application": "Pacing long projects",
                "insight": "Endurance matters more than short bursts",
            }),
            json!({
                "domain": "Architecture",
                "analogy": "Modular buildings",
                "application": "Modular product design",
                "insight": "Standard components combine to meet varied needs",
            }),
        ];
        if let Some(target) = optional_str(&input, "target_domain") {
            analogies.retain(|a| {
                a["domain"]
                    .as_str()
                    .is_some_and(|d| d.eq_ignore_ascii_case(target))
            });
        }

        Ok(ToolOutput::success(json!({
            "concept": concept,
            "analogies": analogies,
            "value": "Cross-domain analogies spark new ideas",
        })))
    }
}

/// Generate probing questions at four depths.
pub struct QuestionGeneratorTool;

#[async_trait]
impl Tool for QuestionGeneratorTool {
    fn name(&self) -> &str {
        "question_generator"
    }

    fn description(&self) -> &str {
        "Generate probing questions to deepen understanding"
    }

    fn required_fields(&self) -> &[&'static str] {
        &["topic"]
    }

    fn optional_fields(&self) -> &[&'static str] {
        &["depth_level"]
    }

    async fn execute(&self, input: InputMap) -> ToolResult<ToolOutput> {
        let topic = require_str(&input, "topic")?;

        let mut questions = json!({
            "foundational": [
                format!("What is the core problem that {topic} is trying to solve?"),
                format!("Who are the primary stakeholders affected by {topic}?"),
                format!("What assumptions are we making about {topic}?"),
            ],
            "exploratory": [
                format!("What would happen if {topic} didn't exist?"),
                format!("How would {topic} work in a completely different context?"),
                format!("What are the second-order effects of {topic}?"),
            ],
            "critical": [
                format!("What evidence do we have that {topic} is necessary?"),
                format!("What are the biggest risks associated with {topic}?"),
                format!("How might {topic} fail or be misused?"),
            ],
            "creative": [
                format!("How can we reimagine {topic} from first principles?"),
                format!("What unexpected combinations could enhance {topic}?"),
                format!("How would {topic} evolve in the next 10 years?"),
            ],
        });

        if let Some(level) = optional_str(&input, "depth_level")
            && let Some(selected) = questions.get(level).cloned()
        {
            let mut only = serde_json::Map::new();
            only.insert(level.to_string(), selected);
            questions = Value::Object(only);
        }

        Ok(ToolOutput::success(json!({
            "topic": topic,
            "questions": questions,
            "usage": "Use these questions to explore different aspects and uncover new insights",
        })))
    }
}
