//! Agent profiles: identity, tool subset and phase-specific guidance.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use sprintflow_traits::ToolRegistry;

use super::input::{AgentInput, Phase};
use super::output::{AgentOutput, Reference};

pub const THINK_AGENT: &str = "ThinkAgent";
pub const CRITIQUE_AGENT: &str = "CritiqueAgent";
pub const RESEARCH_AGENT: &str = "ResearchAgent";

/// Suggestions and next actions an agent adds for one workshop phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseAdvice {
    pub phase: Phase,
    pub suggestions: Vec<String>,
    pub next_actions: Vec<String>,
}

/// Next action attached to every loop result, optionally limited to a phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextActionHint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    pub action: String,
}

/// Everything that distinguishes one workshop agent from another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub name: String,
    pub role: String,
    pub background: String,
    pub responsibility: String,
    /// Tool names this agent pulls from the shared registry.
    pub tools: Vec<String>,
    #[serde(default)]
    pub next_action_hints: Vec<NextActionHint>,
    #[serde(default)]
    pub phase_advice: Vec<PhaseAdvice>,
    /// Static entries merged into the output metadata by [`enhance`](Self::enhance).
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl AgentProfile {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            background: String::new(),
            responsibility: String::new(),
            tools: Vec::new(),
            next_action_hints: Vec::new(),
            phase_advice: Vec::new(),
            metadata: Map::new(),
            references: Vec::new(),
        }
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }

    pub fn with_responsibility(mut self, responsibility: impl Into<String>) -> Self {
        self.responsibility = responsibility.into();
        self
    }

    pub fn with_tools<S: AsRef<str>>(mut self, tools: &[S]) -> Self {
        self.tools = tools.iter().map(|t| t.as_ref().to_string()).collect();
        self
    }

    fn with_hint(mut self, phase: Option<Phase>, action: &str) -> Self {
        self.next_action_hints.push(NextActionHint {
            phase,
            action: action.to_string(),
        });
        self
    }

    fn with_advice(mut self, phase: Phase, suggestions: &[&str], next_actions: &[&str]) -> Self {
        self.phase_advice.push(PhaseAdvice {
            phase,
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
            next_actions: next_actions.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    /// Next actions the reasoning loop attaches for `phase`.
    pub fn next_actions_for(&self, phase: Option<Phase>) -> Vec<String> {
        self.next_action_hints
            .iter()
            .filter(|hint| hint.phase.is_none() || hint.phase == phase)
            .map(|hint| hint.action.clone())
            .collect()
    }

    pub fn advice_for(&self, phase: Phase) -> Option<&PhaseAdvice> {
        self.phase_advice.iter().find(|a| a.phase == phase)
    }

    /// Add phase guidance, static metadata and references to a finished output.
    pub fn enhance(&self, output: &mut AgentOutput, input: &AgentInput) {
        if let Some(advice) = input.phase.and_then(|p| self.advice_for(p)) {
            output.suggestions.extend(advice.suggestions.iter().cloned());
            output.next_actions.extend(advice.next_actions.iter().cloned());
        }
        for (key, value) in &self.metadata {
            output.metadata.insert(key.clone(), value.clone());
        }
        output.references.extend(self.references.iter().cloned());
    }

    /// The three built-in workshop agents.
    pub fn builtin() -> Vec<AgentProfile> {
        vec![Self::think(), Self::critique(), Self::research()]
    }

    pub fn by_name(name: &str) -> Option<AgentProfile> {
        Self::builtin()
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Divergent-thinking partner.
    pub fn think() -> Self {
        Self::new(THINK_AGENT, "Thinking expansion assistant")
            .with_background(
                "I am an innovative-thinking specialist, skilled at:\n\
                 - Divergent thinking and sparking creativity\n\
                 - Analyzing problems from multiple angles\n\
                 - Spotting blind spots and hidden assumptions\n\
                 - Connecting knowledge across domains\n\
                 - Systems thinking\n\
                 I know design thinking, TRIZ and first-principles reasoning.",
            )
            .with_responsibility(
                "Help the user:\n\
                 1. Look at the problem from different angles\n\
                 2. Find important factors that are easy to overlook\n\
                 3. Generate innovative solutions\n\
                 4. Challenge entrenched thinking patterns\n\
                 5. Build connections across domains",
            )
            .with_tools(&[
                "brainstorm",
                "perspective_analysis",
                "blind_spot_detection",
                "analogy_finder",
                "question_generator",
            ])
            .with_hint(
                Some(Phase::Foundation),
                "Validate the accuracy of the customer definition",
            )
            .with_hint(
                Some(Phase::Foundation),
                "Dig into the root causes of the problem",
            )
            .with_advice(
                Phase::Foundation,
                &[
                    "Use the '5 Whys' to dig into the root of the problem",
                    "Consider what you would do with no constraints at all",
                    "Look back at today's decision from ten years out",
                ],
                &[
                    "List every assumption and validate them one by one",
                    "Find three completely different solutions",
                    "Run in-depth interviews with target users",
                ],
            )
            .with_advice(
                Phase::Differentiation,
                &[
                    "Look for blue-ocean opportunities in unmet needs",
                    "Consider a reverse-positioning strategy",
                    "Explore cross-industry innovation",
                ],
                &[
                    "Map competitor capabilities",
                    "Identify unique strengths that can be combined",
                    "Test reactions from extreme users",
                ],
            )
            .with_advice(
                Phase::Approach,
                &[
                    "Run a pre-mortem to surface risks",
                    "Consider a minimum viable product strategy",
                    "Design several experiments to test key assumptions",
                ],
                &[
                    "Draft an assumption validation plan",
                    "Design a quick prototype",
                    "Plan a phased rollout",
                ],
            )
            .with_metadata(
                "thinking_prompts",
                json!([
                    "If this problem were easy to solve, why hasn't it been solved yet?",
                    "Who would oppose this idea the most, and why?",
                    "With unlimited resources, what would the ideal solution be?",
                    "How is this problem solved in other industries or cultures?",
                    "What technical breakthrough would change this problem entirely?"
                ]),
            )
            .with_metadata(
                "creative_connections",
                json!([
                    {
                        "concept": "Product positioning",
                        "analogy": "Like finding your own voice in a crowded market",
                        "insight": "Not louder, but more distinctive"
                    },
                    {
                        "concept": "User growth",
                        "analogy": "Like tending a garden that needs patience and the right conditions",
                        "insight": "Organic growth is more sustainable than forced growth"
                    }
                ]),
            )
    }

    /// Skeptical reviewer of assumptions and feasibility.
    pub fn critique() -> Self {
        Self::new(CRITIQUE_AGENT, "Critical analysis expert")
            .with_background(
                "I am a seasoned startup advisor and risk assessor, specializing in:\n\
                 - Market feasibility analysis\n\
                 - Business model evaluation\n\
                 - Risk identification and management\n\
                 - Competitive strategy analysis\n\
                 - Investment due diligence\n\
                 I have seen many ventures succeed and fail and know the common traps.",
            )
            .with_responsibility(
                "Help the user:\n\
                 1. Identify and challenge hidden assumptions\n\
                 2. Assess real market demand\n\
                 3. Analyze competitive threats and risks\n\
                 4. Validate business model feasibility\n\
                 5. Offer realistic improvements",
            )
            .with_tools(&[
                "assumption_checker",
                "market_validator",
                "feasibility_analyzer",
                "risk_assessor",
                "competitor_analyzer",
            ])
            .with_hint(None, "Collect market data to validate assumptions")
            .with_hint(None, "Interview potential users")
            .with_advice(
                Phase::Foundation,
                &[
                    "Verify the problem really exists and is not imagined",
                    "Confirm users are willing to pay for a solution",
                    "Assess whether the team can execute",
                ],
                &[
                    "Run 100 user interviews to validate demand",
                    "Analyze the alternatives users rely on today",
                    "Estimate the addressable market (TAM/SAM/SOM)",
                ],
            )
            .with_advice(
                Phase::Differentiation,
                &[
                    "Beware of over-differentiating into a market that is too small",
                    "Make sure the differentiators matter to users",
                    "Assess how defensible the differentiation is",
                ],
                &[
                    "Test willingness to pay for the differentiators",
                    "Analyze likely competitor counter-moves",
                    "Evaluate options for building a moat",
                ],
            )
            .with_advice(
                Phase::Approach,
                &[
                    "Avoid over-engineering the solution",
                    "Account for resource limits and timing windows",
                    "Prepare for the worst case",
                ],
                &[
                    "Draft a risk mitigation plan",
                    "Set clear success and failure criteria",
                    "Prepare a plan B and an exit strategy",
                ],
            )
            .with_metadata(
                "reality_checks",
                json!([
                    {
                        "area": "Market demand",
                        "question": "How many people are really willing to change their habits?",
                        "red_flag": "If the answer is 'educate the market', be very careful"
                    },
                    {
                        "area": "Competitive advantage",
                        "question": "Why haven't existing players done this?",
                        "red_flag": "There may be reasons you don't know about"
                    },
                    {
                        "area": "Execution",
                        "question": "Does the team have relevant track record?",
                        "red_flag": "First-time founders succeed less often"
                    },
                    {
                        "area": "Funding",
                        "question": "Can key milestones be reached before the money runs out?",
                        "red_flag": "Most startups fail when the cash runs out"
                    }
                ]),
            )
            .with_metadata(
                "common_pitfalls",
                json!([
                    "Premature scaling before product-market fit",
                    "Ignoring customers and building on assumptions instead of feedback",
                    "Perfectionism that misses the market window",
                    "Single-point dependence on one customer, supplier or channel",
                    "Founder conflict that drains the team"
                ]),
            )
            .with_metadata(
                "risk_assessment",
                json!({
                    "market_risk": "medium-high",
                    "technical_risk": "medium",
                    "execution_risk": "high",
                    "financial_risk": "high",
                    "overall_risk": "Risks need careful management"
                }),
            )
    }

    /// Market and data researcher.
    pub fn research() -> Self {
        Self::new(RESEARCH_AGENT, "In-depth research expert")
            .with_background(
                "I am a professional market researcher and data analyst, skilled at:\n\
                 - Market research and competitive analysis\n\
                 - Industry trend research\n\
                 - User behavior analysis\n\
                 - Data collection and validation\n\
                 - Technical feasibility research\n\
                 I gather information from many sources, cross-check it and report insights.",
            )
            .with_responsibility(
                "Help the user:\n\
                 1. Collect relevant market data and industry information\n\
                 2. Analyze competitors and the market landscape\n\
                 3. Study user needs and behavior patterns\n\
                 4. Validate sources and data accuracy\n\
                 5. Provide data-driven insights and recommendations",
            )
            .with_tools(&[
                "web_search",
                "market_research",
                "trend_analyzer",
                "data_collector",
                "source_validator",
            ])
            .with_hint(None, "Analyze competitors' specific strategies")
            .with_hint(None, "Research industry trends")
            .with_advice(
                Phase::Foundation,
                &[
                    "Research the demographics of target users",
                    "Study success and failure cases of similar products",
                    "Gather views and forecasts from industry experts",
                ],
                &[
                    "Create user personas and journey maps",
                    "Build a competitor feature comparison matrix",
                    "Analyze barriers to market entry",
                ],
            )
            .with_advice(
                Phase::Differentiation,
                &[
                    "Research the specific needs of market segments",
                    "Analyze competitors' positioning strategies",
                    "Survey user acceptance of new features",
                ],
                &[
                    "Run a price sensitivity analysis",
                    "Test the appeal of different value propositions",
                    "Research potential partners and channels",
                ],
            )
            .with_advice(
                Phase::Approach,
                &[
                    "Study implementation cases of similar projects",
                    "Assess the maturity of the required technology",
                    "Survey potential suppliers and partners",
                ],
                &[
                    "Draft a data collection and analysis plan",
                    "Set up monitoring for key metrics",
                    "Research relevant regulation and compliance requirements",
                ],
            )
            .with_metadata(
                "market_insights",
                json!({
                    "market_size": {
                        "TAM": "Total addressable market; needs industry-specific data",
                        "SAM": "Serviceable market based on capability and geography",
                        "SOM": "Obtainable market; a realistic share target"
                    },
                    "growth_drivers": [
                        "Accelerating digital transformation",
                        "Changing user habits",
                        "Adoption of new technology",
                        "Regulatory change"
                    ],
                    "market_barriers": [
                        "User education cost",
                        "Switching cost",
                        "Inertia of existing solutions",
                        "Trust and security concerns"
                    ]
                }),
            )
            .with_metadata(
                "competitive_analysis",
                json!({
                    "market_structure": "Market concentration needs specific analysis",
                    "key_players": [
                        {
                            "type": "Direct competitors",
                            "strategy": "Same problem, similar solution",
                            "threat": "high"
                        },
                        {
                            "type": "Indirect competitors",
                            "strategy": "Same problem, different solution",
                            "threat": "medium"
                        },
                        {
                            "type": "Potential entrants",
                            "strategy": "New players that may enter",
                            "threat": "unknown"
                        }
                    ],
                    "differentiation_opportunities": [
                        "Unmet segment needs",
                        "Better user experience",
                        "Innovative business model",
                        "Unique technical advantage"
                    ]
                }),
            )
            .with_metadata(
                "user_research",
                json!({
                    "research_methods": [
                        "In-depth interviews to understand underlying needs and motives",
                        "Surveys to quantify and validate hypotheses",
                        "Observational research to find unspoken needs",
                        "A/B tests to validate solution preferences",
                        "Focus groups to gather collective feedback"
                    ],
                    "key_questions": [
                        "What is the user's real pain point?",
                        "Where do existing solutions fall short?",
                        "How much are users willing to pay?",
                        "What drives the purchase decision?",
                        "How do we earn user trust?"
                    ],
                    "data_sources": [
                        "Industry reports and white papers",
                        "User forums and social media",
                        "Competitor product reviews",
                        "Government statistics",
                        "Academic research"
                    ]
                }),
            )
            .with_metadata(
                "data_quality",
                json!({
                    "completeness": "More data sources needed",
                    "accuracy": "Cross-check key figures",
                    "timeliness": "Make sure the data is current",
                    "relevance": "Focus on decision-relevant information"
                }),
            )
            .with_reference(
                Reference::new("report", "Industry research report")
                    .with_date("2024")
                    .with_quote("Look for the latest research report for the specific industry"),
            )
            .with_reference(
                Reference::new("article", "Market trend analysis")
                    .with_date("2024")
                    .with_quote("Watch for recent market shifts and changes in user behavior"),
            )
    }

    fn with_reference(mut self, reference: Reference) -> Self {
        self.references.push(reference);
        self
    }
}

/// Restrict a registry to the tools a profile declares.
pub trait RegistryExt {
    fn for_agent(&self, profile: &AgentProfile) -> ToolRegistry;
}

impl RegistryExt for ToolRegistry {
    fn for_agent(&self, profile: &AgentProfile) -> ToolRegistry {
        self.subset(&profile.tools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::register_workshop_tools;

    #[test]
    fn test_builtin_profiles_have_five_tools_each() {
        let mut registry = ToolRegistry::new();
        register_workshop_tools(&mut registry);

        for profile in AgentProfile::builtin() {
            let tools = registry.for_agent(&profile);
            assert_eq!(tools.len(), 5, "{} tool subset", profile.name);
        }
    }

    #[test]
    fn test_next_action_hints_respect_phase() {
        let think = AgentProfile::think();
        assert_eq!(think.next_actions_for(Some(Phase::Foundation)).len(), 2);
        assert!(think.next_actions_for(Some(Phase::Approach)).is_empty());
        assert!(think.next_actions_for(None).is_empty());

        let critique = AgentProfile::critique();
        assert_eq!(critique.next_actions_for(None).len(), 2);
    }

    #[test]
    fn test_enhance_appends_phase_advice_and_metadata() {
        let research = AgentProfile::research();
        let mut output = AgentOutput::new();
        output.suggestions.push("existing".to_string());

        research.enhance(
            &mut output,
            &AgentInput::new("q").with_phase(Phase::Differentiation),
        );

        assert_eq!(output.suggestions.len(), 4);
        assert_eq!(output.suggestions[0], "existing");
        assert_eq!(output.next_actions.len(), 3);
        assert!(output.metadata.contains_key("market_insights"));
        assert!(output.metadata.contains_key("data_quality"));
        assert_eq!(output.references.len(), 2);
        assert_eq!(output.references[0].kind, "report");
    }

    #[test]
    fn test_enhance_without_phase_skips_advice() {
        let mut output = AgentOutput::new();
        AgentProfile::critique().enhance(&mut output, &AgentInput::new("q"));
        assert!(output.suggestions.is_empty());
        assert!(output.metadata.contains_key("risk_assessment"));
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(
            AgentProfile::by_name("thinkagent").map(|p| p.name),
            Some(THINK_AGENT.to_string())
        );
        assert!(AgentProfile::by_name("PlannerAgent").is_none());
    }
}
