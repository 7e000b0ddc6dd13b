//! Evaluation tools used by the Critique agent.

use async_trait::async_trait;
use serde_json::json;
use sprintflow_traits::{InputMap, Tool, ToolOutput, ToolResult, require_str};

use super::optional_str;

/// Identify and rank assumptions behind a statement.
pub struct AssumptionCheckerTool;

#[async_trait]
impl Tool for AssumptionCheckerTool {
    fn name(&self) -> &str {
        "assumption_checker"
    }

    fn description(&self) -> &str {
        "Identify and validate assumptions in a business idea or plan"
    }

    fn required_fields(&self) -> &[&'static str] {
        &["statement"]
    }

    fn optional_fields(&self) -> &[&'static str] {
        &["domain", "evidence"]
    }

    async fn execute(&self, input: InputMap) -> ToolResult<ToolOutput> {
        let statement = require_str(&input, "statement")?;

        let assumptions = json!([
            {
                "assumption": "Users are willing to pay for this",
                "type": "market",
                "risk_level": "high",
                "validation": "User interviews and willingness-to-pay tests",
                "questions": [
                    "How do users solve this problem today?",
                    "What do they pay for current solutions?",
                    "What would make them switch?",
                ],
            },
            {
                "assumption": "The technology can deliver the expected functionality",
                "type": "technical",
                "risk_level": "medium",
                "validation": "Technical prototype and feasibility study",
                "questions": [
                    "Is the core technology mature?",
                    "Are there comparable implementations?",
                    "Where is the bottleneck?",
                ],
            },
            {
                "assumption": "The market is large enough",
                "type": "market",
                "risk_level": "high",
                "validation": "Market research and data analysis",
                "questions": [
                    "How big is the target market?",
                    "How fast is it growing?",
                    "What penetration is realistic?",
                ],
            },
            {
                "assumption": "The team can execute",
                "type": "execution",
                "risk_level": "medium",
                "validation": "Assess team capability and resources",
                "questions": [
                    "Does the team have relevant experience?",
                    "Are there enough resources?",
                    "What is the biggest execution challenge?",
                ],
            },
        ]);

        let lowered = statement.to_lowercase();
        let mut critical = Vec::new();
        if ["user", "customer", "用户", "客户"]
            .iter()
            .any(|w| lowered.contains(w))
        {
            critical.push("User behaviour assumptions need validation first");
        }
        if ["ai", "automat", "自动"].iter().any(|w| lowered.contains(w)) {
            critical.push("Technology maturity assumptions need validation");
        }

        let mut result = json!({
            "statement": statement,
            "identified_assumptions": assumptions,
            "critical_assumptions": critical,
            "recommendation": "Validate high-risk assumptions first, using the cheapest method available",
        });
        if let Some(evidence) = optional_str(&input, "evidence") {
            result["evidence_provided"] = json!(evidence);
        }

        Ok(ToolOutput::success(result))
    }
}

/// Check demand signals and market risks for a product idea.
pub struct MarketValidatorTool;

#[async_trait]
impl Tool for MarketValidatorTool {
    fn name(&self) -> &str {
        "market_validator"
    }

    fn description(&self) -> &str {
        "Validate market demand and competitive landscape"
    }

    fn required_fields(&self) -> &[&'static str] {
        &["product_idea"]
    }

    fn optional_fields(&self) -> &[&'static str] {
        &["target_market", "competitors"]
    }

    async fn execute(&self, input: InputMap) -> ToolResult<ToolOutput> {
        let product_idea = require_str(&input, "product_idea")?;

        let mut validation = json!({
            "demand_indicators": {
                "search_volume": "Check search volume for related keywords",
                "community_activity": "Discussion activity in relevant communities",
                "competitor_growth": "Growth rate of competitors",
                "funding_trends": "Investment trends in the space",
            },
            "market_risks": [
                {
                    "risk": "Market education cost",
                    "assessment": "Do users understand the value?",
                    "mitigation": "Lower the learning curve with content and onboarding",
                },
                {
                    "risk": "Competitive intensity",
                    "assessment": "Are there strong incumbents?",
                    "mitigation": "Find a differentiated position or niche",
                },
                {
                    "risk": "Timing",
                    "assessment": "Is the market ready?",
                    "mitigation": "Target early adopters and expand gradually",
                },
            ],
            "validation_methods": [
                "1. Interview 100 potential users",
                "2. Launch a landing page and measure conversion",
                "3. Analyse competitor reviews",
                "4. Collect feedback at industry events",
                "5. Run a small paid ad test",
            ],
        });
        if let Some(market) = optional_str(&input, "target_market") {
            validation["target_market_analysis"] =
                json!(format!("Validation strategy specific to the {market} market"));
        }

        Ok(ToolOutput::success(json!({
            "product_idea": product_idea,
            "validation": validation,
            "next_steps": "Pick 2-3 validation methods and start testing now",
        })))
    }
}

/// Score technical, financial and operational feasibility.
pub struct FeasibilityAnalyzerTool;

#[async_trait]
impl Tool for FeasibilityAnalyzerTool {
    fn name(&self) -> &str {
        "feasibility_analyzer"
    }

    fn description(&self) -> &str {
        "Analyze technical, financial, and operational feasibility"
    }

    fn required_fields(&self) -> &[&'static str] {
        &["project"]
    }

    fn optional_fields(&self) -> &[&'static str] {
        &["resources", "timeline"]
    }

    async fn execute(&self, input: InputMap) -> ToolResult<ToolOutput> {
        let project = require_str(&input, "project")?;

        let technical = 0.7;
        let financial = 0.6;
        let operational = 0.75;
        let overall = ((technical + financial + operational) / 3.0 * 100.0_f64).round() / 100.0;

        let analysis = json!({
            "technical_feasibility": {
                "score": technical,
                "challenges": ["Stack selection and integration", "Scalability", "Performance"],
                "requirements": ["2-3 senior engineers", "6-9 months of development", "Cloud infrastructure"],
            },
            "financial_feasibility": {
                "score": financial,
                "revenue_model": ["Subscription", "Transaction fees", "Premium services"],
                "break_even": "Estimated 18-24 months",
            },
            "operational_feasibility": {
                "score": operational,
                "requirements": ["Customer support", "Operating processes", "Quality assurance"],
                "risks": ["Hiring pace", "Process standardisation", "Service quality"],
            },
            "overall_assessment": {
                "feasibility_score": overall,
                "recommendation": "Feasible with careful planning",
                "critical_factors": [
                    "Secure sufficient funding runway",
                    "Roll out in phases",
                    "Build a strong engineering team",
                ],
            },
        });

        let mut result = json!({
            "project": project,
            "analysis": analysis,
            "advice": "Validate with an MVP before committing large investment",
        });
        if let Some(timeline) = optional_str(&input, "timeline") {
            result["timeline_note"] = json!(format!("Plan checked against timeline: {timeline}"));
        }

        Ok(ToolOutput::success(result))
    }
}

/// Identify and assess venture risks.
pub struct RiskAssessorTool;

/// (category, risk, probability, impact, mitigation)
const RISKS: [(&str, &str, &str, &str, &str); 6] = [
    ("market", "Demand below expectations", "medium", "high", "Validate early with lean experiments"),
    ("technical", "Implementation proves difficult", "medium", "high", "Prototype and bring in technical advisors"),
    ("competition", "A large player enters the market", "low", "critical", "Build a moat and focus on a niche"),
    ("financial", "Running out of cash", "medium", "critical", "Control burn and diversify funding"),
    ("team", "Key members leave", "low", "high", "Equity incentives and a healthy culture"),
    ("legal", "Compliance issues", "low", "medium", "Consult counsel early and set up compliance"),
];

fn probability_weight(level: &str) -> f64 {
    match level {
        "low" => 0.3,
        "medium" => 0.5,
        "high" => 0.7,
        _ => 0.0,
    }
}

fn impact_weight(level: &str) -> f64 {
    match level {
        "low" => 0.3,
        "medium" => 0.5,
        "high" => 0.7,
        "critical" => 0.9,
        _ => 0.0,
    }
}

pub(crate) fn risk_level(score: f64) -> &'static str {
    if score < 0.3 {
        "low"
    } else if score < 0.5 {
        "moderate"
    } else if score < 0.7 {
        "high"
    } else {
        "very high"
    }
}

#[async_trait]
impl Tool for RiskAssessorTool {
    fn name(&self) -> &str {
        "risk_assessor"
    }

    fn description(&self) -> &str {
        "Identify and assess potential risks"
    }

    fn required_fields(&self) -> &[&'static str] {
        &["venture"]
    }

    fn optional_fields(&self) -> &[&'static str] {
        &["industry", "stage"]
    }

    async fn execute(&self, input: InputMap) -> ToolResult<ToolOutput> {
        let venture = require_str(&input, "venture")?;

        let risks: Vec<_> = RISKS
            .iter()
            .map(|(category, risk, probability, impact, mitigation)| {
                json!({
                    "category": category,
                    "risk": risk,
                    "probability": probability,
                    "impact": impact,
                    "mitigation": mitigation,
                })
            })
            .collect();

        let score = RISKS
            .iter()
            .map(|(_, _, p, i, _)| probability_weight(p) * impact_weight(i))
            .sum::<f64>()
            / RISKS.len() as f64;

        Ok(ToolOutput::success(json!({
            "venture": venture,
            "risks": risks,
            "risk_score": format!("{score:.2}"),
            "risk_level": risk_level(score),
            "priority_actions": [
                "Address high-probability, high-impact risks first",
                "Set up risk monitoring",
                "Prepare contingency plans",
            ],
        })))
    }
}

/// Map the competitive landscape of a market.
pub struct CompetitorAnalyzerTool;

#[async_trait]
impl Tool for CompetitorAnalyzerTool {
    fn name(&self) -> &str {
        "competitor_analyzer"
    }

    fn description(&self) -> &str {
        "Analyze competitors and competitive positioning"
    }

    fn required_fields(&self) -> &[&'static str] {
        &["market"]
    }

    fn optional_fields(&self) -> &[&'static str] {
        &["competitors", "our_solution"]
    }

    async fn execute(&self, input: InputMap) -> ToolResult<ToolOutput> {
        let market = require_str(&input, "market")?;

        let mut analysis = json!({
            "competitive_landscape": {
                "market_leaders": [
                    "Identify the 3-5 main competitors",
                    "Estimate their market share",
                    "Understand their strengths and weaknesses",
                ],
                "market_gaps": [
                    "Most common user complaints",
                    "Needs existing solutions miss",
                    "Openings for differentiation",
                ],
            },
            "positioning_strategy": [
                {"strategy": "Differentiation", "description": "Find a unique value proposition", "example": "Simpler, faster, more specialised"},
                {"strategy": "Niche focus", "description": "Serve a specific segment", "example": "Small businesses only"},
                {"strategy": "Cost leadership", "description": "Offer a cheaper solution", "example": "Open source or freemium"},
            ],
            "competitive_advantages": ["Network effects", "Economies of scale", "Brand", "Technical barriers"],
        });
        if let Some(named) = optional_str(&input, "competitors") {
            analysis["named_competitors"] = json!(
                named
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            );
        }
        if let Some(ours) = optional_str(&input, "our_solution") {
            analysis["our_solution"] = json!(ours);
        }

        Ok(ToolOutput::success(json!({
            "market": market,
            "analysis": analysis,
            "action_items": [
                "Build a detailed competitor comparison table",
                "Identify a defensible position",
                "Define the differentiation strategy",
            ],
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprintflow_traits::normalize_input;

    #[tokio::test]
    async fn test_assumption_checker_flags_user_and_ai() {
        let input = normalize_input(r#"{"statement": "Customers want an AI coach"}"#);
        let output = AssumptionCheckerTool.execute(input).await.unwrap();
        assert_eq!(output.result["critical_assumptions"].as_array().unwrap().len(), 2);
        assert_eq!(output.result["identified_assumptions"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_risk_score() {
        let output = RiskAssessorTool
            .execute(normalize_input(r#"{"venture": "v"}"#))
            .await
            .unwrap();
        // (0.35 + 0.35 + 0.27 + 0.45 + 0.21 + 0.15) / 6
        assert_eq!(output.result["risk_score"], "0.30");
        assert_eq!(output.result["risk_level"], "low");
    }

    #[test]
    fn test_risk_level_bands() {
        assert_eq!(risk_level(0.1), "low");
        assert_eq!(risk_level(0.69), "high");
        assert_eq!(risk_level(0.7), "very high");
    }

    #[tokio::test]
    async fn test_market_validator_requires_string() {
        let input = normalize_input(r#"{"product_idea": 3}"#);
        assert!(MarketValidatorTool.execute(input).await.is_err());
    }
}
