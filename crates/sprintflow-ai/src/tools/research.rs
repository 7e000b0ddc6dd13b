//! Evidence-gathering tools used by the Research agent.
//!
//! Results are canned; none of these tools reach the network.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use sprintflow_traits::{InputMap, Tool, ToolOutput, ToolResult, require_str};

use super::optional_str;

/// Simulated web search.
pub struct WebSearchTool;

const MAX_SEARCH_RESULTS: usize = 3;

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for information on a topic"
    }

    fn required_fields(&self) -> &[&'static str] {
        &["query"]
    }

    fn optional_fields(&self) -> &[&'static str] {
        &["num_results", "time_range"]
    }

    async fn execute(&self, input: InputMap) -> ToolResult<ToolOutput> {
        let query = require_str(&input, "query")?;

        let mut results = vec![
            json!({
                "title": format!("Deep dive: latest developments in {query}"),
                "url": "https://example.com/analysis",
                "snippet": "Recent research shows the field is moving quickly...",
                "date": "2024-01-15",
                "source": "Industry research report",
            }),
            json!({
                "title": format!("{query} market analysis 2024"),
                "url": "https://example.com/market-report",
                "snippet": "The market is expected to reach... with annual growth of...",
                "date": "2024-01-10",
                "source": "Market research firm",
            }),
            json!({
                "title": format!("Case study: innovating in {query}"),
                "url": "https://example.com/case-study",
                "snippet": "By adopting new technology and business models...",
                "date": "2024-01-05",
                "source": "Business magazine",
            }),
        ];

        let wanted = match input.get("num_results") {
            Some(Value::Number(n)) => n.as_u64().map(|n| n as usize),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        if let Some(wanted) = wanted {
            results.truncate(wanted.clamp(1, MAX_SEARCH_RESULTS));
        }

        let mut response = json!({
            "query": query,
            "total_results": results.len(),
            "results": results,
            "suggestion": "Use more specific keywords for more precise results",
        });
        if let Some(range) = optional_str(&input, "time_range") {
            response["note"] = json!(format!("Results filtered for time range: {range}"));
        }

        Ok(ToolOutput::success(response))
    }
}

/// Market size, trends and segments for an industry.
pub struct MarketResearchTool;

#[async_trait]
impl Tool for MarketResearchTool {
    fn name(&self) -> &str {
        "market_research"
    }

    fn description(&self) -> &str {
        "Gather market data and insights"
    }

    fn required_fields(&self) -> &[&'static str] {
        &["industry"]
    }

    fn optional_fields(&self) -> &[&'static str] {
        &["segment", "geography"]
    }

    async fn execute(&self, input: InputMap) -> ToolResult<ToolOutput> {
        let industry = require_str(&input, "industry")?;

        let mut research = json!({
            "market_size": {
                "current": "USD 5B",
                "projected": "USD 12B (2028)",
                "cagr": "24.5%",
                "confidence": "Based on 3 independent sources",
            },
            "key_trends": [
                {"trend": "Accelerating digital transformation", "impact": "high", "timeframe": "1-2 years"},
                {"trend": "Sustainability requirements", "impact": "medium", "timeframe": "2-3 years"},
                {"trend": "AI and automation adoption", "impact": "high", "timeframe": "ongoing"},
            ],
            "customer_segments": [
                {"segment": "Enterprise", "size": "30%", "growth_rate": "15%", "pain_points": ["Integration", "Data security", "Compliance"]},
                {"segment": "SMB", "size": "50%", "growth_rate": "30%", "pain_points": ["Cost", "Ease of use", "Fast deployment"]},
                {"segment": "Startups", "size": "20%", "growth_rate": "45%", "pain_points": ["Flexibility", "Scalability", "Value for money"]},
            ],
            "competitive_dynamics": {
                "market_concentration": "moderate",
                "top_players_share": "Top 5 hold 45%",
                "entry_barriers": ["Technology", "Customer acquisition cost", "Brand recognition"],
            },
        });
        if let Some(segment) = optional_str(&input, "segment") {
            research["segment_focus"] = json!(format!("Focus on the {segment} segment"));
        }
        if let Some(geography) = optional_str(&input, "geography") {
            research["geographic_focus"] = json!(format!("Market characteristics for {geography}"));
        }

        Ok(ToolOutput::success(json!({
            "industry": industry,
            "research": research,
            "sources": ["Gartner Research", "IDC Market Analysis", "CB Insights", "Industry Reports"],
            "last_updated": Utc::now().format("%Y-%m-%d").to_string(),
            "recommendation": "Dig into the fastest-growing segment",
        })))
    }
}

/// Macro, technology and behaviour trends in a domain.
pub struct TrendAnalyzerTool;

#[async_trait]
impl Tool for TrendAnalyzerTool {
    fn name(&self) -> &str {
        "trend_analyzer"
    }

    fn description(&self) -> &str {
        "Analyze trends and patterns in a domain"
    }

    fn required_fields(&self) -> &[&'static str] {
        &["domain"]
    }

    fn optional_fields(&self) -> &[&'static str] {
        &["timeframe", "data_sources"]
    }

    async fn execute(&self, input: InputMap) -> ToolResult<ToolOutput> {
        let domain = require_str(&input, "domain")?;

        let mut analysis = json!({
            "macro_trends": [
                {"trend": "Remote work becomes normal", "strength": "strong", "implications": ["Collaboration tools", "Digital infrastructure"]},
                {"trend": "Growing privacy awareness", "strength": "medium", "implications": ["Privacy tech demand", "Higher compliance cost"]},
            ],
            "technology_trends": [
                {"technology": "Generative AI", "adoption_stage": "early majority", "use_cases": ["Content", "Code", "Customer service"]},
                {"technology": "Edge computing", "adoption_stage": "early adopters", "use_cases": ["IoT", "Real-time processing"]},
            ],
            "emerging_opportunities": [
                {"opportunity": "AI personalised services", "timing": "next 6-12 months"},
                {"opportunity": "Sustainable technology", "timing": "next 1-2 years"},
            ],
        });
        if let Some(timeframe) = optional_str(&input, "timeframe") {
            analysis["timeframe_note"] = json!(format!("Analysis window: {timeframe}"));
        }

        Ok(ToolOutput::success(json!({
            "domain": domain,
            "analysis": analysis,
            "confidence_level": "medium-high",
            "key_insights": [
                "Technology adoption is accelerating",
                "User expectations keep rising",
                "Sustainability is becoming a key factor",
            ],
        })))
    }
}

/// Structured data by data type.
pub struct DataCollectorTool;

#[async_trait]
impl Tool for DataCollectorTool {
    fn name(&self) -> &str {
        "data_collector"
    }

    fn description(&self) -> &str {
        "Collect structured data from various sources"
    }

    fn required_fields(&self) -> &[&'static str] {
        &["data_type"]
    }

    fn optional_fields(&self) -> &[&'static str] {
        &["sources", "filters"]
    }

    async fn execute(&self, input: InputMap) -> ToolResult<ToolOutput> {
        let data_type = require_str(&input, "data_type")?;

        let data = match data_type {
            "user_feedback" => json!({
                "total_reviews": 1250,
                "average_rating": 4.2,
                "sentiment_breakdown": {"positive": 750, "neutral": 300, "negative": 200},
                "top_complaints": ["Price", "Complexity", "Slow support"],
                "top_praises": ["Powerful", "Friendly UI", "Reliable"],
            }),
            "competitor_data" => json!([
                {"company": "Competitor A", "market_share": "25%", "pricing": "$99-499/mo"},
                {"company": "Competitor B", "market_share": "18%", "pricing": "$49-299/mo"},
            ]),
            "industry_metrics" => json!({
                "customer_acquisition_cost": "$150-500",
                "lifetime_value": "$2000-8000",
                "churn_rate": "5-15%/mo",
                "conversion_rate": "2-5%",
            }),
            _ => json!({ "status": "A more specific data type is needed" }),
        };

        Ok(ToolOutput::success(json!({
            "data_type": data_type,
            "data": data,
            "metadata": {
                "collection_date": Utc::now().format("%Y-%m-%d").to_string(),
                "sources_used": 3,
                "confidence": "medium",
            },
        })))
    }
}

/// Credibility assessment for an information source.
pub struct SourceValidatorTool;

#[async_trait]
impl Tool for SourceValidatorTool {
    fn name(&self) -> &str {
        "source_validator"
    }

    fn description(&self) -> &str {
        "Validate and assess the credibility of information sources"
    }

    fn required_fields(&self) -> &[&'static str] {
        &["source"]
    }

    fn optional_fields(&self) -> &[&'static str] {
        &["claim", "cross_check"]
    }

    async fn execute(&self, input: InputMap) -> ToolResult<ToolOutput> {
        let source = require_str(&input, "source")?;

        let mut validation = json!({
            "credibility_assessment": {
                "authority_score": 0.75,
                "accuracy_score": 0.80,
                "objectivity_score": 0.70,
                "currency_score": 0.85,
                "overall_score": 0.78,
            },
            "validation_criteria": [
                {"criterion": "Author authority", "flag": "green"},
                {"criterion": "Citations", "flag": "green"},
                {"criterion": "Publishing platform", "flag": "yellow"},
                {"criterion": "Recency", "flag": "green"},
                {"criterion": "Bias", "flag": "yellow"},
            ],
            "reliability_rating": "reliable",
            "usage_recommendation": "Usable, but cross-check key figures",
        });
        if let Some(claim) = optional_str(&input, "claim") {
            validation["claim_verification"] = json!({
                "claim": claim,
                "verification": "needs further verification",
                "evidence_level": "medium",
            });
        }

        Ok(ToolOutput::success(json!({
            "source": source,
            "validation": validation,
            "timestamp": Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            "advice": "Always verify important information against several independent sources",
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprintflow_traits::normalize_input;

    #[tokio::test]
    async fn test_web_search_accepts_plain_text() {
        let output = WebSearchTool
            .execute(normalize_input("fintech for freelancers"))
            .await
            .unwrap();
        assert_eq!(output.result["query"], "fintech for freelancers");
        assert_eq!(output.result["total_results"], 3);
    }

    #[tokio::test]
    async fn test_web_search_num_results() {
        let input = normalize_input(r#"{"query": "q", "num_results": "1"}"#);
        let output = WebSearchTool.execute(input).await.unwrap();
        assert_eq!(output.result["results"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_data_collector_unknown_type() {
        let input = normalize_input(r#"{"data_type": "weather"}"#);
        let output = DataCollectorTool.execute(input).await.unwrap();
        assert_eq!(output.result["data"]["status"], "A more specific data type is needed");
    }

    #[tokio::test]
    async fn test_source_validator_claim() {
        let input = normalize_input(r#"{"source": "blog", "claim": "market doubles"}"#);
        let output = SourceValidatorTool.execute(input).await.unwrap();
        assert_eq!(
            output.result["validation"]["claim_verification"]["claim"],
            "market doubles"
        );
    }
}
