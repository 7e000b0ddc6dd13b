//! Engine configuration.
//!
//! Every numeric policy the reasoning loop relies on lives here so it can be
//! tuned from the CLI config file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::llm::LlmOptions;

/// Iteration budget used when none (or zero) is configured.
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;
const DEFAULT_PENDING_TIMEOUT_SECS: u64 = 30 * 60;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 5 * 60;
const DEFAULT_STOP_AFTER_TOOL_CALLS: usize = 2;

/// Additive confidence scoring policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidencePolicy {
    pub base: f64,
    pub per_tool: f64,
    pub per_successful_tool: f64,
    pub per_observation: f64,
    pub cap: f64,
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            base: 0.5,
            per_tool: 0.1,
            per_successful_tool: 0.05,
            per_observation: 0.05,
            cap: 0.95,
        }
    }
}

/// Configuration for the ReAct processors and session stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Iteration budget per session (0 falls back to the default).
    pub max_iterations: usize,
    /// Idle time after which a stored session reads as expired.
    pub session_ttl_secs: u64,
    /// How long a pending action waits for a human reply.
    pub pending_timeout_secs: u64,
    /// Period of the background eviction sweep.
    pub sweep_interval_secs: u64,
    /// Options for the thought + action request.
    pub thought: LlmOptions,
    /// Options for the reflection request.
    pub reflection: LlmOptions,
    /// Options for final answer synthesis.
    pub final_answer: LlmOptions,
    /// Tool executions after which the loop wraps up.
    pub stop_after_tool_calls: usize,
    pub confidence: ConfidencePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            pending_timeout_secs: DEFAULT_PENDING_TIMEOUT_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            thought: LlmOptions::new().with_temperature(0.7).with_max_tokens(1000),
            reflection: LlmOptions::new().with_temperature(0.5).with_max_tokens(200),
            final_answer: LlmOptions::new().with_temperature(0.7).with_max_tokens(500),
            stop_after_tool_calls: DEFAULT_STOP_AFTER_TOOL_CALLS,
            confidence: ConfidencePolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Set the iteration budget
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the session time-to-live
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl_secs = ttl.as_secs();
        self
    }

    /// Iteration budget with the zero fallback applied.
    pub fn effective_max_iterations(&self) -> usize {
        if self.max_iterations == 0 {
            DEFAULT_MAX_ITERATIONS
        } else {
            self.max_iterations
        }
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn pending_timeout(&self) -> Duration {
        Duration::from_secs(self.pending_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.effective_max_iterations(), 5);
        assert_eq!(config.session_ttl(), Duration::from_secs(1800));
        assert_eq!(config.sweep_interval(), Duration::from_secs(300));
        assert_eq!(config.thought.max_tokens, Some(1000));
        assert_eq!(config.reflection.temperature, Some(0.5));
        assert_eq!(config.final_answer.max_tokens, Some(500));
    }

    #[test]
    fn test_zero_iterations_falls_back() {
        let config = EngineConfig::default().with_max_iterations(0);
        assert_eq!(config.effective_max_iterations(), DEFAULT_MAX_ITERATIONS);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"max_iterations": 8, "confidence": {"cap": 0.9}}"#).unwrap();
        assert_eq!(config.max_iterations, 8);
        assert_eq!(config.confidence.cap, 0.9);
        assert_eq!(config.confidence.base, 0.5);
        assert_eq!(config.stop_after_tool_calls, 2);
    }
}
