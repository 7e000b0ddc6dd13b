//! Error types for the AI module

use thiserror::Error;

/// AI module error types
#[derive(Error, Debug)]
pub enum AiError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("{provider} API error ({status}): {message}")]
    LlmHttp {
        provider: String,
        status: u16,
        message: String,
        retry_after_secs: Option<u64>,
    },

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Turn cancelled")]
    Cancelled,

    #[error("Turn deadline exceeded")]
    DeadlineExceeded,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AiError {
    /// Whether a transport layer may retry the request that produced this error.
    pub fn is_retryable(&self) -> bool {
        match self {
            AiError::LlmHttp { status, .. } => *status == 429 || *status >= 500,
            AiError::Http(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            AiError::Llm(message) => {
                let lower = message.to_lowercase();
                lower.contains("rate limit") || lower.contains("timeout")
            }
            _ => false,
        }
    }

    /// Server-provided retry hint, if any.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            AiError::LlmHttp {
                retry_after_secs, ..
            } => *retry_after_secs,
            _ => None,
        }
    }
}

impl From<sprintflow_traits::ToolError> for AiError {
    fn from(err: sprintflow_traits::ToolError) -> Self {
        AiError::Tool(err.to_string())
    }
}

impl From<anyhow::Error> for AiError {
    fn from(err: anyhow::Error) -> Self {
        AiError::Storage(err.to_string())
    }
}

/// Result type alias for AI operations
pub type Result<T> = std::result::Result<T, AiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_retry_classification() {
        let retryable = AiError::LlmHttp {
            provider: "Test".to_string(),
            status: 503,
            message: "unavailable".to_string(),
            retry_after_secs: Some(2),
        };
        let non_retryable = AiError::LlmHttp {
            provider: "Test".to_string(),
            status: 400,
            message: "bad request".to_string(),
            retry_after_secs: None,
        };
        assert!(retryable.is_retryable());
        assert_eq!(retryable.retry_after(), Some(2));
        assert!(!non_retryable.is_retryable());
    }

    #[test]
    fn test_llm_string_fallback() {
        assert!(AiError::Llm("Rate limit hit".to_string()).is_retryable());
        assert!(AiError::Llm("request timeout".to_string()).is_retryable());
        assert!(!AiError::Llm("bad request".to_string()).is_retryable());
        assert!(!AiError::Cancelled.is_retryable());
    }
}
