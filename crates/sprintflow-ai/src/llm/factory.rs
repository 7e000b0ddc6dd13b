//! LLM client factory for provider selection at construction time

use std::str::FromStr;
use std::sync::Arc;

use crate::error::{AiError, Result};
use crate::llm::{AnthropicClient, LlmClient, MockLlmClient, OpenAIClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    OpenAI,
    Anthropic,
    Mock,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
            Self::Mock => "mock",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Mock => None,
        }
    }

    pub fn base_url_env(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_BASE_URL"),
            Self::Anthropic => Some("ANTHROPIC_BASE_URL"),
            Self::Mock => None,
        }
    }

    pub fn model_env(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_MODEL"),
            Self::Anthropic => Some("ANTHROPIC_MODEL"),
            Self::Mock => None,
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "mock" => Ok(Self::Mock),
            other => Err(AiError::Config(format!("Unknown LLM provider '{other}'"))),
        }
    }
}

/// Build a client for `provider`.
///
/// Empty `model` / `base_url` values keep the provider defaults.
pub fn create_client(
    provider: LlmProvider,
    api_key: Option<&str>,
    model: Option<&str>,
    base_url: Option<&str>,
) -> Result<Arc<dyn LlmClient>> {
    let model = model.filter(|m| !m.trim().is_empty());
    let base_url = base_url.filter(|u| !u.trim().is_empty());

    match provider {
        LlmProvider::OpenAI => {
            let key = require_key(provider, api_key)?;
            let mut client = OpenAIClient::new(key);
            if let Some(model) = model {
                client = client.with_model(model);
            }
            if let Some(url) = base_url {
                client = client.with_base_url(url);
            }
            Ok(Arc::new(client))
        }
        LlmProvider::Anthropic => {
            let key = require_key(provider, api_key)?;
            let mut client = AnthropicClient::new(key);
            if let Some(model) = model {
                client = client.with_model(model);
            }
            if let Some(url) = base_url {
                client = client.with_base_url(url);
            }
            Ok(Arc::new(client))
        }
        LlmProvider::Mock => Ok(Arc::new(MockLlmClient::new(model.unwrap_or("mock")))),
    }
}

/// Build a client from the provider's environment variables.
pub fn from_env(provider: LlmProvider) -> Result<Arc<dyn LlmClient>> {
    let read = |name: Option<&'static str>| {
        name.and_then(|n| std::env::var(n).ok())
            .filter(|v| !v.trim().is_empty())
    };

    let api_key = read(provider.api_key_env());
    let model = read(provider.model_env());
    let base_url = read(provider.base_url_env());

    create_client(
        provider,
        api_key.as_deref(),
        model.as_deref(),
        base_url.as_deref(),
    )
}

fn require_key(provider: LlmProvider, api_key: Option<&str>) -> Result<&str> {
    api_key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
        AiError::Config(format!(
            "{} API key is required (set {})",
            provider,
            provider.api_key_env().unwrap_or("an API key")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parsing() {
        assert_eq!("OpenAI".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAI);
        assert_eq!("claude".parse::<LlmProvider>().unwrap(), LlmProvider::Anthropic);
        assert!("gemini".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn test_create_client_requires_key() {
        let err = match create_client(LlmProvider::OpenAI, None, None, None) {
            Err(err) => err,
            Ok(_) => panic!("expected missing key error"),
        };
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_create_client_applies_model() {
        let client =
            create_client(LlmProvider::Anthropic, Some("key"), Some("claude-x"), None).unwrap();
        assert_eq!(client.provider(), "anthropic");
        assert_eq!(client.model(), "claude-x");

        let mock = create_client(LlmProvider::Mock, None, Some(""), None).unwrap();
        assert_eq!(mock.model(), "mock");
    }
}
