//! CLI configuration file support
//!
//! Loads configuration from ~/.config/sprintflow/config.toml

use serde::{Deserialize, Serialize};
use sprintflow_ai::EngineConfig;
use std::path::PathBuf;
use tracing::warn;

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Default settings
    #[serde(default)]
    pub default: DefaultConfig,
    /// API key settings
    #[serde(default)]
    pub api_keys: ApiKeysConfig,
    /// Reasoning loop and session store tuning
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Default configuration values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultConfig {
    /// LLM provider: openai, anthropic or mock
    pub provider: Option<String>,
    /// Default model
    pub model: Option<String>,
    /// Default database path
    pub db_path: Option<String>,
    /// Default agent name
    pub agent: Option<String>,
}

/// API key configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiKeysConfig {
    pub anthropic: Option<String>,
    pub openai: Option<String>,
}

impl CliConfig {
    /// Load configuration from default path
    pub fn load() -> Self {
        Self::load_from_path(Self::default_path())
    }

    /// Load configuration from a specific path
    ///
    /// A missing or unreadable file yields the defaults.
    pub fn load_from_path(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|err| {
                warn!(path = %path.display(), error = %err, "Invalid config file, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Get the default configuration file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sprintflow").join("config.toml"))
    }

    /// Apply API keys to environment variables
    ///
    /// Keys already present in the environment win.
    ///
    /// # Safety
    /// This modifies environment variables which can cause issues in multi-threaded contexts.
    /// Should only be called early in main() before spawning threads.
    pub fn apply_api_key_env(&self) {
        if let Some(key) = &self.api_keys.anthropic
            && std::env::var("ANTHROPIC_API_KEY").is_err()
        {
            // SAFETY: Called early in main() before spawning threads
            unsafe { std::env::set_var("ANTHROPIC_API_KEY", key) };
        }
        if let Some(key) = &self.api_keys.openai
            && std::env::var("OPENAI_API_KEY").is_err()
        {
            // SAFETY: Called early in main() before spawning threads
            unsafe { std::env::set_var("OPENAI_API_KEY", key) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load_from_path(Some(dir.path().join("absent.toml")));
        assert!(config.default.provider.is_none());
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_load_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[default]
provider = "anthropic"
model = "claude-sonnet-4-5"
agent = "ResearchAgent"

[api_keys]
anthropic = "sk-test"

[engine]
max_iterations = 8
session_ttl_secs = 600

[engine.confidence]
cap = 0.9
"#,
        )
        .unwrap();

        let config = CliConfig::load_from_path(Some(path));
        assert_eq!(config.default.provider.as_deref(), Some("anthropic"));
        assert_eq!(config.default.agent.as_deref(), Some("ResearchAgent"));
        assert_eq!(config.api_keys.anthropic.as_deref(), Some("sk-test"));
        assert_eq!(config.engine.max_iterations, 8);
        assert_eq!(config.engine.session_ttl(), Duration::from_secs(600));
        assert_eq!(config.engine.confidence.cap, 0.9);
        assert_eq!(config.engine.stop_after_tool_calls, 2);
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[default\nprovider = ").unwrap();

        let config = CliConfig::load_from_path(Some(path));
        assert!(config.default.provider.is_none());
    }
}
