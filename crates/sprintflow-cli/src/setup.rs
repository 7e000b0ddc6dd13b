//! CLI setup module
//!
//! Builds the LLM client, session store and agent service for a command.

use anyhow::Result;
use sprintflow_ai::llm::create_client;
use sprintflow_ai::{
    AgentService, LlmClient, LlmProvider, PersistentSessionStore, workshop_registry,
};
use sprintflow_storage::paths;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::CliConfig;

/// Agent used when neither the command nor the config names one.
pub const FALLBACK_AGENT: &str = "ThinkAgent";

/// Provider from the config, else the first API key found in the environment.
pub fn resolve_provider(config: &CliConfig) -> Result<LlmProvider> {
    if let Some(provider) = config.default.provider.as_deref() {
        return Ok(provider.parse()?);
    }

    let has_env = |name: &str| std::env::var(name).is_ok_and(|v| !v.trim().is_empty());
    if has_env("OPENAI_API_KEY") {
        Ok(LlmProvider::OpenAI)
    } else if has_env("ANTHROPIC_API_KEY") {
        Ok(LlmProvider::Anthropic)
    } else {
        warn!("No API key configured, falling back to the mock LLM");
        Ok(LlmProvider::Mock)
    }
}

pub fn build_llm(config: &CliConfig) -> Result<Arc<dyn LlmClient>> {
    let provider = resolve_provider(config)?;
    let read = |name: Option<&'static str>| {
        name.and_then(|n| std::env::var(n).ok())
            .filter(|v| !v.trim().is_empty())
    };

    let api_key = read(provider.api_key_env());
    let base_url = read(provider.base_url_env());
    let model = read(provider.model_env()).or_else(|| config.default.model.clone());

    let client = create_client(
        provider,
        api_key.as_deref(),
        model.as_deref(),
        base_url.as_deref(),
    )?;
    info!(provider = %provider, model = client.model(), "LLM client ready");
    Ok(client)
}

/// `--db-path` (or its env var), then the config, then the default location.
pub fn resolve_db_path(db_path: Option<String>, config: &CliConfig) -> Result<PathBuf> {
    match db_path.or_else(|| config.default.db_path.clone()) {
        Some(path) => Ok(PathBuf::from(path)),
        None => paths::default_database_path(),
    }
}

pub fn open_store(db_path: Option<String>, config: &CliConfig) -> Result<Arc<PersistentSessionStore>> {
    let path = resolve_db_path(db_path, config)?;
    let store = PersistentSessionStore::open(&path, config.engine.session_ttl())?;
    store.purge_stale()?;
    Ok(Arc::new(store))
}

/// Built-in agents over the persistent session store.
///
/// The store is returned too; the database can only be opened once per process.
pub fn prepare_service(
    db_path: Option<String>,
    config: &CliConfig,
) -> Result<(AgentService, Arc<PersistentSessionStore>)> {
    let llm = build_llm(config)?;
    let store = open_store(db_path, config)?;
    let service = AgentService::with_builtin_agents(
        llm,
        &workshop_registry(),
        store.clone(),
        config.engine.clone(),
    );
    Ok((service, store))
}

/// Agent requested on the command line, else the configured default.
pub fn agent_name(requested: Option<String>, config: &CliConfig) -> String {
    requested
        .or_else(|| config.default.agent.clone())
        .unwrap_or_else(|| FALLBACK_AGENT.to_string())
}
