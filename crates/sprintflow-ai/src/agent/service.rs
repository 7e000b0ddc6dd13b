//! Agent facade and the multi-agent service.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use sprintflow_traits::ToolRegistry;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::{AiError, Result};
use crate::llm::LlmClient;
use crate::session::{MemorySessionStore, SessionStore, SweeperHandle};

use super::input::AgentInput;
use super::interactive::{InteractiveOutput, InteractiveReActProcessor, ReActSessionState};
use super::output::AgentOutput;
use super::profile::{AgentProfile, RegistryExt};
use super::react::ReActProcessor;
use super::turn::TurnOptions;

/// One workshop agent: a profile bound to an LLM, its tool subset and a
/// session store.
pub struct Agent {
    interactive: InteractiveReActProcessor,
}

impl Agent {
    pub fn new(
        profile: AgentProfile,
        llm: Arc<dyn LlmClient>,
        registry: &ToolRegistry,
        store: Arc<dyn SessionStore>,
        config: EngineConfig,
    ) -> Self {
        let tools = registry.for_agent(&profile);
        let processor = ReActProcessor::new(profile, llm, tools, config);
        Self {
            interactive: InteractiveReActProcessor::new(processor, store),
        }
    }

    pub fn name(&self) -> &str {
        &self.profile().name
    }

    pub fn profile(&self) -> &AgentProfile {
        self.interactive.processor().profile()
    }

    pub fn processor(&self) -> &InteractiveReActProcessor {
        &self.interactive
    }

    /// Run a full non-interactive turn and decorate the result with the
    /// profile's phase advice.
    pub async fn process(&self, input: &AgentInput) -> Result<AgentOutput> {
        self.process_with(input, &TurnOptions::default()).await
    }

    pub async fn process_with(&self, input: &AgentInput, turn: &TurnOptions) -> Result<AgentOutput> {
        let mut output = self.interactive.processor().process_with(input, turn).await?;
        self.profile().enhance(&mut output, input);
        Ok(output)
    }

    pub async fn process_interactive(
        &self,
        input: &AgentInput,
        session_id: Option<&str>,
        turn: &TurnOptions,
    ) -> Result<InteractiveOutput> {
        self.interactive
            .process_interactive(input, session_id, turn)
            .await
    }

    pub async fn list_sessions(&self) -> Result<Vec<ReActSessionState>> {
        self.interactive.list_sessions().await
    }
}

/// Agents keyed by name.
#[derive(Default)]
pub struct AgentService {
    agents: BTreeMap<String, Arc<Agent>>,
    /// Eviction task for a service-owned memory store.
    sweeper: Option<SweeperHandle>,
}

impl AgentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// All built-in profiles sharing one LLM, registry and store.
    pub fn with_builtin_agents(
        llm: Arc<dyn LlmClient>,
        registry: &ToolRegistry,
        store: Arc<dyn SessionStore>,
        config: EngineConfig,
    ) -> Self {
        let mut service = Self::new();
        for profile in AgentProfile::builtin() {
            service.register(Agent::new(
                profile,
                llm.clone(),
                registry,
                store.clone(),
                config.clone(),
            ));
        }
        service
    }

    /// Built-in agents over a fresh in-memory store.
    ///
    /// The store uses `config.session_ttl()` and is swept every
    /// `config.sweep_interval()` for as long as the service lives. Must be
    /// called from within a tokio runtime.
    pub fn with_memory_store(
        llm: Arc<dyn LlmClient>,
        registry: &ToolRegistry,
        config: EngineConfig,
    ) -> Self {
        let store = Arc::new(MemorySessionStore::new(config.session_ttl()));
        let sweeper = store.spawn_sweeper(config.sweep_interval());
        info!(
            ttl_secs = config.session_ttl_secs,
            sweep_interval_secs = config.sweep_interval().as_secs(),
            "Started session sweeper"
        );

        let mut service = Self::with_builtin_agents(llm, registry, store, config);
        service.sweeper = Some(sweeper);
        service
    }

    /// Whether this service runs its own eviction task.
    pub fn has_sweeper(&self) -> bool {
        self.sweeper.as_ref().is_some_and(|s| !s.is_finished())
    }

    /// Register an agent, replacing any agent with the same name.
    pub fn register(&mut self, agent: Agent) {
        self.agents.insert(agent.name().to_string(), Arc::new(agent));
    }

    pub fn get(&self, name: &str) -> Option<Arc<Agent>> {
        self.agents.get(name).cloned()
    }

    /// Like [`get`](Self::get), matching the name case-insensitively.
    pub fn find(&self, name: &str) -> Result<Arc<Agent>> {
        self.agents
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, agent)| agent.clone())
            .ok_or_else(|| AiError::Config(format!("Unknown agent '{name}'")))
    }

    pub fn names(&self) -> Vec<&str> {
        self.agents.keys().map(String::as_str).collect()
    }

    pub fn agents(&self) -> impl Iterator<Item = &Arc<Agent>> {
        self.agents.values()
    }

    /// Run `input` through several agents concurrently.
    ///
    /// Each requested name gets its own entry; unknown names yield an error
    /// entry instead of failing the batch.
    #[tracing::instrument(skip(self, input))]
    pub async fn process_multi(
        &self,
        input: &AgentInput,
        agent_names: &[String],
    ) -> BTreeMap<String, Result<AgentOutput>> {
        let runs = agent_names.iter().map(|name| async move {
            let result = match self.find(name) {
                Ok(agent) => agent.process(input).await,
                Err(err) => Err(err),
            };
            if let Err(err) = &result {
                warn!(agent = %name, error = %err, "Agent run failed");
            }
            (name.clone(), result)
        });

        let results: BTreeMap<_, _> = join_all(runs).await.into_iter().collect();
        info!(
            agents = results.len(),
            failed = results.values().filter(|r| r.is_err()).count(),
            "Multi-agent run finished"
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::input::Phase;
    use crate::llm::{MockLlmClient, MockStep};
    use crate::session::MemorySessionStore;
    use crate::tools::workshop_registry;

    fn service(llm: MockLlmClient) -> AgentService {
        AgentService::with_builtin_agents(
            Arc::new(llm),
            &workshop_registry(),
            Arc::new(MemorySessionStore::default()),
            EngineConfig::default(),
        )
    }

    #[test]
    fn test_builtin_agents_get_their_tool_subsets() {
        let service = service(MockLlmClient::new("mock"));
        assert_eq!(
            service.names(),
            vec!["CritiqueAgent", "ResearchAgent", "ThinkAgent"]
        );

        let research = service.find("researchagent").unwrap();
        let tools = research.processor().processor().tools();
        assert!(tools.has("web_search"));
        assert!(!tools.has("brainstorm"));
    }

    #[tokio::test]
    async fn test_process_applies_profile_enhancement() {
        let llm = MockLlmClient::from_steps(
            "mock",
            vec![MockStep::final_answer("Check the riskiest bet")],
        );
        let service = service(llm);
        let agent = service.get("CritiqueAgent").unwrap();

        let input = AgentInput::new("Review my plan").with_phase(Phase::Differentiation);
        let output = agent.process(&input).await.unwrap();
        assert_eq!(output.response, "Check the riskiest bet");
        assert!(!output.suggestions.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_store_service_evicts_abandoned_sessions() {
        use crate::agent::interactive::ReActSessionState;
        use std::time::Duration;

        let config = EngineConfig {
            sweep_interval_secs: 1,
            ..EngineConfig::default()
        }
        .with_session_ttl(Duration::from_secs(2));
        let service = AgentService::with_memory_store(
            Arc::new(MockLlmClient::new("mock")),
            &workshop_registry(),
            config,
        );
        assert!(service.has_sweeper());

        let agent = service.get("ThinkAgent").unwrap();
        let store = agent.processor().store().clone();
        let mut abandoned = ReActSessionState::new(
            "ThinkAgent_old",
            "ThinkAgent",
            "sys",
            AgentInput::new("q"),
            Vec::new(),
            5,
        );
        abandoned.last_update_time = chrono::Utc::now() - chrono::Duration::seconds(60);
        store.save(&abandoned).await.unwrap();
        assert!(store.load("ThinkAgent_old").await.is_ok());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(matches!(
            store.load("ThinkAgent_old").await,
            Err(AiError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_process_multi_reports_per_agent_results() {
        let service = service(MockLlmClient::new("mock"));
        let names = vec!["ThinkAgent".to_string(), "NoSuchAgent".to_string()];

        let results = service
            .process_multi(&AgentInput::new("Pitch"), &names)
            .await;
        assert_eq!(results.len(), 2);
        assert!(results["ThinkAgent"].is_ok());
        assert!(matches!(results["NoSuchAgent"], Err(AiError::Config(_))));
    }
}
