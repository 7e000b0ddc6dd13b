//! redb-backed session store.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sprintflow_storage::time_utils::now_ms;
use sprintflow_storage::{ReactSessionStorage, SessionIndexEntry, Storage};
use tracing::{debug, info};

use crate::agent::interactive::ReActSessionState;
use crate::error::{AiError, Result};

use super::{SessionStore, ensure_session_id, ttl_duration};

/// Sessions serialized as JSON into the `react_sessions` table.
///
/// Deserialization always yields a fresh value, so copies are deep by
/// construction.
#[derive(Debug, Clone)]
pub struct PersistentSessionStore {
    storage: ReactSessionStorage,
    ttl: Duration,
}

impl PersistentSessionStore {
    pub fn new(storage: ReactSessionStorage, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    /// Open (or create) a database file and wrap its session table.
    pub fn open(path: impl AsRef<Path>, ttl: Duration) -> Result<Self> {
        let storage = Storage::new(path)?;
        Ok(Self::new(storage.react_sessions, ttl))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn ttl_ms(&self) -> i64 {
        i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
    }

    /// Delete sessions not updated within twice the TTL.
    ///
    /// The index stores `last_update + ttl` as the expiry, so a session is
    /// stale once that expiry is more than one TTL in the past.
    pub fn purge_stale(&self) -> Result<usize> {
        let cutoff = now_ms().saturating_sub(self.ttl_ms());
        let removed = self.storage.purge_expired_before(cutoff)?;
        if removed > 0 {
            info!(removed, "Purged stale sessions");
        }
        Ok(removed)
    }

    fn decode(id: &str, bytes: &[u8]) -> Result<ReActSessionState> {
        serde_json::from_slice(bytes)
            .map_err(|e| AiError::Session(format!("Corrupt session '{id}': {e}")))
    }
}

#[async_trait]
impl SessionStore for PersistentSessionStore {
    async fn save(&self, session: &ReActSessionState) -> Result<()> {
        ensure_session_id(session)?;
        let data = serde_json::to_vec(session)?;
        let last_update_ms = session.last_update_time.timestamp_millis();
        let entry = SessionIndexEntry {
            agent_name: session.agent_name.clone(),
            status: session.status.as_str().to_string(),
            last_update_ms,
            expires_at_ms: last_update_ms.saturating_add(self.ttl_ms()),
        };
        self.storage.put_raw(&session.session_id, &data, &entry)?;
        debug!(session_id = %session.session_id, bytes = data.len(), "Saved session");
        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<ReActSessionState> {
        let bytes = self
            .storage
            .get_raw(session_id)?
            .ok_or_else(|| AiError::SessionNotFound(session_id.to_string()))?;
        let mut session = Self::decode(session_id, &bytes)?;
        session.apply_expiry(ttl_duration(self.ttl), Utc::now());
        Ok(session)
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        self.storage.delete(session_id)?;
        Ok(())
    }

    async fn list(&self, agent_name: &str) -> Result<Vec<ReActSessionState>> {
        let ttl = ttl_duration(self.ttl);
        let now = Utc::now();
        let mut sessions = self
            .storage
            .list_raw_by_agent(agent_name)?
            .into_iter()
            .map(|(id, bytes)| {
                let mut session = Self::decode(&id, &bytes)?;
                session.apply_expiry(ttl, now);
                Ok(session)
            })
            .collect::<Result<Vec<_>>>()?;
        sessions.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::input::AgentInput;
    use crate::agent::interactive::{
        InteractionType, PendingAction, SessionStatus,
    };
    use crate::agent::output::ReasoningStep;
    use tempfile::tempdir;

    fn session(id: &str, agent: &str) -> ReActSessionState {
        ReActSessionState::new(id, agent, "sys", AgentInput::new("q"), Vec::new(), 5)
    }

    #[tokio::test]
    async fn test_save_load_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessions.db");

        let mut paused = session("ThinkAgent_1", "ThinkAgent");
        paused.pause(
            ReasoningStep::new(1),
            PendingAction::new(
                "ask_user",
                "budget?",
                InteractionType::NeedInput,
                chrono::Duration::minutes(30),
            ),
        );

        {
            let store = PersistentSessionStore::open(&path, Duration::from_secs(1800)).unwrap();
            store.save(&paused).await.unwrap();
        }

        let store = PersistentSessionStore::open(&path, Duration::from_secs(1800)).unwrap();
        let loaded = store.load("ThinkAgent_1").await.unwrap();
        assert_eq!(loaded, paused);
        assert_eq!(loaded.status, SessionStatus::Paused);
    }

    #[tokio::test]
    async fn test_missing_and_delete() {
        let dir = tempdir().unwrap();
        let store =
            PersistentSessionStore::open(dir.path().join("s.db"), Duration::from_secs(60)).unwrap();

        assert!(matches!(
            store.load("none").await,
            Err(AiError::SessionNotFound(_))
        ));

        store.save(&session("a", "ThinkAgent")).await.unwrap();
        store.delete("a").await.unwrap();
        store.delete("a").await.unwrap();
        assert!(store.list("ThinkAgent").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_applies_lazy_expiry() {
        let dir = tempdir().unwrap();
        let store =
            PersistentSessionStore::open(dir.path().join("s.db"), Duration::from_secs(60)).unwrap();

        let mut stale = session("a", "ThinkAgent");
        stale.last_update_time = Utc::now() - chrono::Duration::seconds(90);
        store.save(&stale).await.unwrap();
        store.save(&session("b", "ThinkAgent")).await.unwrap();
        store.save(&session("c", "ResearchAgent")).await.unwrap();

        let listed = store.list("ThinkAgent").await.unwrap();
        assert_eq!(listed.len(), 2);
        let expired = listed.iter().find(|s| s.session_id == "a").unwrap();
        assert_eq!(expired.status, SessionStatus::Expired);
    }

    #[tokio::test]
    async fn test_purge_stale() {
        let dir = tempdir().unwrap();
        let store =
            PersistentSessionStore::open(dir.path().join("s.db"), Duration::from_secs(60)).unwrap();

        let mut abandoned = session("old", "ThinkAgent");
        abandoned.last_update_time = Utc::now() - chrono::Duration::seconds(300);
        store.save(&abandoned).await.unwrap();
        let mut idle = session("idle", "ThinkAgent");
        idle.last_update_time = Utc::now() - chrono::Duration::seconds(90);
        store.save(&idle).await.unwrap();
        store.save(&session("fresh", "ThinkAgent")).await.unwrap();

        assert_eq!(store.purge_stale().unwrap(), 1);
        let left: Vec<String> = store
            .list("ThinkAgent")
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.session_id)
            .collect();
        assert_eq!(left.len(), 2);
        assert!(left.contains(&"idle".to_string()));
        assert!(left.contains(&"fresh".to_string()));
    }
}
