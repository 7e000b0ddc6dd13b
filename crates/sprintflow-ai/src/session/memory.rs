//! In-process session store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::agent::interactive::ReActSessionState;
use crate::error::{AiError, Result};

use super::{SessionStore, ensure_session_id, ttl_duration};

/// Single-process store guarded by one exclusive lock.
///
/// Every read and write clones the whole session, so callers never share
/// nested collections with the map or with each other.
#[derive(Debug)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, ReActSessionState>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// Delete sessions idle for more than twice the TTL.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let limit = ttl_duration(self.ttl.saturating_mul(2));
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, session| session.idle_for(now) <= limit);
        before - sessions.len()
    }

    /// Run [`sweep_expired`](Self::sweep_expired) every `interval`.
    ///
    /// The task holds only a weak reference and exits once the store is
    /// dropped. Dropping the handle aborts it.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> SweeperHandle {
        let store = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                let removed = store.sweep_expired();
                if removed > 0 {
                    debug!(removed, "Evicted stale sessions");
                }
            }
        });
        SweeperHandle { handle }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(30 * 60))
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, session: &ReActSessionState) -> Result<()> {
        ensure_session_id(session)?;
        let copy = session.clone();
        self.sessions.lock().insert(copy.session_id.clone(), copy);
        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<ReActSessionState> {
        let mut copy = self
            .sessions
            .lock()
            .get(session_id)
            .cloned()
            .ok_or_else(|| AiError::SessionNotFound(session_id.to_string()))?;
        copy.apply_expiry(ttl_duration(self.ttl), Utc::now());
        Ok(copy)
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        self.sessions.lock().remove(session_id);
        Ok(())
    }

    async fn list(&self, agent_name: &str) -> Result<Vec<ReActSessionState>> {
        let mut copies: Vec<ReActSessionState> = self
            .sessions
            .lock()
            .values()
            .filter(|s| s.agent_name == agent_name)
            .cloned()
            .collect();

        let ttl = ttl_duration(self.ttl);
        let now = Utc::now();
        for copy in &mut copies {
            copy.apply_expiry(ttl, now);
        }
        copies.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(copies)
    }
}

/// Handle to a background sweeper; aborts the task when dropped.
#[derive(Debug)]
pub struct SweeperHandle {
    handle: JoinHandle<()>,
}

impl SweeperHandle {
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::input::AgentInput;
    use crate::agent::interactive::SessionStatus;
    use crate::agent::output::ReasoningStep;

    fn session(id: &str, agent: &str) -> ReActSessionState {
        ReActSessionState::new(id, agent, "sys", AgentInput::new("q"), Vec::new(), 5)
    }

    #[tokio::test]
    async fn test_save_rejects_empty_id() {
        let store = MemorySessionStore::default();
        let err = store.save(&session("", "ThinkAgent")).await.unwrap_err();
        assert!(matches!(err, AiError::Session(_)));
    }

    #[tokio::test]
    async fn test_load_returns_independent_copies() {
        let store = MemorySessionStore::default();
        let mut original = session("s1", "ThinkAgent");
        original.completed_steps.push(ReasoningStep::new(1));
        store.save(&original).await.unwrap();

        original.completed_steps.clear();
        original.collected_data.insert("k".into(), "v".into());

        let mut first = store.load("s1").await.unwrap();
        let second = store.load("s1").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.completed_steps.len(), 1);
        assert!(first.collected_data.is_empty());

        first.completed_steps.push(ReasoningStep::new(2));
        assert_eq!(store.load("s1").await.unwrap().completed_steps.len(), 1);
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let store = MemorySessionStore::default();
        assert!(matches!(
            store.load("nope").await,
            Err(AiError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_lazy_expiry_does_not_touch_stored_value() {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        let mut stale = session("s1", "ThinkAgent");
        stale.last_update_time = Utc::now() - chrono::Duration::seconds(120);
        store.save(&stale).await.unwrap();

        assert_eq!(store.load("s1").await.unwrap().status, SessionStatus::Expired);
        assert_eq!(
            store.sessions.lock().get("s1").map(|s| s.status),
            Some(SessionStatus::Active)
        );
        assert_eq!(
            store.list("ThinkAgent").await.unwrap()[0].status,
            SessionStatus::Expired
        );
    }

    #[tokio::test]
    async fn test_list_filters_by_agent_and_delete_is_idempotent() {
        let store = MemorySessionStore::default();
        store.save(&session("a", "ThinkAgent")).await.unwrap();
        store.save(&session("b", "CritiqueAgent")).await.unwrap();
        store.save(&session("c", "ThinkAgent")).await.unwrap();

        assert_eq!(store.list("ThinkAgent").await.unwrap().len(), 2);
        assert!(store.list("ResearchAgent").await.unwrap().is_empty());

        store.delete("a").await.unwrap();
        store.delete("a").await.unwrap();
        assert_eq!(store.list("ThinkAgent").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sweep_removes_only_twice_ttl_sessions() {
        let store = MemorySessionStore::new(Duration::from_secs(60));
        let now = Utc::now();

        let mut expired_only = session("recent", "ThinkAgent");
        expired_only.last_update_time = now - chrono::Duration::seconds(90);
        let mut abandoned = session("old", "ThinkAgent");
        abandoned.last_update_time = now - chrono::Duration::seconds(121);
        store.save(&expired_only).await.unwrap();
        store.save(&abandoned).await.unwrap();

        assert_eq!(store.sweep_at(now), 1);
        let remaining = store.list("ThinkAgent").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].session_id, "recent");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_and_stops_with_store() {
        let store = Arc::new(MemorySessionStore::new(Duration::from_secs(1)));
        let mut abandoned = session("old", "ThinkAgent");
        abandoned.last_update_time = Utc::now() - chrono::Duration::seconds(10);
        store.save(&abandoned).await.unwrap();

        let handle = store.spawn_sweeper(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert!(store.is_empty());

        drop(store);
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert!(handle.is_finished());
    }
}
