//! Keyed persistence for interactive sessions.
//!
//! Stores hand out independent copies: nothing returned by [`SessionStore::load`]
//! aliases what the store holds, and nothing passed to [`SessionStore::save`]
//! is retained by reference.

mod memory;
mod persistent;

pub use memory::{MemorySessionStore, SweeperHandle};
pub use persistent::PersistentSessionStore;

use async_trait::async_trait;

use crate::agent::interactive::ReActSessionState;
use crate::error::{AiError, Result};

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a copy of `session`, replacing any previous value for its id.
    async fn save(&self, session: &ReActSessionState) -> Result<()>;

    /// A copy of the stored session, with lazy expiry applied.
    async fn load(&self, session_id: &str) -> Result<ReActSessionState>;

    /// Remove a session. Unknown ids are not an error.
    async fn delete(&self, session_id: &str) -> Result<()>;

    /// Copies of every session owned by `agent_name`, with lazy expiry applied.
    async fn list(&self, agent_name: &str) -> Result<Vec<ReActSessionState>>;
}

fn ensure_session_id(session: &ReActSessionState) -> Result<()> {
    if session.session_id.trim().is_empty() {
        return Err(AiError::Session("session id cannot be empty".to_string()));
    }
    Ok(())
}

fn ttl_duration(ttl: std::time::Duration) -> chrono::Duration {
    chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX)
}
