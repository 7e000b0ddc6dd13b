//! ReAct session storage - byte-level API for resumable session persistence.
//!
//! Each session is stored twice in one transaction: the opaque state blob in
//! `react_sessions`, and a small denormalized index row in
//! `react_session_index` carrying the columns needed for listing and
//! eviction without decoding the blob.

use anyhow::Result;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const REACT_SESSIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("react_sessions");
const REACT_SESSION_INDEX_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("react_session_index");

/// Denormalized columns stored next to each session blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIndexEntry {
    pub agent_name: String,
    pub status: String,
    /// Last update time in milliseconds since epoch.
    pub last_update_ms: i64,
    /// Time after which the session counts as expired, in milliseconds.
    pub expires_at_ms: i64,
}

/// Low-level ReAct session storage with byte-level API
#[derive(Debug, Clone)]
pub struct ReactSessionStorage {
    db: Arc<Database>,
}

impl ReactSessionStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(REACT_SESSIONS_TABLE)?;
        write_txn.open_table(REACT_SESSION_INDEX_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Store raw session data together with its index row
    pub fn put_raw(&self, id: &str, data: &[u8], entry: &SessionIndexEntry) -> Result<()> {
        let encoded_entry = serde_json::to_vec(entry)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut sessions = write_txn.open_table(REACT_SESSIONS_TABLE)?;
            sessions.insert(id, data)?;
            let mut index = write_txn.open_table(REACT_SESSION_INDEX_TABLE)?;
            index.insert(id, encoded_entry.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get raw session data by ID
    pub fn get_raw(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(REACT_SESSIONS_TABLE)?;

        if let Some(data) = table.get(id)? {
            Ok(Some(data.value().to_vec()))
        } else {
            Ok(None)
        }
    }

    /// List raw session data owned by one agent, filtered through the index
    pub fn list_raw_by_agent(&self, agent_name: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(REACT_SESSION_INDEX_TABLE)?;
        let sessions = read_txn.open_table(REACT_SESSIONS_TABLE)?;

        let mut result = Vec::new();
        for item in index.iter()? {
            let (key, value) = item?;
            let entry: SessionIndexEntry = serde_json::from_slice(value.value())?;
            if entry.agent_name != agent_name {
                continue;
            }
            if let Some(data) = sessions.get(key.value())? {
                result.push((key.value().to_string(), data.value().to_vec()));
            }
        }

        Ok(result)
    }

    /// Delete session by ID
    pub fn delete(&self, id: &str) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut sessions = write_txn.open_table(REACT_SESSIONS_TABLE)?;
            let mut index = write_txn.open_table(REACT_SESSION_INDEX_TABLE)?;
            index.remove(id)?;
            sessions.remove(id)?.is_some()
        };
        write_txn.commit()?;
        Ok(existed)
    }

    /// Delete every session whose expiry passed before `cutoff_ms`.
    ///
    /// Returns the number of removed sessions.
    pub fn purge_expired_before(&self, cutoff_ms: i64) -> Result<usize> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut sessions = write_txn.open_table(REACT_SESSIONS_TABLE)?;
            let mut index = write_txn.open_table(REACT_SESSION_INDEX_TABLE)?;

            let mut stale = Vec::new();
            for item in index.iter()? {
                let (key, value) = item?;
                let entry: SessionIndexEntry = serde_json::from_slice(value.value())?;
                if entry.expires_at_ms < cutoff_ms {
                    stale.push(key.value().to_string());
                }
            }

            for id in &stale {
                index.remove(id.as_str())?;
                sessions.remove(id.as_str())?;
            }
            stale.len()
        };
        write_txn.commit()?;

        if removed > 0 {
            tracing::debug!(removed, "Purged stale react sessions");
        }
        Ok(removed)
    }
}
