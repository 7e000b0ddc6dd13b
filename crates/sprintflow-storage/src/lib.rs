//! SprintFlow Storage - Low-level storage abstraction layer
//!
//! This crate provides the persistence layer for SprintFlow, using redb as the
//! embedded database. It exposes byte-level APIs so that the typed session
//! model can live in `sprintflow-ai` without a circular dependency.
//!
//! # Tables
//!
//! - `react_sessions` - Serialized interactive ReAct session state
//! - `react_session_index` - Per-session listing and eviction columns

pub mod paths;
pub mod react_session;
pub mod time_utils;

use anyhow::Result;
use redb::Database;
use std::path::Path;
use std::sync::Arc;

pub use react_session::{ReactSessionStorage, SessionIndexEntry};

/// Central storage manager that initializes all storage subsystems
pub struct Storage {
    db: Arc<Database>,
    pub react_sessions: ReactSessionStorage,
}

impl Storage {
    /// Create a new storage instance at the given path.
    ///
    /// This will create the database file if it doesn't exist and initialize
    /// all required tables.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let db = Arc::new(Database::create(path)?);
        let react_sessions = ReactSessionStorage::new(db.clone())?;

        tracing::debug!(path = %path.display(), "Opened storage");
        Ok(Self { db, react_sessions })
    }

    /// Get a reference to the underlying database
    pub fn get_db(&self) -> Arc<Database> {
        self.db.clone()
    }
}
