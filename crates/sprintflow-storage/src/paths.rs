//! Path utilities for SprintFlow directory resolution.

use anyhow::Result;
use std::path::PathBuf;

const SPRINTFLOW_DIR: &str = ".sprintflow";
const DATABASE_FILE: &str = "sprintflow.db";

/// Environment variable to override the SprintFlow directory.
const SPRINTFLOW_DIR_ENV: &str = "SPRINTFLOW_DIR";

/// Resolve the SprintFlow data directory.
/// Priority: SPRINTFLOW_DIR env var > ~/.sprintflow/
pub fn resolve_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(SPRINTFLOW_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|h| h.join(SPRINTFLOW_DIR))
        .ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))
}

/// Ensure the data directory exists and return its path.
pub fn ensure_data_dir() -> Result<PathBuf> {
    let dir = resolve_data_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Default database path: ~/.sprintflow/sprintflow.db
pub fn default_database_path() -> Result<PathBuf> {
    Ok(ensure_data_dir()?.join(DATABASE_FILE))
}
