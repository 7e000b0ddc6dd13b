//! SprintFlow Traits - Shared tool abstractions.
//!
//! This crate provides the capability interfaces used across the SprintFlow workspace:
//! - Tool trait, ToolOutput, ToolSchema
//! - ToolError and the crate-wide Result alias
//! - ToolRegistry with per-role subsets

pub mod error;
pub mod registry;
pub mod tool;

// ── Top-level re-exports ─────────────────────────────────────────────

// Error types
pub use error::{Result as ToolResult, ToolError};

// Tool trait and core types
pub use tool::{InputMap, Tool, ToolOutput, ToolSchema, normalize_input, require_str};

// Registry
pub use registry::ToolRegistry;
