//! Service Layer Error Types
//!
//! This module defines error types for the reasoning client and the graph
//! synthesis job. Storage failures are wrapped rather than flattened so the
//! manual trigger can tell its caller which boundary failed.

use crate::db::DatabaseError;
use std::time::Duration;
use thiserror::Error;

/// External reasoning tool errors
#[derive(Error, Debug)]
pub enum ReasoningError {
    /// The tool could not be started (missing from PATH, not executable)
    #[error("Failed to start reasoning tool '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// The tool exited unsuccessfully without producing output
    #[error("Reasoning tool exited with status {code:?}: {stderr}")]
    ToolFailed { code: Option<i32>, stderr: String },

    /// The tool did not finish in time and was killed
    #[error("Reasoning tool timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// Extracted JSON could not be parsed into graph suggestions
    #[error("Failed to parse reasoning output: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ReasoningError {
    /// Create a spawn error for the named program
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Create a tool failure error
    pub fn tool_failed(code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::ToolFailed {
            code,
            stderr: stderr.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(timeout: Duration) -> Self {
        Self::Timeout { timeout }
    }

    /// True when the failure came from the child process rather than its output
    pub fn is_external_tool_error(&self) -> bool {
        matches!(self, Self::Spawn { .. } | Self::ToolFailed { .. })
    }
}

/// Graph synthesis errors
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// Storage operation failed
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    /// Reasoning tool invocation failed
    #[error("Reasoning failed: {0}")]
    Reasoning(#[from] ReasoningError),

    /// Too few unlinked notes for a manual regeneration
    #[error("Insufficient notes ({found}/{required})")]
    InsufficientNotes { found: usize, required: usize },

    /// Another synthesis run holds the in-progress flag
    #[error("Graph generation is already running")]
    AlreadyRunning,
}

impl SynthesisError {
    /// Create an insufficient notes error
    pub fn insufficient_notes(found: usize, required: usize) -> Self {
        Self::InsufficientNotes { found, required }
    }
}
