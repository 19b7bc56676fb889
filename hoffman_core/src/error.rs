//! Error types for the simulation core.

use thiserror::Error;

/// Errors surfaced by the simulation core.
///
/// Movement never fails: an agent with no empty neighbour simply stays put.
/// Everything here originates at a boundary: parameters handed in by the
/// caller, state read back from a snapshot, or a caller-supplied rule.
#[derive(Debug, Error)]
pub enum SimError {
    /// Parameters or run options rejected before any state is allocated
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Snapshot is structurally invalid, incomplete, or inconsistent
    #[error("Snapshot corrupt: {0}")]
    SnapshotCorrupt(String),

    /// Snapshot read/write failed at the filesystem boundary
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding state for persistence failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A transition rule broke the world's invariants
    #[error("Rule violation: {0}")]
    RuleViolation(String),
}

impl SimError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a snapshot corruption error.
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::SnapshotCorrupt(msg.into())
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        match err.classify() {
            Category::Io => Self::Io(err.into()),
            Category::Syntax | Category::Data | Category::Eof => {
                Self::SnapshotCorrupt(err.to_string())
            }
        }
    }
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, SimError>;
