//! Error types for Partflow.
//!
//! All errors in Partflow are represented by the `PartflowError` enum.
//! They are integrity errors of the caller-supplied graph or arguments and
//! are never retried by the planner itself.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Partflow operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum PartflowError {
    /// A connection references a node that is not part of the graph,
    /// or two nodes share a name or id.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// The planner was called with an argument that does not fit the graph,
    /// e.g. an unknown target node or duplicate connections.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// The part of the graph feeding the target node is not acyclic.
    #[error("cycle detected between nodes: {}", nodes.join(", "))]
    Cycle {
        nodes: Vec<String>,
    },

    /// Configuration parsing or loading errors.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors (JSON definitions and data snapshots).
    #[error("{0}")]
    Convert(String),
}

impl From<std::io::Error> for PartflowError {
    fn from(error: std::io::Error) -> Self {
        PartflowError::Config(error.to_string())
    }
}

impl From<serde_json::Error> for PartflowError {
    fn from(error: serde_json::Error) -> Self {
        PartflowError::Convert(error.to_string())
    }
}

impl From<toml::de::Error> for PartflowError {
    fn from(error: toml::de::Error) -> Self {
        PartflowError::Config(error.to_string())
    }
}
