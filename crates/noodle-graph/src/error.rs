//! Error types for the graph model

use thiserror::Error;

use crate::types::Noodlet;

/// Result type alias using GraphError
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors that can occur while editing, loading or saving a graph
#[derive(Debug, Error)]
pub enum GraphError {
    /// A noodlet names a node or connector that is not registered
    /// in the required direction
    #[error("Unknown connector: {0}")]
    UnknownConnector(Noodlet),

    /// A node or noodlet lookup found nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// The edge to delete is absent from both adjacency maps
    #[error("Edge not found: {from} -> {to}")]
    EdgeNotFound { from: Noodlet, to: Noodlet },

    /// Forward and inverse adjacency disagree
    #[error("Corrupt graph: {0}")]
    CorruptGraph(String),

    /// A persisted session failed schema or referential validation
    #[error("Malformed session: {0}")]
    MalformedSession(String),

    /// A location or extent cannot be written to a session
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GraphError {
    /// Create a not-found error with a message
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a corrupt-graph error with a message
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptGraph(msg.into())
    }

    /// Create a malformed-session error with a message
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedSession(msg.into())
    }

    /// Whether the caller can recover by reverting the gesture that caused it
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::CorruptGraph(_))
    }
}
