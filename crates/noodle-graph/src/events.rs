//! Diagnostics emitted by the graph
//!
//! The graph reports non-fatal conditions (such as a lenient delete of a
//! name that does not exist) and session activity through a sink injected
//! at construction, so tests can observe them without global logger state.

use serde::{Deserialize, Serialize};

/// Trait for receiving graph diagnostics
pub trait DiagnosticSink: Send + Sync {
    /// Report a diagnostic
    fn report(&self, diagnostic: GraphDiagnostic);
}

/// Diagnostics reported by the graph and the session loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GraphDiagnostic {
    /// A delete by name matched no node; nothing was removed
    #[serde(rename_all = "camelCase")]
    MissingNodeName { name: String },

    /// Handles were renumbered to a dense range
    #[serde(rename_all = "camelCase")]
    Compacted { nodes: usize },

    /// A session document was turned into a graph
    #[serde(rename_all = "camelCase")]
    SessionLoaded { nodes: usize, links: usize },

    /// A graph was written out as a session document
    #[serde(rename_all = "camelCase")]
    SessionSaved { nodes: usize, links: usize },
}

impl GraphDiagnostic {
    /// Whether the diagnostic signals something the user should look at
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::MissingNodeName { .. })
    }
}

impl std::fmt::Display for GraphDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingNodeName { name } => {
                write!(f, "Tried to delete a non-existing node: '{}'", name)
            }
            Self::Compacted { nodes } => write!(f, "Compacted {} node handles", nodes),
            Self::SessionLoaded { nodes, links } => {
                write!(f, "Loaded session with {} nodes and {} links", nodes, links)
            }
            Self::SessionSaved { nodes, links } => {
                write!(f, "Saved session with {} nodes and {} links", nodes, links)
            }
        }
    }
}

/// Sink that forwards diagnostics to the `log` facade
///
/// This is the default sink of a new graph.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, diagnostic: GraphDiagnostic) {
        if diagnostic.is_warning() {
            log::warn!("{}", diagnostic);
        } else {
            log::info!("{}", diagnostic);
        }
    }
}

/// A no-op sink that discards all diagnostics
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&self, _diagnostic: GraphDiagnostic) {}
}

/// A vector-based sink that collects diagnostics
///
/// Useful for testing to verify what was reported.
#[derive(Debug, Default)]
pub struct VecSink {
    diagnostics: parking_lot::Mutex<Vec<GraphDiagnostic>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all collected diagnostics
    pub fn diagnostics(&self) -> Vec<GraphDiagnostic> {
        self.diagnostics.lock().clone()
    }

    /// Only the warnings
    pub fn warnings(&self) -> Vec<GraphDiagnostic> {
        self.diagnostics
            .lock()
            .iter()
            .filter(|d| d.is_warning())
            .cloned()
            .collect()
    }

    /// Clear all collected diagnostics
    pub fn clear(&self) {
        self.diagnostics.lock().clear();
    }
}

impl DiagnosticSink for VecSink {
    fn report(&self, diagnostic: GraphDiagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink() {
        let sink = VecSink::new();
        sink.report(GraphDiagnostic::Compacted { nodes: 3 });
        sink.report(GraphDiagnostic::MissingNodeName {
            name: "Adder 7".to_string(),
        });

        assert_eq!(sink.diagnostics().len(), 2);
        assert_eq!(
            sink.warnings(),
            vec![GraphDiagnostic::MissingNodeName {
                name: "Adder 7".to_string()
            }]
        );

        sink.clear();
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn test_log_sink() {
        let _ = env_logger::builder().is_test(true).try_init();
        // Should not panic
        LogSink.report(GraphDiagnostic::MissingNodeName {
            name: "ghost".to_string(),
        });
        LogSink.report(GraphDiagnostic::SessionSaved { nodes: 0, links: 0 });
    }

    #[test]
    fn test_diagnostic_serialization() {
        let json = serde_json::to_value(GraphDiagnostic::SessionLoaded { nodes: 2, links: 1 })
            .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "sessionLoaded", "nodes": 2, "links": 1})
        );
    }
}
