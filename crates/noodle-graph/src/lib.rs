//! Noodle Graph - persistent data model for the noodles workflow editor
//!
//! A workflow is a directed graph of nodes. Each node is placed from a
//! template declaring named input and output connectors ("noodlets"), and
//! links run from an output noodlet to an input noodlet. This crate holds
//! that model and its on-disk session format; rendering and interaction
//! live elsewhere and only call into it.
//!
//! # Architecture
//!
//! - `Graph`: nodes keyed by never-reused integer handles, with forward
//!   and inverse adjacency kept as exact mirrors
//! - `TemplateRegistry`: resolves template names when sessions are loaded
//! - `session`: JSON session documents with atomic file saves
//! - `DiagnosticSink`: injected receiver for non-fatal diagnostics
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use noodle_graph::{Graph, NodeTemplate, Noodlet};
//!
//! let adder = Arc::new(NodeTemplate::new("Adder", ["value-1", "value-2"], ["sum"]));
//! let mut graph = Graph::new();
//! let a = graph.add_node(adder.instantiate().with_location((50.0, 50.0)));
//! let b = graph.add_node(adder.instantiate().with_location((400.0, 200.0)));
//! graph.add_link(Noodlet::new(a, "sum"), Noodlet::new(b, "value-1"))?;
//! ```

pub mod builder;
pub mod error;
pub mod events;
pub mod graph;
pub mod registry;
pub mod samples;
pub mod session;
pub mod shared;
pub mod types;
pub mod validation;

// Re-export key types
pub use builder::GraphBuilder;
pub use error::{GraphError, Result};
pub use events::{DiagnosticSink, GraphDiagnostic, LogSink, NullSink, VecSink};
pub use graph::Graph;
pub use registry::TemplateRegistry;
pub use session::{SessionDocument, SessionLink, SessionNode, SessionOptions};
pub use shared::SharedGraph;
pub use types::{Direction, Extent, NodeHandle, NodeInstance, NodeTemplate, Noodlet, Point};
pub use validation::{validate_document, validate_graph, ValidationError};
