//! Session persistence
//!
//! A session is everything that should survive between editing sessions:
//! nodes with their names, templates, locations and extents, plus the
//! links between them. It is stored as a JSON document:
//!
//! ```json
//! {
//!   "nodes": [
//!     { "handle": 0, "name": "Adder 0", "template": "Adder",
//!       "location": [50.0, 50.0], "extent": null }
//!   ],
//!   "links": [
//!     { "from": { "node": 0, "connector": "sum" },
//!       "to":   { "node": 2, "connector": "value-1" } }
//!   ]
//! }
//! ```
//!
//! Loading validates the whole document before any node is created and
//! only hands back a graph once every link has been wired.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::events::{DiagnosticSink, GraphDiagnostic, LogSink};
use crate::graph::Graph;
use crate::registry::TemplateRegistry;
use crate::types::{Extent, NodeHandle, NodeInstance, Noodlet, Point};
use crate::validation::validate_document;

/// Options controlling how sessions are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionOptions {
    /// Pretty-print the JSON output
    pub pretty: bool,
    /// Write handles as a dense `0..n` range without compacting the graph
    pub dense_handles: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            dense_handles: false,
        }
    }
}

impl SessionOptions {
    /// Parse options from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A node as stored in a session document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionNode {
    pub handle: NodeHandle,
    pub name: String,
    /// Template name, resolved through a [`TemplateRegistry`] on load
    pub template: String,
    pub location: Option<Point>,
    pub extent: Option<Extent>,
}

/// A link as stored in a session document
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionLink {
    pub from: Noodlet,
    pub to: Noodlet,
}

/// The persisted form of a graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionDocument {
    pub nodes: Vec<SessionNode>,
    pub links: Vec<SessionLink>,
}

impl Graph {
    /// Build the persisted form of this graph
    ///
    /// Nodes come out in handle order and links sorted, so saving the
    /// same graph twice yields the same document.
    pub fn to_document(&self, options: &SessionOptions) -> SessionDocument {
        let mapping = options.dense_handles.then(|| self.dense_mapping());
        let handle = |h: NodeHandle| match &mapping {
            Some(mapping) => mapping.get(&h).copied().unwrap_or(h),
            None => h,
        };

        let nodes = self
            .all_nodes()
            .map(|(h, node)| SessionNode {
                handle: handle(h),
                name: node.name.clone(),
                template: node.template().name().to_string(),
                location: node.location,
                extent: node.extent,
            })
            .collect();

        let mut links: Vec<SessionLink> = self
            .all_links()
            .map(|(from, to)| SessionLink {
                from: from.with_node(handle(from.node)),
                to: to.with_node(handle(to.node)),
            })
            .collect();
        links.sort();

        SessionDocument { nodes, links }
    }
}

/// Serialize a graph to a session string
///
/// Fails with [`GraphError::InvalidCoordinate`] when a location or extent
/// is NaN or infinite, since JSON has no way to store it.
pub fn save_to_string(graph: &Graph, options: &SessionOptions) -> Result<String> {
    let document = graph.to_document(options);
    check_coordinates(&document)?;
    let json = if options.pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    graph.report(GraphDiagnostic::SessionSaved {
        nodes: document.nodes.len(),
        links: document.links.len(),
    });
    Ok(json)
}

fn check_coordinates(document: &SessionDocument) -> Result<()> {
    for node in &document.nodes {
        for (field, pair) in [("location", node.location), ("extent", node.extent)] {
            if let Some((a, b)) = pair {
                if !a.is_finite() || !b.is_finite() {
                    return Err(GraphError::InvalidCoordinate(format!(
                        "{} of node {} '{}' is [{}, {}]",
                        field, node.handle, node.name, a, b
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Write a graph to a session file
///
/// The document goes to a temporary file next to `path` first and is
/// renamed into place, so a failed save never leaves a truncated session.
pub fn save_to_path(graph: &Graph, path: impl AsRef<Path>, options: &SessionOptions) -> Result<()> {
    let path = path.as_ref();
    let json = save_to_string(graph, options)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(json.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| GraphError::Io(e.error))?;

    log::info!("Saved session with {} nodes to {:?}", graph.len(), path);
    Ok(())
}

/// Parse a session string into a graph that logs its diagnostics
pub fn load_from_str(json: &str, registry: &TemplateRegistry) -> Result<Graph> {
    load_from_str_with_sink(json, registry, Arc::new(LogSink))
}

/// Parse a session string into a graph reporting to `sink`
pub fn load_from_str_with_sink(
    json: &str,
    registry: &TemplateRegistry,
    sink: Arc<dyn DiagnosticSink>,
) -> Result<Graph> {
    let document: SessionDocument =
        serde_json::from_str(json).map_err(|e| GraphError::malformed(e.to_string()))?;
    load_document(document, registry, sink)
}

/// Read a session file into a graph that logs its diagnostics
pub fn load_from_path(path: impl AsRef<Path>, registry: &TemplateRegistry) -> Result<Graph> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let graph = load_from_str(&json, registry)?;
    log::info!("Loaded session with {} nodes from {:?}", graph.len(), path);
    Ok(graph)
}

/// Turn a session document into a graph
///
/// Document handles are replaced by fresh handles assigned in document
/// order. Fails with [`GraphError::MalformedSession`] listing every
/// problem when the document does not validate.
pub fn load_document(
    document: SessionDocument,
    registry: &TemplateRegistry,
    sink: Arc<dyn DiagnosticSink>,
) -> Result<Graph> {
    let errors = validate_document(&document, registry);
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(GraphError::malformed(messages.join("; ")));
    }

    let mut graph = Graph::with_sink(sink);
    let mut handles: HashMap<NodeHandle, NodeHandle> = HashMap::new();

    for node in document.nodes {
        let template = registry.get(&node.template).ok_or_else(|| {
            GraphError::malformed(format!("unknown template '{}'", node.template))
        })?;
        let mut instance = NodeInstance::new(Arc::clone(template)).with_name(node.name);
        instance.location = node.location;
        instance.extent = node.extent;
        handles.insert(node.handle, graph.add_node(instance));
    }

    let resolve = |noodlet: &Noodlet| -> Result<Noodlet> {
        handles
            .get(&noodlet.node)
            .map(|&h| noodlet.with_node(h))
            .ok_or_else(|| GraphError::malformed(format!("unknown node {}", noodlet.node)))
    };
    let link_count = document.links.len();
    for link in &document.links {
        let (from, to) = (resolve(&link.from)?, resolve(&link.to)?);
        graph
            .add_link(from, to)
            .map_err(|e| GraphError::malformed(e.to_string()))?;
    }

    graph
        .check_consistency()
        .map_err(|e| GraphError::malformed(e.to_string()))?;

    graph.report(GraphDiagnostic::SessionLoaded {
        nodes: graph.len(),
        links: link_count,
    });
    Ok(graph)
}
