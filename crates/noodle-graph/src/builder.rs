//! Fluent builder for noodle graphs
//!
//! Lets graphs be assembled by local labels instead of handles.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{GraphError, Result};
use crate::events::DiagnosticSink;
use crate::graph::Graph;
use crate::types::{Extent, NodeHandle, NodeInstance, NodeTemplate, Noodlet, Point};

/// Fluent builder for constructing graphs
///
/// # Example
///
/// ```ignore
/// let adder = Arc::new(NodeTemplate::new("Adder", ["value-1", "value-2"], ["sum"]));
/// let (graph, handles) = GraphBuilder::new()
///     .add_node("a", adder.clone(), (50.0, 50.0))
///     .add_node("b", adder.clone(), (400.0, 200.0))
///     .with_name("Total")
///     .add_link("a", "sum", "b", "value-1")
///     .build()?;
/// ```
#[derive(Default)]
pub struct GraphBuilder {
    nodes: Vec<(String, NodeInstance)>,
    links: Vec<(String, String, String, String)>,
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl GraphBuilder {
    /// Create a new graph builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Report diagnostics of the built graph to `sink`
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Add a node under a builder-local label
    pub fn add_node(
        mut self,
        label: impl Into<String>,
        template: Arc<NodeTemplate>,
        location: Point,
    ) -> Self {
        self.nodes
            .push((label.into(), template.instantiate().with_location(location)));
        self
    }

    /// Set the name of the most recently added node
    ///
    /// Must be called immediately after `add_node`.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        if let Some((_, node)) = self.nodes.last_mut() {
            node.name = name.into();
        }
        self
    }

    /// Set the extent of the most recently added node
    pub fn with_extent(mut self, extent: Extent) -> Self {
        if let Some((_, node)) = self.nodes.last_mut() {
            node.extent = Some(extent);
        }
        self
    }

    /// Link an output of one labelled node to an input of another
    pub fn add_link(
        mut self,
        from: impl Into<String>,
        output: impl Into<String>,
        to: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        self.links
            .push((from.into(), output.into(), to.into(), input.into()));
        self
    }

    /// Build the graph
    ///
    /// Returns the graph and the handle assigned to each label. Fails with
    /// `NotFound` for a link naming an unknown label and `UnknownConnector`
    /// for a connector the node does not declare.
    pub fn build(self) -> Result<(Graph, HashMap<String, NodeHandle>)> {
        let mut graph = match self.sink {
            Some(sink) => Graph::with_sink(sink),
            None => Graph::new(),
        };

        let mut handles = HashMap::new();
        for (label, node) in self.nodes {
            handles.insert(label, graph.add_node(node));
        }

        let lookup = |label: &str| {
            handles
                .get(label)
                .copied()
                .ok_or_else(|| GraphError::not_found(format!("node label '{}'", label)))
        };
        for (from, output, to, input) in self.links {
            let source = Noodlet::new(lookup(&from)?, output);
            let target = Noodlet::new(lookup(&to)?, input);
            graph.add_link(source, target)?;
        }

        Ok((graph, handles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::adder_template;

    #[test]
    fn test_build_graph() {
        let adder = Arc::new(adder_template());
        let (graph, handles) = GraphBuilder::new()
            .add_node("a", adder.clone(), (0.0, 0.0))
            .with_name("First")
            .add_node("b", adder.clone(), (100.0, 0.0))
            .with_extent((80.0, 40.0))
            .add_link("a", "sum", "b", "value-1")
            .add_link("a", "sum", "b", "value-2")
            .build()
            .unwrap();

        let (a, b) = (handles["a"], handles["b"]);
        assert_eq!(graph.node(a).unwrap().name, "First");
        assert_eq!(graph.node(b).unwrap().extent, Some((80.0, 40.0)));
        assert_eq!(graph.link_count(), 2);
        assert!(graph.has_link(&Noodlet::new(a, "sum"), &Noodlet::new(b, "value-2")));
    }

    #[test]
    fn test_unknown_label() {
        let err = GraphBuilder::new()
            .add_node("a", Arc::new(adder_template()), (0.0, 0.0))
            .add_link("a", "sum", "missing", "value-1")
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::NotFound(_)));
    }

    #[test]
    fn test_unknown_connector() {
        let adder = Arc::new(adder_template());
        let err = GraphBuilder::new()
            .add_node("a", adder.clone(), (0.0, 0.0))
            .add_node("b", adder, (0.0, 0.0))
            .add_link("a", "sum", "b", "value-3")
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::UnknownConnector(_)));
    }
}
