//! Sample templates and workflows
//!
//! Small, fully wired graphs for demos and tests.

use std::sync::Arc;

use crate::builder::GraphBuilder;
use crate::error::Result;
use crate::graph::Graph;
use crate::types::{NodeTemplate, Point};

/// Canvas positions of the five adders in [`adder_workflow`]
pub const ADDER_LOCATIONS: [Point; 5] = [
    (50.0, 50.0),
    (50.0, 350.0),
    (400.0, 200.0),
    (750.0, 50.0),
    (750.0, 350.0),
];

/// A node adding two values
pub fn adder_template() -> NodeTemplate {
    NodeTemplate::new("Adder", ["value-1", "value-2"], ["sum"])
}

/// Five adders, the first two feeding the third, which feeds the fourth
///
/// Nodes are named `"Adder {handle}"`.
pub fn adder_workflow() -> Result<Graph> {
    let template = Arc::new(adder_template());
    let mut builder = GraphBuilder::new();

    // A fresh graph hands out handles 0, 1, 2, ... in insertion order
    for (i, location) in ADDER_LOCATIONS.into_iter().enumerate() {
        builder = builder
            .add_node(i.to_string(), Arc::clone(&template), location)
            .with_name(format!("Adder {}", i));
    }

    let (graph, _) = builder
        .add_link("0", "sum", "2", "value-1")
        .add_link("1", "sum", "2", "value-2")
        .add_link("2", "sum", "3", "value-1")
        .build()?;
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Noodlet;

    #[test]
    fn test_adder_workflow() {
        let graph = adder_workflow().unwrap();
        assert_eq!(graph.len(), 5);
        assert_eq!(graph.link_count(), 3);

        let (handle, node) = graph.find_by_name("Adder 2").unwrap();
        assert_eq!(handle, 2);
        assert_eq!(node.location, Some((400.0, 200.0)));

        let feeding = graph.links_to(&Noodlet::new(2, "value-2")).unwrap();
        assert!(feeding.contains(&Noodlet::new(1, "sum")));
        assert!(graph.links_from(&Noodlet::new(4, "sum")).unwrap().is_empty());
    }
}
