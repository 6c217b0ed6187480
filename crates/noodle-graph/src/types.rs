//! Core types for noodle graphs
//!
//! These types describe node kinds (templates), placed nodes (instances)
//! and references to their named connectors ("noodlets").

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Integer handle of a node inside a [`Graph`](crate::Graph)
///
/// Handles come from a monotonic counter and are never reused while the
/// graph is live, so a stale handle simply fails to resolve.
pub type NodeHandle = usize;

/// 2D canvas coordinate (x, y)
pub type Point = (f64, f64);

/// 2D rendered size (width, height)
pub type Extent = (f64, f64);

/// Reference to one connector of one node
///
/// Connector names are scoped to their node: a name need only be unique
/// within a node's inputs and, separately, within its outputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Noodlet {
    /// Handle of the owning node
    pub node: NodeHandle,
    /// Connector name as declared by the node's template
    pub connector: String,
}

impl Noodlet {
    /// Create a noodlet reference
    pub fn new(node: NodeHandle, connector: impl Into<String>) -> Self {
        Self {
            node,
            connector: connector.into(),
        }
    }

    /// The same connector name on another node
    pub(crate) fn with_node(&self, node: NodeHandle) -> Self {
        Self {
            node,
            connector: self.connector.clone(),
        }
    }
}

impl fmt::Display for Noodlet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.connector)
    }
}

/// Which side of a node a connector sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Receives links
    Input,
    /// Feeds links
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Output => write!(f, "output"),
        }
    }
}

/// Describes a node kind: its label and declared connectors
///
/// Templates are immutable once built and shared between instances
/// through `Arc`. The only constructor is [`NodeTemplate::new`], so the
/// connector lists are always duplicate-free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTemplate {
    name: String,
    input_vars: Vec<String>,
    output_vars: Vec<String>,
}

impl NodeTemplate {
    /// Create a template
    ///
    /// Repeated connector names are dropped, keeping the first occurrence.
    pub fn new<I, O>(name: impl Into<String>, inputs: I, outputs: O) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        Self {
            name: name.into(),
            input_vars: ordered_set(inputs),
            output_vars: ordered_set(outputs),
        }
    }

    /// Kind label (e.g., "Adder")
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered, duplicate-free input connector names
    pub fn input_vars(&self) -> &[String] {
        &self.input_vars
    }

    /// Ordered, duplicate-free output connector names
    pub fn output_vars(&self) -> &[String] {
        &self.output_vars
    }

    /// Check if the template declares an input connector
    pub fn has_input(&self, name: &str) -> bool {
        self.input_vars.iter().any(|v| v == name)
    }

    /// Check if the template declares an output connector
    pub fn has_output(&self, name: &str) -> bool {
        self.output_vars.iter().any(|v| v == name)
    }

    /// Check if the template declares a connector in the given direction
    pub fn declares(&self, name: &str, direction: Direction) -> bool {
        match direction {
            Direction::Input => self.has_input(name),
            Direction::Output => self.has_output(name),
        }
    }

    /// Create an unplaced node of this kind with a generated name
    pub fn instantiate(self: &Arc<Self>) -> NodeInstance {
        NodeInstance::new(Arc::clone(self))
    }
}

fn ordered_set<I>(items: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let item = item.into();
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// A placed node
///
/// The graph owns instances through their handle; renderers borrow them.
#[derive(Debug, Clone)]
pub struct NodeInstance {
    /// Display name, unique by convention only
    pub name: String,
    /// Position on the canvas, `None` until placed
    pub location: Option<Point>,
    /// Rendered size, filled in by the renderer
    pub extent: Option<Extent>,
    template: Arc<NodeTemplate>,
}

impl NodeInstance {
    /// Create an unplaced node named `"{template} {suffix}"`
    pub fn new(template: Arc<NodeTemplate>) -> Self {
        let suffix = Uuid::new_v4().as_u128() as u64;
        Self {
            name: format!("{} {:016X}", template.name, suffix),
            location: None,
            extent: None,
            template,
        }
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the location
    pub fn with_location(mut self, location: Point) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the extent
    pub fn with_extent(mut self, extent: Extent) -> Self {
        self.extent = Some(extent);
        self
    }

    /// The template this node was created from
    pub fn template(&self) -> &Arc<NodeTemplate> {
        &self.template
    }

    /// Input connector names
    pub fn input_noodlets(&self) -> &[String] {
        &self.template.input_vars
    }

    /// Output connector names
    pub fn output_noodlets(&self) -> &[String] {
        &self.template.output_vars
    }
}

/// Two instances are equal when they share the same template (by
/// identity) and have the same name, location and extent.
impl PartialEq for NodeInstance {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.template, &other.template)
            && self.name == other.name
            && self.location == other.location
            && self.extent == other.extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_deduplicates_connectors() {
        let template = NodeTemplate::new("Mix", ["a", "b", "a"], ["out", "out"]);
        assert_eq!(template.input_vars(), ["a", "b"]);
        assert_eq!(template.output_vars(), ["out"]);
        assert!(template.declares("b", Direction::Input));
        assert!(!template.declares("b", Direction::Output));
    }

    #[test]
    fn test_instantiate_generates_name() {
        let template = Arc::new(NodeTemplate::new("Adder", ["value-1"], ["sum"]));
        let a = template.instantiate();
        let b = template.instantiate();

        assert!(a.name.starts_with("Adder "));
        assert_eq!(a.name.len(), "Adder ".len() + 16);
        assert_ne!(a.name, b.name);
        assert!(a.location.is_none());
        assert!(a.extent.is_none());
        assert_eq!(a.input_noodlets(), ["value-1"]);
        assert_eq!(a.output_noodlets(), ["sum"]);
    }

    #[test]
    fn test_instance_equality_uses_template_identity() {
        let first = Arc::new(NodeTemplate::new("Adder", ["value-1"], ["sum"]));
        let twin = Arc::new(NodeTemplate::new("Adder", ["value-1"], ["sum"]));
        assert_eq!(*first, *twin);

        let a = first.instantiate().with_name("A").with_location((1.0, 2.0));
        let same = first.instantiate().with_name("A").with_location((1.0, 2.0));
        let other = twin.instantiate().with_name("A").with_location((1.0, 2.0));

        assert_eq!(a, same);
        assert_ne!(a, other);
        assert_ne!(a, same.clone().with_extent((5.0, 5.0)));
    }

    #[test]
    fn test_noodlet_display_and_order() {
        let a = Noodlet::new(1, "sum");
        let b = Noodlet::new(0, "sum");
        assert_eq!(a.to_string(), "1.sum");
        assert!(b < a);
    }
}
