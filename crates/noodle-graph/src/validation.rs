//! Consistency checks for live graphs and session documents
//!
//! Both checks return every problem found, not just the first.

use std::collections::{HashMap, HashSet};

use crate::graph::Graph;
use crate::registry::TemplateRegistry;
use crate::session::SessionDocument;
use crate::types::{Direction, NodeHandle, Noodlet};

/// Validation error with location context
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// An adjacency key names a node that is gone or a connector its
    /// template does not declare in that direction
    StrayEntry { noodlet: Noodlet, direction: Direction },
    /// A declared connector of a live node has no adjacency entry
    MissingEntry { noodlet: Noodlet, direction: Direction },
    /// A link end refers to a node that is not in the graph
    DanglingLink { from: Noodlet, to: Noodlet },
    /// A link is recorded in one adjacency map but not the other
    AsymmetricLink {
        from: Noodlet,
        to: Noodlet,
        recorded_on: Direction,
    },
    /// Two document nodes share a handle
    DuplicateHandle { handle: NodeHandle },
    /// A document node uses a template the registry does not know
    UnknownTemplate { handle: NodeHandle, template: String },
    /// A document link names a handle with no node
    UnknownNode { handle: NodeHandle },
    /// A document link names a connector the node does not declare
    UndeclaredConnector { noodlet: Noodlet, direction: Direction },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrayEntry { noodlet, direction } => {
                write!(f, "Stray {} entry for '{}'", direction, noodlet)
            }
            Self::MissingEntry { noodlet, direction } => {
                write!(f, "Declared {} '{}' has no adjacency entry", direction, noodlet)
            }
            Self::DanglingLink { from, to } => {
                write!(f, "Link '{}' -> '{}' refers to a missing node", from, to)
            }
            Self::AsymmetricLink {
                from,
                to,
                recorded_on,
            } => {
                write!(
                    f,
                    "Link '{}' -> '{}' is only recorded on the {} side",
                    from, to, recorded_on
                )
            }
            Self::DuplicateHandle { handle } => write!(f, "Duplicate node handle {}", handle),
            Self::UnknownTemplate { handle, template } => {
                write!(f, "Unknown template '{}' for node {}", template, handle)
            }
            Self::UnknownNode { handle } => write!(f, "Link references unknown node {}", handle),
            Self::UndeclaredConnector { noodlet, direction } => {
                write!(f, "Node {} declares no {} '{}'", noodlet.node, direction, noodlet.connector)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate the adjacency invariants of a live graph
///
/// Checks that both maps carry exactly the declared connectors of live
/// nodes, that every link end is live, and that the maps mirror each other.
pub fn validate_graph(graph: &Graph) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    validate_entries(graph, Direction::Output, &mut errors);
    validate_entries(graph, Direction::Input, &mut errors);
    validate_mirror(graph, &mut errors);

    errors
}

/// Check that the keys of one adjacency map are exactly the declared
/// connectors of live nodes
fn validate_entries(graph: &Graph, direction: Direction, errors: &mut Vec<ValidationError>) {
    let adjacency = match direction {
        Direction::Output => &graph.links,
        Direction::Input => &graph.inverse_links,
    };

    for noodlet in adjacency.keys() {
        let declared = graph
            .node(noodlet.node)
            .is_some_and(|n| n.template().declares(&noodlet.connector, direction));
        if !declared {
            errors.push(ValidationError::StrayEntry {
                noodlet: noodlet.clone(),
                direction,
            });
        }
    }

    for (handle, node) in graph.all_nodes() {
        let names = match direction {
            Direction::Output => node.output_noodlets(),
            Direction::Input => node.input_noodlets(),
        };
        for name in names {
            let noodlet = Noodlet::new(handle, name.as_str());
            if !adjacency.contains_key(&noodlet) {
                errors.push(ValidationError::MissingEntry { noodlet, direction });
            }
        }
    }
}

/// Check that every link is live and recorded on both sides
fn validate_mirror(graph: &Graph, errors: &mut Vec<ValidationError>) {
    for (from, targets) in &graph.links {
        for to in targets {
            if !graph.contains(from.node) || !graph.contains(to.node) {
                errors.push(ValidationError::DanglingLink {
                    from: from.clone(),
                    to: to.clone(),
                });
            }
            let mirrored = graph
                .inverse_links
                .get(to)
                .is_some_and(|sources| sources.contains(from));
            if !mirrored {
                errors.push(ValidationError::AsymmetricLink {
                    from: from.clone(),
                    to: to.clone(),
                    recorded_on: Direction::Output,
                });
            }
        }
    }

    for (to, sources) in &graph.inverse_links {
        for from in sources {
            if !graph.has_link(from, to) {
                if !graph.contains(from.node) || !graph.contains(to.node) {
                    errors.push(ValidationError::DanglingLink {
                        from: from.clone(),
                        to: to.clone(),
                    });
                }
                errors.push(ValidationError::AsymmetricLink {
                    from: from.clone(),
                    to: to.clone(),
                    recorded_on: Direction::Input,
                });
            }
        }
    }
}

/// Validate a session document against a template registry
///
/// Checks handle uniqueness, template names, and that every link joins an
/// output declared by its source node to an input declared by its target.
pub fn validate_document(
    document: &SessionDocument,
    registry: &TemplateRegistry,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut seen: HashSet<NodeHandle> = HashSet::new();
    let mut templates: HashMap<NodeHandle, &str> = HashMap::new();
    for node in &document.nodes {
        if !seen.insert(node.handle) {
            errors.push(ValidationError::DuplicateHandle {
                handle: node.handle,
            });
            continue;
        }
        if registry.has_template(&node.template) {
            templates.insert(node.handle, &node.template);
        } else {
            errors.push(ValidationError::UnknownTemplate {
                handle: node.handle,
                template: node.template.clone(),
            });
        }
    }

    for link in &document.links {
        for (noodlet, direction) in [(&link.from, Direction::Output), (&link.to, Direction::Input)] {
            if !seen.contains(&noodlet.node) {
                errors.push(ValidationError::UnknownNode {
                    handle: noodlet.node,
                });
                continue;
            }
            // Nodes with unknown templates were already reported
            let Some(template) = templates.get(&noodlet.node).and_then(|t| registry.get(t)) else {
                continue;
            };
            if !template.declares(&noodlet.connector, direction) {
                errors.push(ValidationError::UndeclaredConnector {
                    noodlet: noodlet.clone(),
                    direction,
                });
            }
        }
    }

    errors
}
