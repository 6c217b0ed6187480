//! The workflow data model
//!
//! A [`Graph`] owns its nodes, keyed by integer handle, and the directed
//! links between their noodlets. Links are stored twice: `links` maps every
//! output noodlet to the inputs it feeds, `inverse_links` maps every input
//! noodlet to the outputs feeding it. Both maps carry an entry for every
//! declared connector of every live node, even when the set is empty, so
//! forward and reverse lookups are a single hash lookup.
//!
//! Every mutation checks its preconditions before touching any map. A
//! failed call leaves the graph exactly as it was.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::error::{GraphError, Result};
use crate::events::{DiagnosticSink, GraphDiagnostic, LogSink};
use crate::types::{NodeHandle, NodeInstance, Noodlet};
use crate::validation::validate_graph;

/// Adjacency from one noodlet to a set of noodlets
pub(crate) type Adjacency = HashMap<Noodlet, HashSet<Noodlet>>;

/// Directed graph of nodes and noodlet links
#[derive(Clone)]
pub struct Graph {
    counter: NodeHandle,
    pub(crate) nodes: BTreeMap<NodeHandle, NodeInstance>,
    pub(crate) links: Adjacency,
    pub(crate) inverse_links: Adjacency,
    sink: Arc<dyn DiagnosticSink>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("counter", &self.counter)
            .field("nodes", &self.nodes)
            .field("links", &self.links)
            .field("inverse_links", &self.inverse_links)
            .finish_non_exhaustive()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Create an empty graph reporting diagnostics to the `log` facade
    pub fn new() -> Self {
        Self::with_sink(Arc::new(LogSink))
    }

    /// Create an empty graph reporting diagnostics to `sink`
    pub fn with_sink(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            counter: 0,
            nodes: BTreeMap::new(),
            links: HashMap::new(),
            inverse_links: HashMap::new(),
            sink,
        }
    }

    /// The diagnostics sink
    pub fn sink(&self) -> &Arc<dyn DiagnosticSink> {
        &self.sink
    }

    pub(crate) fn report(&self, diagnostic: GraphDiagnostic) {
        self.sink.report(diagnostic);
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check if a handle refers to a live node
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(&handle)
    }

    /// The handle the next `add_node` will return
    pub fn next_handle(&self) -> NodeHandle {
        self.counter
    }

    /// Get a node by handle
    pub fn node(&self, handle: NodeHandle) -> Option<&NodeInstance> {
        self.nodes.get(&handle)
    }

    /// Get a node by handle (mutable)
    ///
    /// Only the name, location and extent can change; the template, and
    /// with it the connector set, is fixed.
    pub fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut NodeInstance> {
        self.nodes.get_mut(&handle)
    }

    /// Find the first node with the given name (linear search)
    pub fn find_by_name(&self, name: &str) -> Option<(NodeHandle, &NodeInstance)> {
        self.all_nodes().find(|(_, n)| n.name == name)
    }

    /// Find the handle of the first node equal to `node`
    pub fn handle_of(&self, node: &NodeInstance) -> Option<NodeHandle> {
        self.all_nodes().find(|(_, n)| *n == node).map(|(h, _)| h)
    }

    /// Iterate over all live nodes in handle order
    ///
    /// The borrow on the graph rules out mutation while iterating; call
    /// again to restart.
    pub fn all_nodes(&self) -> impl Iterator<Item = (NodeHandle, &NodeInstance)> + '_ {
        self.nodes.iter().map(|(&h, n)| (h, n))
    }

    /// Iterate over every link as a (source output, target input) pair
    pub fn all_links(&self) -> impl Iterator<Item = (&Noodlet, &Noodlet)> + '_ {
        self.links
            .iter()
            .flat_map(|(source, targets)| targets.iter().map(move |target| (source, target)))
    }

    /// Total number of links
    pub fn link_count(&self) -> usize {
        self.links.values().map(HashSet::len).sum()
    }

    /// Check if a link exists
    pub fn has_link(&self, source: &Noodlet, target: &Noodlet) -> bool {
        self.links
            .get(source)
            .is_some_and(|targets| targets.contains(target))
    }

    /// The outputs feeding an input noodlet
    pub fn links_to(&self, target: &Noodlet) -> Result<&HashSet<Noodlet>> {
        self.inverse_links
            .get(target)
            .ok_or_else(|| GraphError::not_found(format!("input noodlet {}", target)))
    }

    /// The inputs fed by an output noodlet
    pub fn links_from(&self, source: &Noodlet) -> Result<&HashSet<Noodlet>> {
        self.links
            .get(source)
            .ok_or_else(|| GraphError::not_found(format!("output noodlet {}", source)))
    }

    /// Every link touching a node, inbound and outbound
    pub fn node_links(&self, handle: NodeHandle) -> Result<Vec<(Noodlet, Noodlet)>> {
        let node = self
            .nodes
            .get(&handle)
            .ok_or_else(|| GraphError::not_found(format!("node {}", handle)))?;

        let mut out = Vec::new();
        for name in node.input_noodlets() {
            let target = Noodlet::new(handle, name.as_str());
            for source in self.links_to(&target)? {
                out.push((source.clone(), target.clone()));
            }
        }
        for name in node.output_noodlets() {
            let source = Noodlet::new(handle, name.as_str());
            for target in self.links_from(&source)? {
                // Self-loops were already collected on the input side
                if target.node != handle {
                    out.push((source.clone(), target.clone()));
                }
            }
        }
        out.sort();
        Ok(out)
    }

    /// Register a node and seed empty adjacency entries for its noodlets
    ///
    /// The counter advances unconditionally, so handles are never reused.
    pub fn add_node(&mut self, node: NodeInstance) -> NodeHandle {
        let handle = self.counter;
        self.counter += 1;

        for name in node.output_noodlets() {
            self.links
                .insert(Noodlet::new(handle, name.as_str()), HashSet::new());
        }
        for name in node.input_noodlets() {
            self.inverse_links
                .insert(Noodlet::new(handle, name.as_str()), HashSet::new());
        }

        log::debug!("Added node {} '{}'", handle, node.name);
        self.nodes.insert(handle, node);
        handle
    }

    /// Link an output noodlet to an input noodlet
    ///
    /// Adding an existing link again is a no-op. Returns whether the link
    /// is new.
    pub fn add_link(&mut self, source: Noodlet, target: Noodlet) -> Result<bool> {
        let forward = self
            .links
            .get(&source)
            .ok_or_else(|| GraphError::UnknownConnector(source.clone()))?
            .contains(&target);
        let inverse = self
            .inverse_links
            .get(&target)
            .ok_or_else(|| GraphError::UnknownConnector(target.clone()))?
            .contains(&source);

        match (forward, inverse) {
            (true, true) => return Ok(false),
            (false, false) => {}
            _ => return Err(asymmetric(&source, &target, forward)),
        }

        log::debug!("Linked {} -> {}", source, target);
        if let Some(targets) = self.links.get_mut(&source) {
            targets.insert(target.clone());
        }
        if let Some(sources) = self.inverse_links.get_mut(&target) {
            sources.insert(source);
        }
        Ok(true)
    }

    /// Remove a link from both adjacency maps
    pub fn delete_link(&mut self, source: &Noodlet, target: &Noodlet) -> Result<()> {
        let forward = self
            .links
            .get(source)
            .ok_or_else(|| GraphError::UnknownConnector(source.clone()))?
            .contains(target);
        let inverse = self
            .inverse_links
            .get(target)
            .ok_or_else(|| GraphError::UnknownConnector(target.clone()))?
            .contains(source);

        match (forward, inverse) {
            (true, true) => {}
            (false, false) => {
                return Err(GraphError::EdgeNotFound {
                    from: source.clone(),
                    to: target.clone(),
                })
            }
            _ => return Err(asymmetric(source, target, forward)),
        }

        log::debug!("Unlinked {} -> {}", source, target);
        if let Some(targets) = self.links.get_mut(source) {
            targets.remove(target);
        }
        if let Some(sources) = self.inverse_links.get_mut(target) {
            sources.remove(source);
        }
        Ok(())
    }

    /// Remove every link feeding an input noodlet
    ///
    /// Returns the number of links removed.
    pub fn delete_links_to(&mut self, target: &Noodlet) -> Result<usize> {
        let sources = self.links_to(target)?;
        for source in sources {
            if !self.has_link(source, target) {
                return Err(asymmetric(source, target, false));
            }
        }

        let sources = self
            .inverse_links
            .insert(target.clone(), HashSet::new())
            .unwrap_or_default();
        for source in &sources {
            if let Some(targets) = self.links.get_mut(source) {
                targets.remove(target);
            }
        }
        log::debug!("Removed {} links to {}", sources.len(), target);
        Ok(sources.len())
    }

    /// Delete a node and every link touching it
    pub fn delete_by_handle(&mut self, handle: NodeHandle) -> Result<NodeInstance> {
        let node = self
            .nodes
            .get(&handle)
            .ok_or_else(|| GraphError::not_found(format!("node {}", handle)))?;

        let inputs: Vec<Noodlet> = node
            .input_noodlets()
            .iter()
            .map(|name| Noodlet::new(handle, name.as_str()))
            .collect();
        let outputs: Vec<Noodlet> = node
            .output_noodlets()
            .iter()
            .map(|name| Noodlet::new(handle, name.as_str()))
            .collect();

        self.check_mirrored(&inputs, &outputs)?;

        for target in &inputs {
            for source in self.inverse_links.remove(target).unwrap_or_default() {
                if let Some(targets) = self.links.get_mut(&source) {
                    targets.remove(target);
                }
            }
        }
        for source in &outputs {
            for target in self.links.remove(source).unwrap_or_default() {
                if let Some(sources) = self.inverse_links.get_mut(&target) {
                    sources.remove(source);
                }
            }
        }

        let node = self
            .nodes
            .remove(&handle)
            .ok_or_else(|| GraphError::not_found(format!("node {}", handle)))?;
        log::debug!("Deleted node {} '{}'", handle, node.name);
        Ok(node)
    }

    /// Delete the first node equal to `node`
    pub fn delete_by_reference(&mut self, node: &NodeInstance) -> Result<(NodeHandle, NodeInstance)> {
        let handle = self
            .handle_of(node)
            .ok_or_else(|| GraphError::not_found(format!("node '{}'", node.name)))?;
        let removed = self.delete_by_handle(handle)?;
        Ok((handle, removed))
    }

    /// Delete the first node with the given name
    ///
    /// Lenient: a name that matches nothing is reported to the diagnostics
    /// sink as a warning and returns `Ok(None)`, since UI code may issue
    /// speculative deletes.
    pub fn delete_by_name(&mut self, name: &str) -> Result<Option<(NodeHandle, NodeInstance)>> {
        let Some((handle, _)) = self.find_by_name(name) else {
            self.report(GraphDiagnostic::MissingNodeName {
                name: name.to_string(),
            });
            return Ok(None);
        };
        let removed = self.delete_by_handle(handle)?;
        Ok(Some((handle, removed)))
    }

    /// Renumber handles to the dense range `0..n`, keeping handle order
    ///
    /// Returns the old -> new mapping. Every handle issued before the call
    /// is stale afterwards. The counter is left alone, so handles issued
    /// later still exceed every handle issued before.
    pub fn compact(&mut self) -> Result<HashMap<NodeHandle, NodeHandle>> {
        let mapping = self.dense_mapping();

        let links = remap_adjacency(&self.links, &mapping)?;
        let inverse_links = remap_adjacency(&self.inverse_links, &mapping)?;
        let nodes = std::mem::take(&mut self.nodes)
            .into_iter()
            .map(|(old, node)| (mapping[&old], node))
            .collect();

        self.nodes = nodes;
        self.links = links;
        self.inverse_links = inverse_links;

        log::debug!("Compacted {} node handles", self.nodes.len());
        self.report(GraphDiagnostic::Compacted {
            nodes: self.nodes.len(),
        });
        Ok(mapping)
    }

    /// Old -> new mapping assigning `0..n` in handle order
    pub(crate) fn dense_mapping(&self) -> HashMap<NodeHandle, NodeHandle> {
        self.nodes
            .keys()
            .enumerate()
            .map(|(new, &old)| (old, new))
            .collect()
    }

    /// Verify invariants 1-3, failing on the first violation
    pub fn check_consistency(&self) -> Result<()> {
        match validate_graph(self).into_iter().next() {
            Some(err) => Err(GraphError::corrupt(err.to_string())),
            None => Ok(()),
        }
    }

    /// Every link at the given noodlets must be recorded on both sides
    fn check_mirrored(&self, inputs: &[Noodlet], outputs: &[Noodlet]) -> Result<()> {
        for target in inputs {
            let sources = self
                .inverse_links
                .get(target)
                .ok_or_else(|| GraphError::corrupt(format!("no inverse entry for input {}", target)))?;
            for source in sources {
                if !self.has_link(source, target) {
                    return Err(asymmetric(source, target, false));
                }
            }
        }
        for source in outputs {
            let targets = self
                .links
                .get(source)
                .ok_or_else(|| GraphError::corrupt(format!("no link entry for output {}", source)))?;
            for target in targets {
                let mirrored = self
                    .inverse_links
                    .get(target)
                    .is_some_and(|sources| sources.contains(source));
                if !mirrored {
                    return Err(asymmetric(source, target, true));
                }
            }
        }
        Ok(())
    }
}

fn asymmetric(source: &Noodlet, target: &Noodlet, in_forward: bool) -> GraphError {
    let (present, missing) = if in_forward {
        ("links", "inverse links")
    } else {
        ("inverse links", "links")
    };
    GraphError::corrupt(format!(
        "link {} -> {} is in the {} but not in the {}",
        source, target, present, missing
    ))
}

fn remap_adjacency(
    adjacency: &Adjacency,
    mapping: &HashMap<NodeHandle, NodeHandle>,
) -> Result<Adjacency> {
    let remap = |noodlet: &Noodlet| -> Result<Noodlet> {
        mapping
            .get(&noodlet.node)
            .map(|&node| noodlet.with_node(node))
            .ok_or_else(|| GraphError::corrupt(format!("noodlet {} refers to no node", noodlet)))
    };

    adjacency
        .iter()
        .map(|(key, set)| {
            let set = set.iter().map(&remap).collect::<Result<HashSet<_>>>()?;
            Ok((remap(key)?, set))
        })
        .collect()
}
