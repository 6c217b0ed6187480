//! A graph shared between threads
//!
//! All three maps of a [`Graph`] change together, so the whole graph sits
//! behind one exclusive lock rather than finer-grained locking.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::graph::Graph;

/// Cloneable handle to a graph behind a single mutex
#[derive(Debug, Clone, Default)]
pub struct SharedGraph {
    inner: Arc<Mutex<Graph>>,
}

impl SharedGraph {
    /// Wrap a graph
    pub fn new(graph: Graph) -> Self {
        Self {
            inner: Arc::new(Mutex::new(graph)),
        }
    }

    /// Lock the graph for exclusive access
    pub fn lock(&self) -> MutexGuard<'_, Graph> {
        self.inner.lock()
    }

    /// Run `f` with exclusive access to the graph
    pub fn with<R>(&self, f: impl FnOnce(&mut Graph) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Take a copy of the current graph
    pub fn snapshot(&self) -> Graph {
        self.inner.lock().clone()
    }
}

impl From<Graph> for SharedGraph {
    fn from(graph: Graph) -> Self {
        Self::new(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::adder_template;
    use crate::types::Noodlet;

    #[test]
    fn test_concurrent_edits() {
        let shared = SharedGraph::new(Graph::new());
        let template = Arc::new(adder_template());
        let target = shared.with(|g| g.add_node(template.instantiate()));

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                let template = Arc::clone(&template);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        shared.with(|g| {
                            let h = g.add_node(template.instantiate());
                            g.add_link(Noodlet::new(h, "sum"), Noodlet::new(target, "value-1"))
                                .unwrap();
                        });
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let graph = shared.snapshot();
        assert_eq!(graph.len(), 101);
        assert_eq!(graph.links_to(&Noodlet::new(target, "value-1")).unwrap().len(), 100);
        graph.check_consistency().unwrap();
    }
}
