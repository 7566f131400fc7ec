use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::algorithm::{PathTree, TargetFn};
use crate::errors::{Result, SearchError};
use crate::graph::{Edge, Graph};
use crate::heap::{FibonacciHeap, Handle};
use crate::heuristic::Heuristic;

const NAN_KEY: &str = "graph weights and heuristic estimates must not be NaN";

/// A* and its relatives, selected by the construction parameters.
///
/// With a non-trivial heuristic this is A*; with [`zero`](crate::zero) and a
/// target predicate it is Dijkstra's algorithm; with a heuristic multiplier
/// above 1 it is weighted A*, trading optimality for speed. The frontier is
/// a [`FibonacciHeap`] keyed by `g + h * h_mul`, and rediscovering a cheaper
/// route to an open node lowers its key in place.
pub struct MinCost<G: Graph, H> {
    graph: G,
    heuristic: H,
    target: Option<TargetFn<G::Node>>,
    h_mul: f64,
}

impl<G, H> MinCost<G, H>
where
    G: Graph,
    H: Heuristic<G::Node>,
{
    /// Constructs the engine with the plain A* behaviour. Nodes whose
    /// heuristic evaluates to zero are targets.
    pub fn new(graph: G, heuristic: H) -> Self {
        MinCost {
            graph,
            heuristic,
            target: None,
            h_mul: 1.0,
        }
    }

    /// Constructs the engine with the heuristic scaled by `h_mul`.
    ///
    /// Rejects multipliers below 1. With a consistent heuristic the
    /// returned path cost does not exceed `h_mul` times the optimum;
    /// consistency itself is the caller's responsibility and is not
    /// checked.
    pub fn with_multiplier(graph: G, heuristic: H, h_mul: f64) -> Result<Self> {
        if !(h_mul >= 1.0) {
            return Err(SearchError::InvalidMultiplier(h_mul));
        }
        Ok(MinCost {
            graph,
            heuristic,
            target: None,
            h_mul,
        })
    }

    /// Replaces the zero-heuristic target rule with an explicit predicate.
    pub fn with_target(mut self, target: impl Fn(&G::Node) -> bool + Send + Sync + 'static) -> Self {
        self.target = Some(Box::new(target));
        self
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Traverses the graph and returns the edges from `start` to a target
    /// node, or `None` when no target is reachable.
    pub fn run(&self, start: G::Node) -> Option<Vec<Edge<G::Node>>> {
        self.run_with(start, |_| {})
    }

    /// Like [`MinCost::run`], invoking `on_visit` with every node as it is
    /// popped from the frontier.
    pub fn run_with<F>(&self, start: G::Node, mut on_visit: F) -> Option<Vec<Edge<G::Node>>>
    where
        F: FnMut(&G::Node),
    {
        let mut frontier = FibonacciHeap::new();
        let mut tree = PathTree::new();
        let mut known: HashMap<G::Node, OpenNode> = HashMap::new();
        let mut expanded = 0u64;

        let h = self.heuristic.eval(&start);
        let handle = frontier.insert(0.0, start.clone()).expect(NAN_KEY);
        let root = tree.root();
        known.insert(
            start,
            OpenNode {
                lineage: root,
                g: 0.0,
                h,
                handle: Some(handle),
            },
        );

        while let Some((_, current)) = frontier.extract_min() {
            let (lineage, g, h) = {
                let node = known
                    .get_mut(&current)
                    .expect("every frontier value has a known-nodes entry");
                node.handle = None;
                (node.lineage, node.g, node.h)
            };
            expanded += 1;
            on_visit(&current);
            let found = match &self.target {
                Some(target) => target(&current),
                None => h == 0.0,
            };
            if found {
                debug!(expanded, "target reached");
                return Some(tree.path(lineage));
            }

            for edge in self.graph.outgoing_edges(&current) {
                let g = g + edge.weight;
                match known.entry(edge.destination.clone()) {
                    Entry::Vacant(slot) => {
                        let h = self.heuristic.eval(&edge.destination);
                        let handle = frontier
                            .insert(g + h * self.h_mul, edge.destination.clone())
                            .expect(NAN_KEY);
                        let lineage = tree.insert(lineage, edge);
                        slot.insert(OpenNode {
                            lineage,
                            g,
                            h,
                            handle: Some(handle),
                        });
                    }
                    Entry::Occupied(mut slot) => {
                        let node = slot.get_mut();
                        // Expanded nodes have a cleared handle and are
                        // settled; open nodes relax to the cheaper route.
                        if let Some(handle) = node.handle {
                            if g < node.g {
                                node.g = g;
                                frontier
                                    .decrease_key(&handle, g + node.h * self.h_mul)
                                    .expect(NAN_KEY);
                                tree.relink(node.lineage, lineage, edge);
                            }
                        }
                    }
                }
            }
        }
        debug!(expanded, "frontier exhausted without reaching a target");
        None
    }
}

impl<G, H> fmt::Debug for MinCost<G, H>
where
    G: Graph + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinCost")
            .field("graph", &self.graph)
            .field("h_mul", &self.h_mul)
            .field("has_target", &self.target.is_some())
            .finish()
    }
}

#[derive(Debug)]
struct OpenNode {
    lineage: usize,
    g: f64,
    h: f64,
    handle: Option<Handle>,
}
