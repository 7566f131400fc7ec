use std::collections::HashMap;
use std::fmt;

use crate::algorithm::{PathTree, TargetFn};
use crate::graph::{Edge, Graph};
use crate::heap::FibonacciHeap;
use crate::heuristic::Heuristic;

const NAN_KEY: &str = "heuristic estimates must not be NaN";

/// Greedy best-first search.
///
/// The frontier is keyed by the heuristic alone, so the engine always
/// expands the node that looks closest to a target. Each node enters the
/// known set exactly once and is never relaxed; rediscoveries are ignored.
/// The returned path is valid but carries no optimality guarantee.
pub struct GreedyBestFirst<G: Graph, H> {
    graph: G,
    heuristic: H,
    target: Option<TargetFn<G::Node>>,
}

impl<G, H> GreedyBestFirst<G, H>
where
    G: Graph,
    H: Heuristic<G::Node>,
{
    /// Constructs the engine. Nodes whose heuristic evaluates to zero are
    /// targets.
    pub fn new(graph: G, heuristic: H) -> Self {
        GreedyBestFirst {
            graph,
            heuristic,
            target: None,
        }
    }

    /// Replaces the zero-heuristic target rule with an explicit predicate.
    pub fn with_target(mut self, target: impl Fn(&G::Node) -> bool + Send + Sync + 'static) -> Self {
        self.target = Some(Box::new(target));
        self
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn run(&self, start: G::Node) -> Option<Vec<Edge<G::Node>>> {
        self.run_with(start, |_| {})
    }

    pub fn run_with<F>(&self, start: G::Node, mut on_visit: F) -> Option<Vec<Edge<G::Node>>>
    where
        F: FnMut(&G::Node),
    {
        let mut frontier = FibonacciHeap::new();
        let mut tree = PathTree::new();
        let mut known: HashMap<G::Node, KnownNode> = HashMap::new();

        let h = self.heuristic.eval(&start);
        frontier.insert(h, start.clone()).expect(NAN_KEY);
        let root = tree.root();
        known.insert(start, KnownNode { lineage: root, h });

        while let Some((_, current)) = frontier.extract_min() {
            let node = &known[&current];
            let (lineage, h) = (node.lineage, node.h);
            on_visit(&current);
            let found = match &self.target {
                Some(target) => target(&current),
                None => h == 0.0,
            };
            if found {
                return Some(tree.path(lineage));
            }
            for edge in self.graph.outgoing_edges(&current) {
                if !known.contains_key(&edge.destination) {
                    let h = self.heuristic.eval(&edge.destination);
                    frontier.insert(h, edge.destination.clone()).expect(NAN_KEY);
                    let lineage = tree.insert(lineage, edge.clone());
                    known.insert(edge.destination, KnownNode { lineage, h });
                }
            }
        }
        None
    }
}

impl<G, H> fmt::Debug for GreedyBestFirst<G, H>
where
    G: Graph + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreedyBestFirst")
            .field("graph", &self.graph)
            .field("has_target", &self.target.is_some())
            .finish()
    }
}

#[derive(Debug)]
struct KnownNode {
    lineage: usize,
    h: f64,
}
