use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::algorithm::TargetFn;
use crate::graph::{Edge, Graph};
use crate::heuristic::Heuristic;

/// IDA*: iterative deepening over a cost bound.
///
/// Each iteration runs a depth-first search on an explicit stack, cutting
/// off branches whose `g + h` exceeds the current bound; the cheapest
/// cut-off cost becomes the next bound. Cycles are avoided by walking the
/// ancestor chain of the node being expanded rather than by a visited set,
/// so memory stays proportional to the search depth. Optimal for
/// consistent heuristics; with the [`zero`](crate::zero) heuristic this is
/// an iterative cost-bounded DFS.
pub struct IdaStar<G: Graph, H> {
    graph: G,
    heuristic: H,
    target: Option<TargetFn<G::Node>>,
}

impl<G, H> IdaStar<G, H>
where
    G: Graph,
    H: Heuristic<G::Node>,
{
    /// Constructs the engine. Nodes whose heuristic evaluates to zero are
    /// targets.
    pub fn new(graph: G, heuristic: H) -> Self {
        IdaStar {
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

    /// Like [`IdaStar::run`], invoking `on_visit` with every node cleared
    /// against the cost bound.
    pub fn run_with<F>(&self, start: G::Node, mut on_visit: F) -> Option<Vec<Edge<G::Node>>>
    where
        F: FnMut(&G::Node),
    {
        let mut bound = self.heuristic.eval(&start);
        if !bound.is_finite() {
            return None;
        }
        let mut stack: Vec<Rc<IdaNode<G::Node>>> = Vec::new();
        loop {
            let mut next_bound = f64::INFINITY;
            stack.push(Rc::new(IdaNode {
                parent: None,
                edge: None,
                value: start.clone(),
                g: 0.0,
            }));
            while let Some(current) = stack.pop() {
                let h = self.heuristic.eval(&current.value);
                let f = current.g + h;
                if f > bound {
                    if f < next_bound {
                        next_bound = f;
                    }
                    continue;
                }
                on_visit(&current.value);
                let found = match &self.target {
                    Some(target) => target(&current.value),
                    None => h == 0.0,
                };
                if found {
                    return Some(current.path());
                }
                for edge in self.graph.outgoing_edges(&current.value) {
                    if !current.has_in_path(&edge.destination) {
                        stack.push(Rc::new(IdaNode {
                            parent: Some(current.clone()),
                            g: current.g + edge.weight,
                            value: edge.destination.clone(),
                            edge: Some(edge),
                        }));
                    }
                }
            }
            if next_bound.is_infinite() {
                return None;
            }
            debug!(bound = next_bound, "deepening cost bound");
            bound = next_bound;
        }
    }
}

impl<G, H> fmt::Debug for IdaStar<G, H>
where
    G: Graph + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdaStar")
            .field("graph", &self.graph)
            .field("has_target", &self.target.is_some())
            .finish()
    }
}

/// A lineage record on the depth-first stack. Dropping the last stack or
/// child reference frees the chain up to the nearest live ancestor, which
/// keeps memory proportional to the live stack.
struct IdaNode<N> {
    parent: Option<Rc<IdaNode<N>>>,
    edge: Option<Edge<N>>,
    value: N,
    g: f64,
}

impl<N: Clone + Eq> IdaNode<N> {
    fn has_in_path(&self, value: &N) -> bool {
        let mut current = Some(self);
        while let Some(node) = current {
            if node.value == *value {
                return true;
            }
            current = node.parent.as_deref();
        }
        false
    }

    fn path(&self) -> Vec<Edge<N>> {
        let mut edges = Vec::new();
        let mut current = Some(self);
        while let Some(node) = current {
            if let Some(edge) = &node.edge {
                edges.push(edge.clone());
            }
            current = node.parent.as_deref();
        }
        edges.reverse();
        edges
    }
}
