use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::graph::Graph;
use crate::heuristic::Heuristic;

/// Steepest descent on the heuristic gradient, with a bounded budget of
/// plateau ("side") moves.
///
/// Each step evaluates the heuristic over all neighbours and keeps the set
/// of minimum-valued ones that do not worsen the current node; a strictly
/// better neighbour discards any equal-valued candidates. One candidate is
/// chosen uniformly at random. The search stops at a node without
/// candidates (a local optimum) or once `max_sides` moves in a row have
/// failed to improve the heuristic. The returned node is not guaranteed to
/// be a global optimum.
pub struct SteepestDescent<G: Graph, H> {
    graph: G,
    heuristic: H,
    supplier: Option<Box<dyn FnMut() -> G::Node + Send>>,
    max_sides: usize,
    rng: StdRng,
}

impl<G, H> SteepestDescent<G, H>
where
    G: Graph,
    H: Heuristic<G::Node>,
{
    pub fn new(graph: G, heuristic: H, max_sides: usize) -> Self {
        SteepestDescent {
            graph,
            heuristic,
            supplier: None,
            max_sides,
            rng: StdRng::from_entropy(),
        }
    }

    /// Installs a supplier of random start nodes for
    /// [`SteepestDescent::run_random`].
    pub fn with_supplier(mut self, supplier: impl FnMut() -> G::Node + Send + 'static) -> Self {
        self.supplier = Some(Box::new(supplier));
        self
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn heuristic(&self) -> &H {
        &self.heuristic
    }

    /// Runs the search from a node produced by the installed supplier.
    ///
    /// # Panics
    ///
    /// Panics when no supplier was installed.
    pub fn run_random(&mut self) -> G::Node {
        let start = self
            .supplier
            .as_mut()
            .expect("no random node supplier installed")();
        self.run(start)
    }

    /// Runs the search from `start` and returns a node that locally
    /// minimises the heuristic.
    pub fn run(&mut self, start: G::Node) -> G::Node {
        self.run_with(start, |_| {})
    }

    /// Like [`SteepestDescent::run`], invoking `on_visit` with the current
    /// node at each step.
    pub fn run_with<F>(&mut self, start: G::Node, mut on_visit: F) -> G::Node
    where
        F: FnMut(&G::Node),
    {
        let mut current = start;
        let mut current_h = self.heuristic.eval(&current);
        let mut sides = 0;
        loop {
            on_visit(&current);
            let previous_h = current_h;
            let mut candidates: Vec<G::Node> = Vec::new();
            for edge in self.graph.outgoing_edges(&current) {
                let h = self.heuristic.eval(&edge.destination);
                if h <= current_h {
                    if h < current_h {
                        current_h = h;
                        candidates.clear();
                    }
                    candidates.push(edge.destination);
                }
            }
            if candidates.is_empty() {
                return current;
            }
            let pick = self.rng.gen_range(0..candidates.len());
            current = candidates.swap_remove(pick);
            trace!(h = current_h, "moved to neighbour");
            if current_h == previous_h {
                sides += 1;
                if sides >= self.max_sides {
                    return current;
                }
            }
        }
    }
}

impl<G, H> fmt::Debug for SteepestDescent<G, H>
where
    G: Graph + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SteepestDescent")
            .field("graph", &self.graph)
            .field("max_sides", &self.max_sides)
            .field("has_supplier", &self.supplier.is_some())
            .finish()
    }
}
