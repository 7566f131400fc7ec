//! The pathfinding engines and their common entry point.
//!
//! Every engine consults a [`Graph`] for outgoing edges on demand and
//! returns either an ordered list of edges from the start node to a target
//! node, or `None` when the reachable subgraph holds no target. A node
//! counts as a target when the engine's predicate says so, or, when no
//! predicate was supplied, when the heuristic evaluates to zero for it.

use crate::errors::Result;
use crate::graph::{Edge, Graph};
use crate::heuristic::{zero, Heuristic};

mod bfs;
mod descent;
mod greedy;
mod idastar;
mod mincost;
mod parallel;

pub use bfs::Bfs;
pub use descent::SteepestDescent;
pub use greedy::GreedyBestFirst;
pub use idastar::IdaStar;
pub use mincost::MinCost;
pub use parallel::ParallelIdaStar;

pub(crate) type TargetFn<N> = Box<dyn Fn(&N) -> bool + Send + Sync>;

/// Back-chained lineage records for the frontier-based engines.
///
/// Entries are arena slots holding a parent index and the edge traversed
/// from the parent; a path is materialised by walking parents back to the
/// root and reversing the collected edges. The arena lives for a single
/// `run` invocation.
#[derive(Debug)]
pub(crate) struct PathTree<N> {
    nodes: Vec<TreeNode<N>>,
}

#[derive(Debug)]
struct TreeNode<N> {
    parent: Option<usize>,
    edge: Option<Edge<N>>,
}

impl<N: Clone> PathTree<N> {
    pub(crate) fn new() -> Self {
        PathTree { nodes: Vec::new() }
    }

    /// Adds the lineage entry for the start node.
    pub(crate) fn root(&mut self) -> usize {
        self.nodes.push(TreeNode {
            parent: None,
            edge: None,
        });
        self.nodes.len() - 1
    }

    /// Adds an entry reached from `parent` over `edge`.
    pub(crate) fn insert(&mut self, parent: usize, edge: Edge<N>) -> usize {
        self.nodes.push(TreeNode {
            parent: Some(parent),
            edge: Some(edge),
        });
        self.nodes.len() - 1
    }

    /// Points an existing entry at a cheaper parent.
    pub(crate) fn relink(&mut self, node: usize, parent: usize, edge: Edge<N>) {
        self.nodes[node].parent = Some(parent);
        self.nodes[node].edge = Some(edge);
    }

    /// The edges from the root to `node`, in traversal order.
    pub(crate) fn path(&self, node: usize) -> Vec<Edge<N>> {
        let mut edges = Vec::new();
        let mut current = node;
        while let Some(edge) = &self.nodes[current].edge {
            edges.push(edge.clone());
            current = self.nodes[current]
                .parent
                .expect("lineage entry with an edge has a parent");
        }
        edges.reverse();
        edges
    }
}

/// A pathfinding engine selected at construction time.
///
/// `Visit` offers the engine family behind one `run` signature; the engine
/// structs ([`MinCost`], [`GreedyBestFirst`], [`Bfs`], [`IdaStar`],
/// [`ParallelIdaStar`]) remain public for callers that want an engine's
/// specific surface. Because one variant fans work out to worker threads,
/// the unified entry requires thread-safe graphs and heuristics.
pub enum Visit<G: Graph, H> {
    MinCost(MinCost<G, H>),
    GreedyBestFirst(GreedyBestFirst<G, H>),
    Bfs(Bfs<G>),
    IdaStar(IdaStar<G, H>),
    ParallelIdaStar(ParallelIdaStar<G, H>),
}

impl<G, H> Visit<G, H>
where
    G: Graph,
    H: Heuristic<G::Node>,
{
    /// The A* algorithm: expands the frontier node minimising `g + h`.
    /// Optimal for consistent heuristics.
    pub fn a_star(graph: G, heuristic: H) -> Self {
        Visit::MinCost(MinCost::new(graph, heuristic))
    }

    /// A* with the heuristic scaled by `h_mul >= 1`. The higher the
    /// multiplier, the greedier the search; with a consistent heuristic the
    /// returned cost is within `h_mul` times the optimum.
    pub fn weighted_a_star(graph: G, heuristic: H, h_mul: f64) -> Result<Self> {
        Ok(Visit::MinCost(MinCost::with_multiplier(
            graph, heuristic, h_mul,
        )?))
    }

    /// Greedy best-first search: expands the frontier node minimising `h`
    /// alone. Fast, with no optimality guarantee.
    pub fn greedy_best_first(graph: G, heuristic: H) -> Self {
        Visit::GreedyBestFirst(GreedyBestFirst::new(graph, heuristic))
    }

    /// The IDA* algorithm: repeated cost-bounded depth-first searches with
    /// a growing `g + h` bound. Optimal for consistent heuristics, with
    /// memory proportional to the search depth.
    pub fn ida_star(graph: G, heuristic: H) -> Self {
        Visit::IdaStar(IdaStar::new(graph, heuristic))
    }

    /// IDA* with each cost-bounded iteration shared among `workers` threads
    /// through work stealing.
    pub fn parallel_ida_star(graph: G, heuristic: H, workers: usize) -> Result<Self> {
        Ok(Visit::ParallelIdaStar(ParallelIdaStar::new(
            graph, heuristic, workers,
        )?))
    }

    /// Replaces the target rule with an explicit predicate.
    pub fn with_target(self, target: impl Fn(&G::Node) -> bool + Send + Sync + 'static) -> Self {
        match self {
            Visit::MinCost(engine) => Visit::MinCost(engine.with_target(target)),
            Visit::GreedyBestFirst(engine) => Visit::GreedyBestFirst(engine.with_target(target)),
            Visit::Bfs(engine) => Visit::Bfs(engine.with_target(target)),
            Visit::IdaStar(engine) => Visit::IdaStar(engine.with_target(target)),
            Visit::ParallelIdaStar(engine) => Visit::ParallelIdaStar(engine.with_target(target)),
        }
    }

    /// The graph this visit traverses.
    pub fn graph(&self) -> &G {
        match self {
            Visit::MinCost(engine) => engine.graph(),
            Visit::GreedyBestFirst(engine) => engine.graph(),
            Visit::Bfs(engine) => engine.graph(),
            Visit::IdaStar(engine) => engine.graph(),
            Visit::ParallelIdaStar(engine) => engine.graph(),
        }
    }
}

impl<G> Visit<G, fn(&G::Node) -> f64>
where
    G: Graph,
{
    /// Dijkstra's algorithm: A* with the trivial heuristic. Targets are
    /// identified by the predicate. Always returns a lowest-cost path.
    pub fn dijkstra(graph: G, target: impl Fn(&G::Node) -> bool + Send + Sync + 'static) -> Self {
        Visit::MinCost(MinCost::new(graph, zero as fn(&G::Node) -> f64).with_target(target))
    }

    /// Breadth-first search: returns a path with the fewest edges,
    /// ignoring edge weights.
    pub fn bfs(graph: G, target: impl Fn(&G::Node) -> bool + Send + Sync + 'static) -> Self {
        Visit::Bfs(Bfs::new(graph, target))
    }

    /// Iterative cost-bounded depth-first search: IDA* with the trivial
    /// heuristic. Always returns a lowest-cost path, in memory
    /// proportional to the search depth.
    pub fn iterative_bounded_dfs(
        graph: G,
        target: impl Fn(&G::Node) -> bool + Send + Sync + 'static,
    ) -> Self {
        Visit::IdaStar(IdaStar::new(graph, zero as fn(&G::Node) -> f64).with_target(target))
    }

    /// Parallel iterative cost-bounded depth-first search.
    pub fn parallel_iterative_bounded_dfs(
        graph: G,
        target: impl Fn(&G::Node) -> bool + Send + Sync + 'static,
        workers: usize,
    ) -> Result<Self> {
        Ok(Visit::ParallelIdaStar(
            ParallelIdaStar::new(graph, zero as fn(&G::Node) -> f64, workers)?.with_target(target),
        ))
    }
}

impl<G, H> std::fmt::Debug for Visit<G, H>
where
    G: Graph + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visit::MinCost(engine) => engine.fmt(f),
            Visit::GreedyBestFirst(engine) => engine.fmt(f),
            Visit::Bfs(engine) => engine.fmt(f),
            Visit::IdaStar(engine) => engine.fmt(f),
            Visit::ParallelIdaStar(engine) => engine.fmt(f),
        }
    }
}

impl<G, H> Visit<G, H>
where
    G: Graph + Sync,
    G::Node: Send + Sync,
    H: Heuristic<G::Node> + Sync,
{
    /// Traverses the graph and returns the edges from `start` to a target
    /// node, or `None` when no target is reachable.
    pub fn run(&self, start: G::Node) -> Option<Vec<Edge<G::Node>>> {
        self.run_with(start, |_| {})
    }

    /// Like [`Visit::run`], invoking `on_visit` with every expanded node.
    /// The parallel engine calls the observer from its worker threads.
    pub fn run_with<F>(&self, start: G::Node, on_visit: F) -> Option<Vec<Edge<G::Node>>>
    where
        F: Fn(&G::Node) + Sync,
    {
        match self {
            Visit::MinCost(engine) => engine.run_with(start, on_visit),
            Visit::GreedyBestFirst(engine) => engine.run_with(start, on_visit),
            Visit::Bfs(engine) => engine.run_with(start, on_visit),
            Visit::IdaStar(engine) => engine.run_with(start, on_visit),
            Visit::ParallelIdaStar(engine) => engine.run_with(start, on_visit),
        }
    }
}
