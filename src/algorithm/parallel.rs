use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::algorithm::TargetFn;
use crate::errors::{Result, SearchError};
use crate::graph::{Edge, Graph};
use crate::heuristic::Heuristic;

const WHITE: u8 = 0;
const BLACK: u8 = 1;

/// IDA* with each cost-bounded iteration shared among worker threads.
///
/// Every worker owns a depth-first stack. The start node seeds worker 0;
/// the others begin idle and steal work. A worker publishes the lower
/// portion of its stack (up to its `exc_depth` cursor) for theft; a thief
/// copies the window `[head, exc_depth)` under the victim's lock and
/// advances `head` so no entry is handed out twice. Iterations end through
/// Dijkstra-Safra token-ring termination detection: a probe circulates
/// from worker 0 and succeeds only when no theft has painted a worker
/// black, which proves no work is in flight anywhere.
///
/// The cost of the returned path equals that of [`IdaStar`](super::IdaStar)
/// for the same parameters, though not necessarily the same path. A panic
/// on a worker thread (from the graph, heuristic or observer callbacks) is
/// rethrown from `run`.
pub struct ParallelIdaStar<G: Graph, H> {
    graph: G,
    heuristic: H,
    target: Option<TargetFn<G::Node>>,
    workers: usize,
}

impl<G, H> ParallelIdaStar<G, H>
where
    G: Graph,
    H: Heuristic<G::Node>,
{
    /// Constructs the engine with the given worker count. Rejects a count
    /// of zero. Nodes whose heuristic evaluates to zero are targets.
    pub fn new(graph: G, heuristic: H, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(SearchError::InvalidWorkerCount);
        }
        Ok(ParallelIdaStar {
            graph,
            heuristic,
            target: None,
            workers,
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
}

impl<G, H> ParallelIdaStar<G, H>
where
    G: Graph + Sync,
    G::Node: Send + Sync,
    H: Heuristic<G::Node> + Sync,
{
    pub fn run(&self, start: G::Node) -> Option<Vec<Edge<G::Node>>> {
        self.run_with(start, |_| {})
    }

    /// Like [`ParallelIdaStar::run`]; `on_visit` is invoked from the
    /// worker threads, concurrently.
    pub fn run_with<F>(&self, start: G::Node, on_visit: F) -> Option<Vec<Edge<G::Node>>>
    where
        F: Fn(&G::Node) + Sync,
    {
        let mut bound = self.heuristic.eval(&start);
        let procs: Vec<Processor<G::Node>> = (0..self.workers).map(|_| Processor::new()).collect();
        let solution: OnceLock<Arc<StackNode<G::Node>>> = OnceLock::new();

        while bound.is_finite() {
            procs[0].stack.lock().push(Arc::new(StackNode {
                parent: None,
                edge: None,
                value: start.clone(),
                g: 0.0,
            }));
            let iteration = Iteration {
                graph: &self.graph,
                heuristic: &self.heuristic,
                target: self.target.as_deref(),
                bound,
                procs: &procs,
                solution: &solution,
                quit: AtomicBool::new(false),
                token_colour: AtomicU8::new(BLACK),
                token_holder: AtomicUsize::new(0),
            };
            thread::scope(|scope| {
                for id in 1..self.workers {
                    let iteration = &iteration;
                    let on_visit = &on_visit;
                    scope.spawn(move || iteration.worker(id, on_visit));
                }
                iteration.worker(0, &on_visit);
            });

            if let Some(found) = solution.get() {
                return Some(found.path());
            }

            // Next bound and a clean slate for the next iteration.
            bound = f64::INFINITY;
            for proc in &procs {
                let mut next = proc.next_bound.lock();
                if *next < bound {
                    bound = *next;
                }
                *next = f64::INFINITY;
                proc.colour.store(WHITE, Ordering::Release);
            }
            debug!(bound, "deepening cost bound");
        }
        None
    }
}

impl<G, H> fmt::Debug for ParallelIdaStar<G, H>
where
    G: Graph + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParallelIdaStar")
            .field("graph", &self.graph)
            .field("workers", &self.workers)
            .field("has_target", &self.target.is_some())
            .finish()
    }
}

/// Per-worker search state.
///
/// `head` is the lowest stack index still owned by the worker (everything
/// below has been stolen); `exc_depth` is the highest index the worker is
/// willing to donate. Both cursors are only written under the stack lock,
/// and `head <= exc_depth <= stack.len()` holds whenever the lock is free.
struct Processor<N> {
    stack: Mutex<Vec<Arc<StackNode<N>>>>,
    head: AtomicUsize,
    exc_depth: AtomicUsize,
    colour: AtomicU8,
    next_bound: Mutex<f64>,
}

impl<N> Processor<N> {
    fn new() -> Self {
        Processor {
            stack: Mutex::new(Vec::new()),
            head: AtomicUsize::new(0),
            exc_depth: AtomicUsize::new(0),
            colour: AtomicU8::new(WHITE),
            next_bound: Mutex::new(f64::INFINITY),
        }
    }
}

/// Shared state of one cost-bounded iteration.
struct Iteration<'a, G: Graph, H> {
    graph: &'a G,
    heuristic: &'a H,
    target: Option<&'a (dyn Fn(&G::Node) -> bool + Send + Sync)>,
    bound: f64,
    procs: &'a [Processor<G::Node>],
    solution: &'a OnceLock<Arc<StackNode<G::Node>>>,
    quit: AtomicBool,
    token_colour: AtomicU8,
    token_holder: AtomicUsize,
}

impl<G, H> Iteration<'_, G, H>
where
    G: Graph + Sync,
    G::Node: Send + Sync,
    H: Heuristic<G::Node> + Sync,
{
    fn worker<F>(&self, id: usize, on_visit: &F)
    where
        F: Fn(&G::Node) + Sync,
    {
        let proc = &self.procs[id];
        let mut depth = proc.stack.lock().len();
        let mut next_bound = f64::INFINITY;

        while !self.quit.load(Ordering::Acquire) && self.solution.get().is_none() {
            if depth > proc.head.load(Ordering::Acquire) {
                self.bounded_dfs(id, &mut depth, &mut next_bound, on_visit);
            } else if !self.steal(id, &mut depth) {
                self.check_termination(id);
            }
        }

        let mut stack = proc.stack.lock();
        stack.clear();
        proc.head.store(0, Ordering::Release);
        proc.exc_depth.store(0, Ordering::Release);
        drop(stack);
        *proc.next_bound.lock() = next_bound;
    }

    fn bounded_dfs<F>(&self, id: usize, depth: &mut usize, next_bound: &mut f64, on_visit: &F)
    where
        F: Fn(&G::Node) + Sync,
    {
        let proc = &self.procs[id];
        while *depth > proc.head.load(Ordering::Acquire) && self.solution.get().is_none() {
            let current = {
                let mut stack = proc.stack.lock();
                let head = proc.head.load(Ordering::Relaxed);
                if stack.len() <= head {
                    // A thief emptied the window since the last check.
                    *depth = stack.len();
                    return;
                }
                let current = stack.pop().expect("stack holds entries above head");
                *depth = stack.len();
                if *depth < proc.exc_depth.load(Ordering::Relaxed) {
                    proc.exc_depth.store((*depth + head) / 2, Ordering::Release);
                }
                current
            };

            let h = self.heuristic.eval(&current.value);
            let f = current.g + h;
            if f > self.bound {
                if f < *next_bound {
                    *next_bound = f;
                }
                continue;
            }
            on_visit(&current.value);
            let found = match self.target {
                Some(target) => target(&current.value),
                None => h == 0.0,
            };
            if found {
                let _ = self.solution.set(current);
                return;
            }

            let successors: Vec<Edge<G::Node>> = self
                .graph
                .outgoing_edges(&current.value)
                .into_iter()
                .filter(|edge| !current.has_in_path(&edge.destination))
                .collect();
            let mut stack = proc.stack.lock();
            for edge in successors {
                stack.push(Arc::new(StackNode {
                    parent: Some(current.clone()),
                    g: current.g + edge.weight,
                    value: edge.destination.clone(),
                    edge: Some(edge),
                }));
            }
            *depth = stack.len();
            let head = proc.head.load(Ordering::Relaxed);
            let half = (*depth + head) / 2;
            if half > proc.exc_depth.load(Ordering::Relaxed) {
                proc.exc_depth.store(half, Ordering::Release);
            }
        }
    }

    fn steal(&self, id: usize, depth: &mut usize) -> bool {
        let workers = self.procs.len();
        let probes = workers.saturating_sub(1).min(3);
        for j in 1..=probes {
            let victim_id = (id + j) % workers;
            let victim = &self.procs[victim_id];
            if victim.exc_depth.load(Ordering::Acquire) > victim.head.load(Ordering::Acquire) {
                let taken = {
                    let victim_stack = victim.stack.lock();
                    let head = victim.head.load(Ordering::Relaxed);
                    let exc_depth = victim.exc_depth.load(Ordering::Relaxed);
                    let taken = victim_stack[head..exc_depth].to_vec();
                    // The asymmetry that makes termination detection
                    // sound: stealing from a lower-numbered worker paints
                    // the victim black.
                    if id > victim_id {
                        victim.colour.store(BLACK, Ordering::Release);
                    }
                    victim.head.store(exc_depth, Ordering::Release);
                    taken
                };
                let mut stack = self.procs[id].stack.lock();
                stack.extend(taken);
                *depth = stack.len();
                return true;
            }
        }
        false
    }

    fn check_termination(&self, id: usize) {
        if self.token_holder.load(Ordering::Acquire) != id {
            thread::sleep(Duration::from_millis(1));
            return;
        }
        let proc = &self.procs[id];
        if id == 0 {
            if self.token_colour.load(Ordering::Acquire) == WHITE
                && proc.colour.load(Ordering::Acquire) == WHITE
            {
                // The probe came back clean: no work is in flight.
                self.quit.store(true, Ordering::Release);
            } else {
                self.token_colour.store(WHITE, Ordering::Release);
                proc.colour.store(WHITE, Ordering::Release);
                self.token_holder
                    .store(self.procs.len() - 1, Ordering::Release);
            }
        } else {
            if proc.colour.load(Ordering::Acquire) == BLACK {
                self.token_colour.store(BLACK, Ordering::Release);
            }
            proc.colour.store(WHITE, Ordering::Release);
            self.token_holder.store(id - 1, Ordering::Release);
        }
    }
}

/// A lineage record on a worker stack. Parent chains are shared across
/// workers by stealing, so entries are reference counted atomically.
struct StackNode<N> {
    parent: Option<Arc<StackNode<N>>>,
    edge: Option<Edge<N>>,
    value: N,
    g: f64,
}

impl<N: Clone + Eq> StackNode<N> {
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

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::algorithm::IdaStar;
    use crate::fixtures::{assert_valid_path, manhattan, Puzzle, PuzzleGraph};
    use crate::graph::SimpleGraph;
    use crate::heuristic::zero;

    fn path_cost(path: &[Edge<u32>]) -> f64 {
        path.iter().map(|e| e.weight).sum()
    }

    #[test]
    fn zero_workers_are_rejected() {
        assert!(matches!(
            ParallelIdaStar::new(PuzzleGraph, manhattan, 0),
            Err(SearchError::InvalidWorkerCount)
        ));
    }

    #[test]
    fn eight_puzzle_with_four_workers() {
        let engine = ParallelIdaStar::new(PuzzleGraph, manhattan, 4).unwrap();
        let start = Puzzle::new(&[8, 7, 4, 1, 6, 3, 2, 5, 0]);
        let path = engine.run(start.clone()).unwrap();
        assert_eq!(path.len(), 22);
        assert!(path.last().unwrap().destination.is_solved());
        assert_valid_path(&PuzzleGraph, &start, &path, Puzzle::is_solved);
    }

    #[test]
    fn single_worker_degenerates_to_ida_star() {
        let engine = ParallelIdaStar::new(PuzzleGraph, manhattan, 1).unwrap();
        let start = Puzzle::new(&[7, 1, 2, 4, 8, 3, 5, 0, 6]);
        let path = engine.run(start).unwrap();
        assert_eq!(path.len(), 13);
    }

    // A small random digraph; cycle checking keeps the bounded searches on
    // simple paths, so the node count stays modest.
    fn random_graph(rng: &mut StdRng) -> SimpleGraph<u32> {
        let nodes = 12;
        let mut builder = SimpleGraph::builder();
        for from in 0..nodes {
            for _ in 0..2 {
                let to = rng.gen_range(0..nodes);
                if to != from {
                    let weight = rng.gen_range(1..4) as f64;
                    builder = builder.add_weighted_edge(from, to, weight);
                }
            }
        }
        builder.build()
    }

    #[test]
    fn cost_matches_sequential_ida_star_on_random_graphs() {
        for seed in 0..6 {
            let mut rng = StdRng::seed_from_u64(seed);
            let graph = random_graph(&mut rng);
            let target = |n: &u32| *n == 11;
            let sequential = IdaStar::new(graph.clone(), zero).with_target(target);
            let parallel = ParallelIdaStar::new(graph, zero, 4)
                .unwrap()
                .with_target(target);
            match (sequential.run(0), parallel.run(0)) {
                (Some(a), Some(b)) => assert_eq!(path_cost(&a), path_cost(&b), "seed {seed}"),
                (None, None) => {}
                (a, b) => panic!("seed {seed}: sequential {a:?} vs parallel {b:?}"),
            }
        }
    }

    #[test]
    fn observer_sees_every_node_on_the_path() {
        let engine = ParallelIdaStar::new(PuzzleGraph, manhattan, 4).unwrap();
        let start = Puzzle::new(&[7, 1, 2, 4, 8, 3, 5, 0, 6]);
        let seen = Mutex::new(HashSet::new());
        let path = engine
            .run_with(start.clone(), |n| {
                seen.lock().insert(n.clone());
            })
            .unwrap();
        let seen = seen.into_inner();
        assert!(seen.contains(&start));
        for edge in &path {
            assert!(seen.contains(&edge.destination));
        }
    }

    #[test]
    fn target_predicate_overrides_the_zero_rule() {
        let graph = SimpleGraph::builder()
            .add_edge(1u32, 2)
            .add_edge(2, 3)
            .build();
        let engine = ParallelIdaStar::new(graph, zero, 2)
            .unwrap()
            .with_target(|n: &u32| *n == 3);
        let path = engine.run(1).unwrap();
        assert_eq!(path.len(), 2);
    }
}
