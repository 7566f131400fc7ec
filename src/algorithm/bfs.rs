use std::collections::{HashMap, VecDeque};
use std::fmt;

use crate::algorithm::{PathTree, TargetFn};
use crate::graph::{Edge, Graph};

/// Breadth-first search.
///
/// The frontier is a FIFO queue and edge weights are ignored, so the
/// returned path has the fewest edges possible. When every edge has the
/// same weight this matches Dijkstra at a fraction of the cost.
pub struct Bfs<G: Graph> {
    graph: G,
    target: TargetFn<G::Node>,
}

impl<G> Bfs<G>
where
    G: Graph,
{
    /// Constructs the engine. Nodes satisfying `target` are targets.
    pub fn new(graph: G, target: impl Fn(&G::Node) -> bool + Send + Sync + 'static) -> Self {
        Bfs {
            graph,
            target: Box::new(target),
        }
    }

    /// Replaces the target predicate.
    pub fn with_target(mut self, target: impl Fn(&G::Node) -> bool + Send + Sync + 'static) -> Self {
        self.target = Box::new(target);
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
        let mut frontier = VecDeque::new();
        let mut tree = PathTree::new();
        let mut known: HashMap<G::Node, usize> = HashMap::new();

        let root = tree.root();
        frontier.push_back(start.clone());
        known.insert(start, root);

        while let Some(current) = frontier.pop_front() {
            let lineage = known[&current];
            on_visit(&current);
            if (self.target)(&current) {
                return Some(tree.path(lineage));
            }
            for edge in self.graph.outgoing_edges(&current) {
                if !known.contains_key(&edge.destination) {
                    frontier.push_back(edge.destination.clone());
                    let lineage = tree.insert(lineage, edge.clone());
                    known.insert(edge.destination, lineage);
                }
            }
        }
        None
    }
}

impl<G> fmt::Debug for Bfs<G>
where
    G: Graph + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bfs").field("graph", &self.graph).finish()
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::collections::HashSet;

    use super::*;
    use crate::fixtures::{assert_valid_path, Cell, MazeGraph};
    use crate::graph::SimpleGraph;

    #[test]
    fn grid_pathfinding() {
        let maze = MazeGraph::fixture_10x10(9, 6);
        let start = Cell::new(4, 2);
        let engine = Bfs::new(maze.clone(), move |c: &Cell| maze.is_target(c));
        let path = engine.run(start).unwrap();
        assert_eq!(path.len(), 8);
        let maze = engine.graph();
        assert_valid_path(maze, &start, &path, |c| maze.is_target(c));
        for edge in &path {
            assert!(maze.is_walkable(&edge.destination));
        }
    }

    #[test]
    fn ignores_weights_and_minimises_edge_count() {
        let graph = SimpleGraph::builder()
            .add_weighted_edge("a", "b", 0.1)
            .add_weighted_edge("b", "c", 0.1)
            .add_weighted_edge("a", "c", 100.0)
            .build();
        let engine = Bfs::new(graph, |n: &&str| *n == "c");
        let path = engine.run("a").unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].weight, 100.0);
    }

    #[test]
    fn start_node_may_be_the_target() {
        let graph = SimpleGraph::builder().add_edge(1, 2).build();
        let engine = Bfs::new(graph, |n: &i32| *n == 1);
        assert_eq!(engine.run(1).unwrap().len(), 0);
    }

    #[test]
    fn unreachable_target_returns_none() {
        let graph = SimpleGraph::builder().add_edge(1, 2).add_edge(3, 4).build();
        let engine = Bfs::new(graph, |n: &i32| *n == 4);
        assert!(engine.run(1).is_none());
    }

    #[test]
    fn observer_sees_dequeued_nodes() {
        let graph = SimpleGraph::builder().add_edge(1, 2).add_edge(2, 3).build();
        let engine = Bfs::new(graph, |n: &i32| *n == 3);
        let seen = RefCell::new(HashSet::new());
        engine
            .run_with(1, |n| {
                seen.borrow_mut().insert(*n);
            })
            .unwrap();
        let seen = seen.into_inner();
        assert!(seen.contains(&1));
        assert!(seen.contains(&3));
    }
}
