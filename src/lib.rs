//! Pathfinding and local search over lazily expanded graphs.
//!
//! A [`Graph`] supplies outgoing edges on demand and a [`Heuristic`]
//! estimates the remaining cost to a target; on top of those two callbacks
//! the crate offers a family of search engines behind the common [`Visit`]
//! entry point:
//!
//! - [`MinCost`]: A*, weighted A* and Dijkstra over a Fibonacci-heap
//!   frontier with decrease-key relaxation;
//! - [`GreedyBestFirst`]: fast, non-optimal best-first search;
//! - [`Bfs`]: fewest-edges paths on unweighted graphs;
//! - [`IdaStar`]: iterative deepening A* in memory proportional to the
//!   search depth;
//! - [`ParallelIdaStar`]: IDA* iterations shared among worker threads with
//!   work stealing and token-ring termination detection;
//! - [`SteepestDescent`]: local search on the heuristic gradient.
//!
//! ```
//! use wayfinder::{SimpleGraph, Visit};
//!
//! let graph = SimpleGraph::builder()
//!     .add_weighted_edge("home", "bridge", 2.0)
//!     .add_weighted_edge("bridge", "market", 3.0)
//!     .add_weighted_edge("home", "market", 9.0)
//!     .build();
//! let visit = Visit::dijkstra(graph, |n: &&str| *n == "market");
//! let path = visit.run("home").expect("market is reachable");
//! assert_eq!(path.len(), 2);
//! ```

pub mod algorithm;
mod errors;
pub mod graph;
pub mod heap;
mod heuristic;

#[cfg(test)]
pub(crate) mod fixtures;

pub use algorithm::{Bfs, GreedyBestFirst, IdaStar, MinCost, ParallelIdaStar};
pub use algorithm::{SteepestDescent, Visit};
pub use errors::{Result, SearchError};
pub use graph::{Edge, Graph, SimpleGraph, SimpleGraphBuilder};
pub use heap::{FibonacciHeap, Handle};
pub use heuristic::{zero, Heuristic};
