use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use super::{Edge, Graph};

/// An adjacency-list [`Graph`] built up front from explicit edges.
///
/// Most callers implement [`Graph`] directly so that nodes can be expanded
/// lazily; `SimpleGraph` covers the small, fully known case.
#[derive(Debug, Clone)]
pub struct SimpleGraph<N> {
    edges: HashMap<N, Vec<Edge<N>>>,
}

impl<N> SimpleGraph<N>
where
    N: Clone + Eq + Hash + Debug,
{
    pub fn builder() -> SimpleGraphBuilder<N> {
        SimpleGraphBuilder {
            edges: HashMap::new(),
        }
    }
}

impl<N> Graph for SimpleGraph<N>
where
    N: Clone + Eq + Hash + Debug,
{
    type Node = N;

    fn outgoing_edges(&self, node: &N) -> Vec<Edge<N>> {
        self.edges.get(node).cloned().unwrap_or_default()
    }
}

/// Builder for [`SimpleGraph`] instances.
#[derive(Debug)]
pub struct SimpleGraphBuilder<N> {
    edges: HashMap<N, Vec<Edge<N>>>,
}

impl<N> SimpleGraphBuilder<N>
where
    N: Clone + Eq + Hash + Debug,
{
    /// Adds an edge with a weight of 1 and no label.
    pub fn add_edge(self, from: N, to: N) -> Self {
        self.insert(from, Edge::new(1.0, to))
    }

    /// Adds an edge with the given weight.
    pub fn add_weighted_edge(self, from: N, to: N, weight: f64) -> Self {
        self.insert(from, Edge::new(weight, to))
    }

    /// Adds an edge with the given weight and label.
    pub fn add_labeled_edge(self, from: N, to: N, weight: f64, label: impl Into<String>) -> Self {
        self.insert(from, Edge::labeled(label, weight, to))
    }

    pub fn build(self) -> SimpleGraph<N> {
        SimpleGraph { edges: self.edges }
    }

    fn insert(mut self, from: N, edge: Edge<N>) -> Self {
        self.edges.entry(from).or_default().push(edge);
        self
    }
}
