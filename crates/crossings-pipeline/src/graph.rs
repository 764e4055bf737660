//! The inferred edge set: an undirected graph over detected junctions.
//!
//! Node `i` is junction `i` of the scan. Edges are unordered pairs of
//! distinct junctions; adding `(a, b)` after `(b, a)` is a no-op.

use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::types::Point;

/// Undirected graph of junctions and the edges inferred between them.
#[derive(Debug, Clone, Default)]
pub struct JunctionGraph {
    graph: UnGraph<Point, ()>,
}

impl JunctionGraph {
    /// Create a graph with one node per junction and no edges.
    #[must_use]
    pub fn new(junctions: &[Point]) -> Self {
        let mut graph = UnGraph::with_capacity(junctions.len(), 0);
        for &p in junctions {
            graph.add_node(p);
        }
        Self { graph }
    }

    /// Number of junctions.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of inferred edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Record an edge between junctions `i` and `j`.
    ///
    /// Returns `true` if the edge is new. Self-loops, unknown indices,
    /// and edges already present (in either order) are rejected.
    pub fn connect(&mut self, i: usize, j: usize) -> bool {
        if i == j || i >= self.node_count() || j >= self.node_count() {
            return false;
        }
        let (a, b) = (NodeIndex::new(i), NodeIndex::new(j));
        if self.graph.find_edge(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(a, b, ());
        true
    }

    /// Whether junctions `i` and `j` are joined by an edge.
    #[must_use]
    pub fn contains_edge(&self, i: usize, j: usize) -> bool {
        i < self.node_count()
            && j < self.node_count()
            && self
                .graph
                .find_edge(NodeIndex::new(i), NodeIndex::new(j))
                .is_some()
    }

    /// Edges as `(lower, higher)` index pairs, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.graph.edge_references().map(|e| {
            let (s, t) = (e.source().index(), e.target().index());
            (s.min(t), s.max(t))
        })
    }

    /// Number of connected components, isolated junctions included.
    #[must_use]
    pub fn component_count(&self) -> usize {
        connected_components(&self.graph)
    }
}
