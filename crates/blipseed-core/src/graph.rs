//! Mutable follow-graph state for one run.
//!
//! Out-edges live in ordered sets so every pass iterates them in the same
//! order for a given seed. In-degrees are maintained on insertion and never
//! recomputed by scanning.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// `source` follows `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DirectedEdge {
    pub source: usize,
    pub target: usize,
}

impl DirectedEdge {
    #[must_use]
    pub const fn new(source: usize, target: usize) -> Self {
        Self { source, target }
    }

    /// The edge pointing the other way.
    #[must_use]
    pub const fn mirrored(self) -> Self {
        Self {
            source: self.target,
            target: self.source,
        }
    }
}

/// Adjacency, in-degree counters, and the insertion-ordered edge list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowGraph {
    out_edges: Vec<BTreeSet<usize>>,
    in_degree: Vec<usize>,
    edges: Vec<DirectedEdge>,
}

impl FollowGraph {
    /// Empty graph over `n` identities.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            out_edges: vec![BTreeSet::new(); n],
            in_degree: vec![0; n],
            edges: Vec::with_capacity(n * 8),
        }
    }

    /// Rebuild a graph from a stored edge list, dropping self loops,
    /// duplicates, and edges that reference identities outside `0..n`.
    #[must_use]
    pub fn from_edges(n: usize, edges: impl IntoIterator<Item = DirectedEdge>) -> Self {
        let mut graph = Self::new(n);
        for edge in edges {
            if edge.source < n && edge.target < n {
                graph.insert(edge);
            }
        }
        graph
    }

    /// Number of identities.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.out_edges.len()
    }

    /// Number of edges inserted so far.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn contains(&self, source: usize, target: usize) -> bool {
        self.out_edges[source].contains(&target)
    }

    /// Targets followed by `source`, ascending.
    #[must_use]
    pub fn out_edges(&self, source: usize) -> &BTreeSet<usize> {
        &self.out_edges[source]
    }

    #[must_use]
    pub fn out_degree(&self, source: usize) -> usize {
        self.out_edges[source].len()
    }

    #[must_use]
    pub fn in_degree(&self, target: usize) -> usize {
        self.in_degree[target]
    }

    /// Follower count per identity.
    #[must_use]
    pub fn in_degrees(&self) -> &[usize] {
        &self.in_degree
    }

    /// Edges in the order they were created.
    #[must_use]
    pub fn edges(&self) -> &[DirectedEdge] {
        &self.edges
    }

    /// Insert an edge. Returns `false` (and changes nothing) for self loops
    /// and edges that already exist.
    pub fn insert(&mut self, edge: DirectedEdge) -> bool {
        if edge.source == edge.target {
            return false;
        }
        if !self.out_edges[edge.source].insert(edge.target) {
            return false;
        }
        self.in_degree[edge.target] += 1;
        self.edges.push(edge);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_tracks_in_degree_and_order() {
        let mut graph = FollowGraph::new(3);
        assert!(graph.insert(DirectedEdge::new(0, 2)));
        assert!(graph.insert(DirectedEdge::new(1, 2)));
        assert!(graph.insert(DirectedEdge::new(2, 0)));

        assert_eq!(graph.in_degrees(), &[1, 0, 2]);
        assert_eq!(graph.out_degree(0), 1);
        assert_eq!(
            graph.edges(),
            &[
                DirectedEdge::new(0, 2),
                DirectedEdge::new(1, 2),
                DirectedEdge::new(2, 0)
            ]
        );
    }

    #[test]
    fn duplicates_and_self_loops_are_rejected() {
        let mut graph = FollowGraph::new(2);
        assert!(graph.insert(DirectedEdge::new(0, 1)));
        assert!(!graph.insert(DirectedEdge::new(0, 1)));
        assert!(!graph.insert(DirectedEdge::new(1, 1)));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.in_degree(1), 1);
        assert_eq!(graph.in_degree(0), 0);
    }

    #[test]
    fn from_edges_filters_invalid_entries() {
        let graph = FollowGraph::from_edges(
            3,
            [
                DirectedEdge::new(0, 1),
                DirectedEdge::new(0, 1),
                DirectedEdge::new(2, 2),
                DirectedEdge::new(1, 7),
                DirectedEdge::new(1, 0),
            ],
        );
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.contains(0, 1));
        assert!(graph.contains(1, 0));
    }

    #[test]
    fn mirrored_swaps_endpoints() {
        let edge = DirectedEdge::new(4, 9);
        assert_eq!(edge.mirrored(), DirectedEdge::new(9, 4));
        assert_eq!(edge.mirrored().mirrored(), edge);
    }

    #[test]
    fn out_edges_iterate_ascending() {
        let mut graph = FollowGraph::new(5);
        for target in [4, 1, 3] {
            graph.insert(DirectedEdge::new(0, target));
        }
        let order: Vec<usize> = graph.out_edges(0).iter().copied().collect();
        assert_eq!(order, vec![1, 3, 4]);
    }
}
