//! Statistics over a generated (or reloaded) follow graph.
//!
//! # Statistics Provided
//!
//! - **edges**: distinct `(source, target)` pairs.
//! - **avg_out / avg_in**: `edges / N`; identical for a directed graph.
//! - **reciprocity**: `(directed edges whose mirror exists / 2) / edges`,
//!   i.e. mutual pairs per edge. In `[0, 1]`.
//! - **gini_followers**: Gini coefficient of the in-degree array from the
//!   discrete Lorenz curve. 0 means everyone has the same follower count.
//! - **top_hubs**: most-followed identities, ties kept in index order.
//!
//! [`TopologySummary`] adds structural figures computed with petgraph.

use std::cmp::Reverse;
use std::collections::HashSet;

use petgraph::algo::connected_components;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::graph::{DirectedEdge, FollowGraph};
use crate::request::{GraphSeedStats, TopHub};

/// Number of hubs reported unless configured otherwise.
pub const DEFAULT_TOP_HUBS: usize = 10;

/// Round half to even at `places` decimals.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10_f64.powi(places);
    (value * scale).round_ties_even() / scale
}

/// Gini coefficient of `values`, rounded to 4 decimals.
///
/// Returns 0 for an empty slice or when every value is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn gini(values: &[usize]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted: Vec<f64> = values.iter().map(|&v| v as f64).collect();
    sorted.sort_by(f64::total_cmp);

    let total: f64 = sorted.iter().sum();
    if total == 0.0 {
        return 0.0;
    }

    let mut cumulative = 0.0;
    let mut accumulator = 0.0;
    for value in &sorted {
        cumulative += value;
        accumulator += cumulative - value / 2.0;
    }

    let lorenz = accumulator / (sorted.len() as f64 * total);
    round_to(1.0 - 2.0 * lorenz, 4)
}

/// Number of directed edges whose mirror is also present.
#[must_use]
pub fn mutual_edge_count(edges: &[DirectedEdge]) -> usize {
    let unique: HashSet<DirectedEdge> = edges.iter().copied().collect();
    edges
        .iter()
        .filter(|edge| unique.contains(&edge.mirrored()))
        .count()
}

/// Mutual pairs per distinct edge; 0 for an empty graph.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn reciprocity_rate(edges: &[DirectedEdge]) -> f64 {
    let distinct = edges.iter().copied().collect::<HashSet<_>>().len();
    if distinct == 0 {
        return 0.0;
    }
    (mutual_edge_count(edges) as f64 / 2.0) / distinct as f64
}

/// The `limit` identities with the most followers, stable on ties.
#[must_use]
pub fn top_hubs(external_ids: &[String], in_degree: &[usize], limit: usize) -> Vec<TopHub> {
    let mut order: Vec<usize> = (0..in_degree.len()).collect();
    order.sort_by_key(|&i| Reverse(in_degree[i]));
    order
        .into_iter()
        .take(limit)
        .map(|i| TopHub {
            user: external_ids[i].clone(),
            followers: in_degree[i],
        })
        .collect()
}

/// Counters produced by the generation passes, carried into the stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassCounts {
    pub accounts_created: usize,
    pub triadic_added: usize,
    pub reciprocal_added: usize,
}

/// Aggregate statistics for `graph`. Averages are rounded to 2 decimals and
/// reciprocity to 3, as the service has always reported them.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(
    external_ids: &[String],
    graph: &FollowGraph,
    counts: PassCounts,
    hub_limit: usize,
) -> GraphSeedStats {
    let n = graph.node_count();
    let edges = graph.edges().iter().copied().collect::<HashSet<_>>().len();
    let avg = if n == 0 { 0.0 } else { edges as f64 / n as f64 };

    GraphSeedStats {
        users: n,
        accounts_created: counts.accounts_created,
        edges,
        avg_out: round_to(avg, 2),
        avg_in: round_to(avg, 2),
        triadic_added: counts.triadic_added,
        reciprocal_added: counts.reciprocal_added,
        reciprocity: round_to(reciprocity_rate(graph.edges()), 3),
        gini_followers: gini(graph.in_degrees()),
        top_hubs: top_hubs(external_ids, graph.in_degrees(), hub_limit),
    }
}

/// `blake3:<hex>` digest of the ordered edge list, by external id.
#[must_use]
pub fn edge_fingerprint(external_ids: &[String], edges: &[DirectedEdge]) -> String {
    let mut hasher = blake3::Hasher::new();
    for edge in edges {
        hasher.update(external_ids[edge.source].as_bytes());
        hasher.update(b"\x00");
        hasher.update(external_ids[edge.target].as_bytes());
        hasher.update(b"\x00");
    }
    format!("blake3:{}", hasher.finalize())
}

/// Structural summary of the follow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologySummary {
    /// `edges / (n * (n - 1))`; 0 for fewer than two identities.
    pub density: f64,
    /// Weakly connected components (edges treated as undirected).
    pub weak_components: usize,
    /// Identities with neither followers nor follows.
    pub isolated: usize,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
    /// Pairs that follow each other.
    pub mutual_pairs: usize,
}

/// Compute the [`TopologySummary`] of `graph`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn topology(graph: &FollowGraph) -> TopologySummary {
    let n = graph.node_count();
    let mut dg = DiGraph::<usize, ()>::with_capacity(n, graph.edge_count());
    let nodes: Vec<NodeIndex> = (0..n).map(|i| dg.add_node(i)).collect();
    for edge in graph.edges() {
        dg.add_edge(nodes[edge.source], nodes[edge.target], ());
    }

    let density = if n < 2 {
        0.0
    } else {
        graph.edge_count() as f64 / (n * (n - 1)) as f64
    };

    TopologySummary {
        density,
        weak_components: connected_components(&dg),
        isolated: (0..n)
            .filter(|&i| graph.in_degree(i) == 0 && graph.out_degree(i) == 0)
            .count(),
        max_in_degree: graph.in_degrees().iter().copied().max().unwrap_or(0),
        max_out_degree: (0..n).map(|i| graph.out_degree(i)).max().unwrap_or(0),
        mutual_pairs: mutual_edge_count(graph.edges()) / 2,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("u{i}")).collect()
    }

    fn graph(n: usize, edges: &[(usize, usize)]) -> FollowGraph {
        FollowGraph::from_edges(n, edges.iter().map(|&(s, t)| DirectedEdge::new(s, t)))
    }

    // -----------------------------------------------------------------------
    // Gini
    // -----------------------------------------------------------------------

    #[test]
    fn gini_all_zero_is_zero() {
        assert!(gini(&[0, 0, 0, 0]).abs() < f64::EPSILON);
        assert!(gini(&[]).abs() < f64::EPSILON);
    }

    #[test]
    fn gini_equal_values_is_zero() {
        assert!(gini(&[5, 5, 5, 5]).abs() < f64::EPSILON);
    }

    #[test]
    fn gini_concentration_beats_spread() {
        let concentrated = gini(&[3, 0, 0, 0]);
        let spread = gini(&[1, 1, 1, 0]);
        assert!((concentrated - 0.75).abs() < 1e-12);
        assert!((spread - 0.25).abs() < 1e-12);
        assert!(concentrated > spread);
    }

    #[test]
    fn gini_ignores_input_order() {
        assert!((gini(&[0, 3, 0, 0]) - gini(&[3, 0, 0, 0])).abs() < f64::EPSILON);
    }

    #[test]
    fn round_to_is_half_even() {
        assert!((round_to(0.125, 2) - 0.12).abs() < 1e-12);
        assert!((round_to(0.135, 2) - 0.14).abs() < 1e-12);
        assert!((round_to(2.0 / 3.0, 3) - 0.667).abs() < 1e-12);
    }

    // -----------------------------------------------------------------------
    // Reciprocity
    // -----------------------------------------------------------------------

    #[test]
    fn reciprocity_empty_is_zero() {
        assert!(reciprocity_rate(&[]).abs() < f64::EPSILON);
    }

    #[test]
    fn reciprocity_counts_pairs_per_edge() {
        // One mutual pair out of three edges.
        let g = graph(3, &[(0, 1), (1, 0), (1, 2)]);
        assert_eq!(mutual_edge_count(g.edges()), 2);
        assert!((reciprocity_rate(g.edges()) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn reciprocity_fully_mutual_graph() {
        let g = graph(2, &[(0, 1), (1, 0)]);
        assert!((reciprocity_rate(g.edges()) - 0.5).abs() < 1e-12);
    }

    // -----------------------------------------------------------------------
    // Top hubs
    // -----------------------------------------------------------------------

    #[test]
    fn top_hubs_descending_with_stable_ties() {
        let hubs = top_hubs(&ids(5), &[2, 5, 2, 0, 5], 10);
        let order: Vec<&str> = hubs.iter().map(|h| h.user.as_str()).collect();
        assert_eq!(order, vec!["u1", "u4", "u0", "u2", "u3"]);
        assert_eq!(hubs[0].followers, 5);
    }

    #[test]
    fn top_hubs_truncates_to_limit() {
        let degrees: Vec<usize> = (0..25).collect();
        let hubs = top_hubs(&ids(25), &degrees, 10);
        assert_eq!(hubs.len(), 10);
        assert_eq!(hubs[0].user, "u24");
        assert_eq!(hubs[9].user, "u15");
    }

    // -----------------------------------------------------------------------
    // Summary
    // -----------------------------------------------------------------------

    #[test]
    fn summarize_reports_rounded_figures() {
        let g = graph(3, &[(0, 1), (1, 0), (1, 2), (2, 1)]);
        let stats = summarize(
            &ids(3),
            &g,
            PassCounts {
                accounts_created: 3,
                triadic_added: 1,
                reciprocal_added: 2,
            },
            DEFAULT_TOP_HUBS,
        );
        assert_eq!(stats.users, 3);
        assert_eq!(stats.accounts_created, 3);
        assert_eq!(stats.edges, 4);
        assert!((stats.avg_out - 1.33).abs() < 1e-12);
        assert!((stats.avg_in - 1.33).abs() < 1e-12);
        assert!((stats.reciprocity - 0.5).abs() < 1e-12);
        assert_eq!(stats.triadic_added, 1);
        assert_eq!(stats.reciprocal_added, 2);
        assert_eq!(stats.top_hubs[0].user, "u1");
        assert_eq!(stats.top_hubs[0].followers, 2);
    }

    #[test]
    fn fingerprint_depends_on_order_and_content() {
        let ids = ids(3);
        let a = [DirectedEdge::new(0, 1), DirectedEdge::new(1, 2)];
        let b = [DirectedEdge::new(1, 2), DirectedEdge::new(0, 1)];
        assert_eq!(edge_fingerprint(&ids, &a), edge_fingerprint(&ids, &a));
        assert_ne!(edge_fingerprint(&ids, &a), edge_fingerprint(&ids, &b));
        assert!(edge_fingerprint(&ids, &a).starts_with("blake3:"));
    }

    // -----------------------------------------------------------------------
    // Topology
    // -----------------------------------------------------------------------

    #[test]
    fn topology_of_two_components() {
        // 0 <-> 1, 2 -> 3, 4 isolated
        let g = graph(5, &[(0, 1), (1, 0), (2, 3)]);
        let t = topology(&g);
        assert_eq!(t.weak_components, 3);
        assert_eq!(t.isolated, 1);
        assert_eq!(t.max_in_degree, 1);
        assert_eq!(t.max_out_degree, 1);
        assert_eq!(t.mutual_pairs, 1);
        assert!((t.density - 3.0 / 20.0).abs() < 1e-12);
    }

    #[test]
    fn topology_of_single_node() {
        let g = graph(1, &[]);
        let t = topology(&g);
        assert!(t.density.abs() < f64::EPSILON);
        assert_eq!(t.weak_components, 1);
        assert_eq!(t.isolated, 1);
    }
}
