//! Structural invariant checks over a generated graph.

use std::collections::HashSet;
use std::fmt;

use crate::graph::DirectedEdge;
use crate::seeder::GeneratedGraph;

/// Oracle result for one generated graph.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleResult {
    /// `true` iff no violations were found.
    pub passed: bool,
    pub violations: Vec<InvariantViolation>,
}

impl OracleResult {
    fn from_violations(violations: Vec<InvariantViolation>) -> Self {
        Self {
            passed: violations.is_empty(),
            violations,
        }
    }
}

/// A single failed invariant.
#[derive(Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    /// An identity follows itself.
    SelfLoop { user: String },
    /// The same follow appears twice in the edge list.
    DuplicateEdge { source: String, target: String },
    /// The edge list names an index outside the pool.
    UnknownIdentity { index: usize, users: usize },
    /// The incrementally maintained follower count disagrees with the edges.
    InDegreeMismatch {
        user: String,
        recorded: usize,
        actual: usize,
    },
    /// Adjacency sets and the edge list disagree on the edge count.
    AdjacencyMismatch { adjacency: usize, edge_list: usize },
    /// The reported edge count is not the number of distinct edges.
    EdgeCountMismatch { reported: usize, actual: usize },
    /// A statistic that must lie in `[0, 1]` does not.
    OutOfRange { statistic: &'static str, value: f64 },
    /// Two runs with the same seed produced different edge lists.
    NonDeterministic { first: String, second: String },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfLoop { user } => write!(f, "SelfLoop: {user} follows itself"),
            Self::DuplicateEdge { source, target } => {
                write!(f, "DuplicateEdge: {source} -> {target} appears more than once")
            }
            Self::UnknownIdentity { index, users } => {
                write!(f, "UnknownIdentity: index {index} outside pool of {users}")
            }
            Self::InDegreeMismatch {
                user,
                recorded,
                actual,
            } => write!(
                f,
                "InDegreeMismatch: {user} records {recorded} followers but has {actual}"
            ),
            Self::AdjacencyMismatch {
                adjacency,
                edge_list,
            } => write!(
                f,
                "AdjacencyMismatch: adjacency holds {adjacency} edges, edge list {edge_list}"
            ),
            Self::EdgeCountMismatch { reported, actual } => {
                write!(f, "EdgeCountMismatch: reported {reported}, counted {actual}")
            }
            Self::OutOfRange { statistic, value } => {
                write!(f, "OutOfRange: {statistic} = {value} not in [0, 1]")
            }
            Self::NonDeterministic { first, second } => {
                write!(f, "NonDeterministic: replay produced {second}, first run {first}")
            }
        }
    }
}

/// Check every structural invariant of `generated`.
#[must_use]
pub fn check_graph(generated: &GeneratedGraph) -> OracleResult {
    let ids = generated.pool.external_ids();
    let graph = &generated.graph;
    let n = graph.node_count();
    let mut violations = Vec::new();

    let mut seen: HashSet<DirectedEdge> = HashSet::with_capacity(graph.edge_count());
    let mut actual_in = vec![0_usize; n];
    for edge in graph.edges() {
        if edge.source >= n || edge.target >= n {
            violations.push(InvariantViolation::UnknownIdentity {
                index: edge.source.max(edge.target),
                users: n,
            });
            continue;
        }
        if edge.source == edge.target {
            violations.push(InvariantViolation::SelfLoop {
                user: ids[edge.source].clone(),
            });
        }
        if !seen.insert(*edge) {
            violations.push(InvariantViolation::DuplicateEdge {
                source: ids[edge.source].clone(),
                target: ids[edge.target].clone(),
            });
        }
        actual_in[edge.target] += 1;
    }

    for (index, (&recorded, &actual)) in graph.in_degrees().iter().zip(&actual_in).enumerate() {
        if recorded != actual {
            violations.push(InvariantViolation::InDegreeMismatch {
                user: ids[index].clone(),
                recorded,
                actual,
            });
        }
    }

    let adjacency: usize = (0..n).map(|i| graph.out_degree(i)).sum();
    if adjacency != graph.edge_count() {
        violations.push(InvariantViolation::AdjacencyMismatch {
            adjacency,
            edge_list: graph.edge_count(),
        });
    }

    if generated.stats.edges != seen.len() {
        violations.push(InvariantViolation::EdgeCountMismatch {
            reported: generated.stats.edges,
            actual: seen.len(),
        });
    }

    for (statistic, value) in [
        ("reciprocity", generated.stats.reciprocity),
        ("gini_followers", generated.stats.gini_followers),
    ] {
        if !(0.0..=1.0).contains(&value) {
            violations.push(InvariantViolation::OutOfRange { statistic, value });
        }
    }

    OracleResult::from_violations(violations)
}

/// Compare the fingerprints of two runs of the same seed.
#[must_use]
pub fn check_replay(first: &GeneratedGraph, second: &GeneratedGraph) -> OracleResult {
    let a = first.fingerprint();
    let b = second.fingerprint();
    if a == b {
        OracleResult::from_violations(Vec::new())
    } else {
        OracleResult::from_violations(vec![InvariantViolation::NonDeterministic {
            first: a,
            second: b,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::FollowGraph;
    use crate::identity::{Identity, IdentityPool};
    use crate::stats::{PassCounts, summarize};

    fn generated(n: usize, edges: &[(usize, usize)]) -> GeneratedGraph {
        let identities: Vec<Identity> = (0..n)
            .map(|index| Identity {
                index,
                name: format!("u{index}"),
                interests: ["tech", "art"],
                is_influencer: false,
                is_bot: false,
            })
            .collect();
        let ids: Vec<String> = identities.iter().map(|i| i.name.clone()).collect();
        let graph = FollowGraph::from_edges(n, edges.iter().map(|&(s, t)| DirectedEdge::new(s, t)));
        let stats = summarize(&ids, &graph, PassCounts::default(), 10);
        GeneratedGraph {
            pool: IdentityPool::from_parts(identities, ids),
            graph,
            stats,
        }
    }

    #[test]
    fn well_formed_graph_passes() {
        let g = generated(4, &[(0, 1), (1, 0), (2, 3), (3, 1)]);
        let result = check_graph(&g);
        assert!(result.passed, "{:?}", result.violations);
    }

    #[test]
    fn tampered_edge_count_is_reported() {
        let mut g = generated(3, &[(0, 1), (1, 2)]);
        g.stats.edges = 5;
        let result = check_graph(&g);
        assert!(!result.passed);
        assert_eq!(
            result.violations,
            vec![InvariantViolation::EdgeCountMismatch {
                reported: 5,
                actual: 2
            }]
        );
    }

    #[test]
    fn out_of_range_statistic_is_reported() {
        let mut g = generated(3, &[(0, 1)]);
        g.stats.reciprocity = 1.5;
        let result = check_graph(&g);
        assert!(result.violations.iter().any(|v| matches!(
            v,
            InvariantViolation::OutOfRange {
                statistic: "reciprocity",
                ..
            }
        )));
    }

    #[test]
    fn replay_detects_divergence() {
        let a = generated(3, &[(0, 1), (1, 2)]);
        let b = generated(3, &[(1, 2), (0, 1)]);
        assert!(check_replay(&a, &a.clone()).passed);
        let result = check_replay(&a, &b);
        assert!(!result.passed);
        assert!(result.violations[0].to_string().starts_with("NonDeterministic"));
    }
}
