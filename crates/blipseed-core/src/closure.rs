//! Triadic closure: follow some of the accounts your follows follow.

use std::collections::BTreeSet;

use tracing::{debug, instrument};

use crate::graph::{DirectedEdge, FollowGraph};
use crate::rng::RunRng;

/// Friends of friends of `source` that it does not follow yet.
#[must_use]
pub fn friends_of_friends(graph: &FollowGraph, source: usize) -> BTreeSet<usize> {
    let mut candidates = BTreeSet::new();
    for &friend in graph.out_edges(source) {
        for &candidate in graph.out_edges(friend) {
            if candidate != source && !graph.contains(source, candidate) {
                candidates.insert(candidate);
            }
        }
    }
    candidates
}

/// Add `source -> w` for each friend-of-friend `w` with probability
/// `triadic_prob`, visiting sources in index order. Returns the number of
/// edges added.
///
/// Each source's candidate set is taken before any of its own closures are
/// added; edges added for earlier sources are visible to later ones.
#[instrument(skip(graph, rng))]
pub fn close_triads(graph: &mut FollowGraph, triadic_prob: f64, rng: &mut RunRng) -> usize {
    let mut added = 0;

    for source in 0..graph.node_count() {
        for candidate in friends_of_friends(graph, source) {
            if !rng.chance(triadic_prob) {
                continue;
            }
            if graph.insert(DirectedEdge::new(source, candidate)) {
                added += 1;
            }
        }
    }

    debug!(added, edges = graph.edge_count(), "triadic closure finished");
    added
}
