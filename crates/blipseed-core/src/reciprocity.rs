//! Reciprocity: follow back some of the accounts that follow you.

use tracing::{debug, instrument};

use crate::graph::FollowGraph;
use crate::identity::IdentityPool;
use crate::rng::RunRng;

/// Follow-back probability multiplier applied once per influencer endpoint.
pub const INFLUENCER_DISCOUNT: f64 = 0.6;

/// Follow-back probability for the edge `source -> target`.
#[must_use]
pub fn follow_back_probability(pool: &IdentityPool, source: usize, target: usize, base: f64) -> f64 {
    let mut probability = base;
    if pool.get(source).is_influencer {
        probability *= INFLUENCER_DISCOUNT;
    }
    if pool.get(target).is_influencer {
        probability *= INFLUENCER_DISCOUNT;
    }
    probability
}

/// Mirror edges from a snapshot of the current edge list.
///
/// Runs once: edges added here are not themselves considered for mirroring.
/// Returns the number of edges added.
#[instrument(skip(pool, graph, rng))]
pub fn add_reciprocal_edges(
    pool: &IdentityPool,
    graph: &mut FollowGraph,
    reciprocity_prob: f64,
    rng: &mut RunRng,
) -> usize {
    let snapshot = graph.edges().to_vec();
    let mut added = 0;

    for edge in snapshot {
        if graph.contains(edge.target, edge.source) {
            continue;
        }

        let probability = follow_back_probability(pool, edge.source, edge.target, reciprocity_prob);
        if rng.chance(probability) && graph.insert(edge.mirrored()) {
            added += 1;
        }
    }

    debug!(added, edges = graph.edge_count(), "reciprocity pass finished");
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DirectedEdge;
    use crate::identity::Identity;

    fn pool(influencers: &[bool]) -> IdentityPool {
        let identities: Vec<Identity> = influencers
            .iter()
            .enumerate()
            .map(|(index, &is_influencer)| Identity {
                index,
                name: format!("u{index}"),
                interests: ["tech", "art"],
                is_influencer,
                is_bot: false,
            })
            .collect();
        let ids = identities.iter().map(|i| i.name.clone()).collect();
        IdentityPool::from_parts(identities, ids)
    }

    #[test]
    fn influencer_discount_applies_per_endpoint() {
        let p = pool(&[false, true, true]);
        assert!((follow_back_probability(&p, 0, 0, 0.5) - 0.5).abs() < 1e-12);
        assert!((follow_back_probability(&p, 0, 1, 0.5) - 0.3).abs() < 1e-12);
        assert!((follow_back_probability(&p, 1, 2, 0.5) - 0.18).abs() < 1e-12);
    }

    #[test]
    fn certain_reciprocity_mirrors_every_one_way_edge() {
        let p = pool(&[false, false, false]);
        let mut graph = FollowGraph::from_edges(
            3,
            [
                DirectedEdge::new(0, 1),
                DirectedEdge::new(1, 0),
                DirectedEdge::new(1, 2),
            ],
        );
        let mut rng = RunRng::new(Some(1));
        let added = add_reciprocal_edges(&p, &mut graph, 1.0, &mut rng);
        assert_eq!(added, 1);
        assert!(graph.contains(2, 1));
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.edges().last(), Some(&DirectedEdge::new(2, 1)));
    }

    #[test]
    fn zero_reciprocity_adds_nothing() {
        let p = pool(&[false, false]);
        let mut graph = FollowGraph::from_edges(2, [DirectedEdge::new(0, 1)]);
        let mut rng = RunRng::new(Some(1));
        assert_eq!(add_reciprocal_edges(&p, &mut graph, 0.0, &mut rng), 0);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn mirrored_edges_are_not_rescanned() {
        let p = pool(&[false, false]);
        let mut graph = FollowGraph::from_edges(2, [DirectedEdge::new(0, 1)]);
        let mut rng = RunRng::new(Some(1));
        assert_eq!(add_reciprocal_edges(&p, &mut graph, 1.0, &mut rng), 1);
        assert_eq!(graph.edges(), &[DirectedEdge::new(0, 1), DirectedEdge::new(1, 0)]);
    }
}
