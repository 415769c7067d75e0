//! Initial edge attachment by attribute-weighted streaming selection.
//!
//! # Algorithm
//!
//! For each source, in index order, draw a target out-degree and pick
//! targets until it is reached or the attempt guard
//! (`desired * 8 + 64`) runs out. Each pick is either:
//!
//! - a **noise pick** (probability `noise_follow_prob`): a uniform target,
//!   rejected if it is the source or already followed; or
//! - a **weighted pick**: one pass over every eligible candidate `j` with
//!
//!   `w(i, j) = (1 + in_degree[j]) * homophily^[shared interest]
//!            * influencer^[j is influencer] * 0.7^[j is bot]`
//!
//!   keeping a running total and replacing the current choice with `j` with
//!   probability `w / running_total`.
//!
//! The accept rule compares each weight against the *running* total, and
//! it draws one uniform value per eligible candidate. Both the rule and the
//! draw order are part of the seeded output: changing either changes every
//! graph generated from a given seed.
//!
//! # Performance
//!
//! A weighted pick visits every node, so the pass is `O(N * avg_out * N)`
//! in the worst case.

use tracing::{debug, instrument, trace};

use crate::degree::DegreeSampler;
use crate::graph::{DirectedEdge, FollowGraph};
use crate::identity::{Identity, IdentityPool};
use crate::rng::RunRng;

const BOT_PENALTY: f64 = 0.7;
const GUARD_PER_EDGE: usize = 8;
const GUARD_BASE: usize = 64;

/// Attribute multipliers for the weighted pick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionWeights {
    pub homophily_boost: f64,
    pub influencer_boost: f64,
}

/// Parameters of the initial attachment pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectorParams {
    pub weights: SelectionWeights,
    pub noise_follow_prob: f64,
    pub avg_follows: f64,
}

/// Selection weight of `target` for `source` given its current in-degree.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn target_weight(
    source: &Identity,
    target: &Identity,
    target_in_degree: usize,
    weights: SelectionWeights,
) -> f64 {
    if source.index == target.index {
        return 0.0;
    }

    let mut weight = 1.0 + target_in_degree as f64;
    if source.shares_interest(target) {
        weight *= weights.homophily_boost;
    }
    if target.is_influencer {
        weight *= weights.influencer_boost;
    }
    if target.is_bot {
        weight *= BOT_PENALTY;
    }
    weight
}

/// One streaming weighted pick for `source`.
///
/// Returns `None` when no candidate with positive weight is left.
pub fn pick_weighted(
    source: usize,
    pool: &IdentityPool,
    graph: &FollowGraph,
    weights: SelectionWeights,
    rng: &mut RunRng,
) -> Option<usize> {
    let src = pool.get(source);
    let mut total = 0.0;
    let mut picked = None;

    for candidate in pool.identities() {
        let j = candidate.index;
        if j == source || graph.contains(source, j) {
            continue;
        }

        let weight = target_weight(src, candidate, graph.in_degree(j), weights);
        if weight <= 0.0 {
            continue;
        }

        total += weight;
        if rng.next_f64() < weight / total {
            picked = Some(j);
        }
    }

    picked
}

/// Run the initial attachment pass over every identity.
///
/// Guard exhaustion is not an error: the identity simply ends up with fewer
/// out-edges than it wanted.
#[instrument(skip_all, fields(users = pool.len()))]
pub fn attach_initial_edges(
    pool: &IdentityPool,
    graph: &mut FollowGraph,
    params: SelectorParams,
    rng: &mut RunRng,
) {
    let n = pool.len();
    let sampler = DegreeSampler::new(params.avg_follows, n);
    let mut short = 0_usize;

    for source in 0..n {
        let desired = sampler.sample(rng);
        let max_guard = desired * GUARD_PER_EDGE + GUARD_BASE;
        let mut guard = 0;

        while graph.out_degree(source) < desired && guard < max_guard {
            guard += 1;

            let target = if rng.chance(params.noise_follow_prob) {
                let target = rng.next_index(n);
                if target == source || graph.contains(source, target) {
                    continue;
                }
                target
            } else {
                match pick_weighted(source, pool, graph, params.weights, rng) {
                    Some(target) => target,
                    None => break,
                }
            };

            graph.insert(DirectedEdge::new(source, target));
        }

        if graph.out_degree(source) < desired {
            short += 1;
            trace!(
                source,
                desired,
                got = graph.out_degree(source),
                "out-degree target not reached"
            );
        }
    }

    debug!(
        edges = graph.edge_count(),
        max_out = sampler.max_out(),
        short,
        "initial attachment finished"
    );
}
