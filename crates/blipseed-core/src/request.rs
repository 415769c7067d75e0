//! Request and result records for one seed run.
//!
//! Field names serialise in camelCase so the records match the JSON the
//! user-admin service exchanges.

use serde::{Deserialize, Serialize};

use crate::catalog::{MIN_USERS, pool_capacity};
use crate::error::SeedError;
use crate::store::EdgeFailure;

/// Largest accepted `homophily_boost` / `influencer_boost`.
pub const MAX_BOOST: f64 = 1e6;

/// Parameters for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSeedRequest {
    /// Requested population; clamped to `[2, pool_capacity]`. Zero and
    /// negative values clamp up rather than fail.
    #[serde(default = "default_users")]
    pub users: i64,
    /// Seed for the run's RNG; `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Target mean out-degree of the initial pass.
    #[serde(default = "default_avg_follows")]
    pub avg_follows: f64,
    /// Weight multiplier when source and target share an interest.
    #[serde(default = "default_homophily_boost")]
    pub homophily_boost: f64,
    /// Weight multiplier when the target is an influencer.
    #[serde(default = "default_influencer_boost")]
    pub influencer_boost: f64,
    /// Probability of following each friend-of-friend.
    #[serde(default = "default_triadic_prob")]
    pub triadic_prob: f64,
    /// Probability of mirroring an edge.
    #[serde(default = "default_reciprocity_prob")]
    pub reciprocity_prob: f64,
    /// Probability that a pick ignores weights and chooses uniformly.
    #[serde(default = "default_noise_follow_prob")]
    pub noise_follow_prob: f64,
}

impl Default for GraphSeedRequest {
    fn default() -> Self {
        Self {
            users: default_users(),
            seed: None,
            avg_follows: default_avg_follows(),
            homophily_boost: default_homophily_boost(),
            influencer_boost: default_influencer_boost(),
            triadic_prob: default_triadic_prob(),
            reciprocity_prob: default_reciprocity_prob(),
            noise_follow_prob: default_noise_follow_prob(),
        }
    }
}

impl GraphSeedRequest {
    /// Population size actually generated: `users` clamped to the catalogue.
    #[must_use]
    pub fn clamped_users(&self) -> usize {
        usize::try_from(self.users).map_or(MIN_USERS, |users| users.clamp(MIN_USERS, pool_capacity()))
    }

    /// Reject parameters that would poison the weight arithmetic.
    ///
    /// Out-of-range `users` is not an error (it is clamped), and
    /// probabilities above 1 simply behave as certainty. Boosts are capped at
    /// [`MAX_BOOST`] so a target weight stays finite.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::InvalidParameter`] for the first numeric field
    /// that is NaN, infinite, or negative, or a boost above [`MAX_BOOST`].
    pub fn validate(&self) -> Result<(), SeedError> {
        let fields = [
            ("avg_follows", self.avg_follows),
            ("homophily_boost", self.homophily_boost),
            ("influencer_boost", self.influencer_boost),
            ("triadic_prob", self.triadic_prob),
            ("reciprocity_prob", self.reciprocity_prob),
            ("noise_follow_prob", self.noise_follow_prob),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(SeedError::InvalidParameter { name, value });
            }
        }
        for (name, value) in [
            ("homophily_boost", self.homophily_boost),
            ("influencer_boost", self.influencer_boost),
        ] {
            if value > MAX_BOOST {
                return Err(SeedError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

/// One entry of the most-followed list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopHub {
    pub user: String,
    pub followers: usize,
}

/// Aggregate statistics of the generated graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSeedStats {
    pub users: usize,
    pub accounts_created: usize,
    pub edges: usize,
    pub avg_out: f64,
    pub avg_in: f64,
    pub triadic_added: usize,
    pub reciprocal_added: usize,
    pub reciprocity: f64,
    pub gini_followers: f64,
    pub top_hubs: Vec<TopHub>,
}

/// What reached the store during the run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceSummary {
    pub identities_persisted: usize,
    pub edges_persisted: usize,
    pub edge_failures: Vec<EdgeFailure>,
    /// The cancellation token fired during edge persistence: the graph is
    /// complete in memory but only partially stored.
    pub cancelled: bool,
}

impl PersistenceSummary {
    /// True when every generated edge reached the store.
    #[must_use]
    pub fn is_complete(&self, edges: usize) -> bool {
        !self.cancelled && self.edge_failures.is_empty() && self.edges_persisted == edges
    }
}

/// Outcome of a seed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSeedResult {
    pub message: String,
    pub stats: GraphSeedStats,
    /// Sum of every cost reported by the persistence collaborators.
    pub total_request_charge: f64,
    pub persistence: PersistenceSummary,
    /// `blake3:<hex>` digest of the ordered edge list.
    pub edge_fingerprint: String,
}

const fn default_users() -> i64 {
    10
}

const fn default_avg_follows() -> f64 {
    1.0
}

const fn default_homophily_boost() -> f64 {
    1.8
}

const fn default_influencer_boost() -> f64 {
    4.0
}

const fn default_triadic_prob() -> f64 {
    0.12
}

const fn default_reciprocity_prob() -> f64 {
    0.28
}

const fn default_noise_follow_prob() -> f64 {
    0.02
}
