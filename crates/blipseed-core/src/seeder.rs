//! Drives one seed run end to end.

use tracing::{info, instrument, warn};

use crate::config::GeneratorConfig;
use crate::error::SeedError;
use crate::graph::FollowGraph;
use crate::identity::{IdentityPool, PoolRates};
use crate::request::{GraphSeedRequest, GraphSeedResult, GraphSeedStats, PersistenceSummary};
use crate::rng::RunRng;
use crate::selector::{SelectionWeights, SelectorParams, attach_initial_edges};
use crate::stats::{PassCounts, edge_fingerprint, summarize};
use crate::store::{CancellationToken, EdgeStore, IdentityStore, persist_edges};
use crate::{closure, reciprocity};

/// Per-call state. Never shared between runs.
struct RunContext {
    rng: RunRng,
    request: GraphSeedRequest,
}

/// A generated graph before its edges are written anywhere.
#[derive(Debug, Clone)]
pub struct GeneratedGraph {
    pub pool: IdentityPool,
    pub graph: FollowGraph,
    pub stats: GraphSeedStats,
}

impl GeneratedGraph {
    /// `blake3:<hex>` digest of the edge list in insertion order.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        edge_fingerprint(self.pool.external_ids(), self.graph.edges())
    }
}

/// Generates follow graphs for seed requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphSeeder {
    config: GeneratorConfig,
}

impl GraphSeeder {
    #[must_use]
    pub const fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Build the identity pool through `store` and generate the graph in
    /// memory. No edge is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::InvalidParameter`] for unusable request values,
    /// and propagates identity persistence failures and cancellation from
    /// [`IdentityPool::build`].
    #[instrument(skip_all, fields(users = request.clamped_users(), seed = ?request.seed))]
    pub fn generate<S: IdentityStore + ?Sized>(
        &self,
        request: &GraphSeedRequest,
        store: &mut S,
        cancel: &CancellationToken,
    ) -> Result<GeneratedGraph, SeedError> {
        request.validate()?;
        self.config_is_usable()?;

        let mut ctx = RunContext {
            rng: RunRng::new(request.seed),
            request: request.clone(),
        };
        let users = ctx.request.clamped_users();
        if usize::try_from(ctx.request.users).ok() != Some(users) {
            info!(requested = ctx.request.users, users, "user count clamped to catalogue");
        }

        let rates = PoolRates {
            bot: self.config.bot_rate,
            ..PoolRates::default()
        };
        let pool = IdentityPool::build(users, rates, &mut ctx.rng, store, cancel)?;

        let mut graph = FollowGraph::new(pool.len());
        let params = SelectorParams {
            weights: SelectionWeights {
                homophily_boost: ctx.request.homophily_boost,
                influencer_boost: ctx.request.influencer_boost,
            },
            noise_follow_prob: ctx.request.noise_follow_prob,
            avg_follows: ctx.request.avg_follows,
        };
        attach_initial_edges(&pool, &mut graph, params, &mut ctx.rng);

        let triadic_added = closure::close_triads(&mut graph, ctx.request.triadic_prob, &mut ctx.rng);
        let reciprocal_added = reciprocity::add_reciprocal_edges(
            &pool,
            &mut graph,
            ctx.request.reciprocity_prob,
            &mut ctx.rng,
        );

        let stats = summarize(
            pool.external_ids(),
            &graph,
            PassCounts {
                accounts_created: pool.len(),
                triadic_added,
                reciprocal_added,
            },
            self.config.top_hubs,
        );

        Ok(GeneratedGraph { pool, graph, stats })
    }

    /// Run the whole pipeline: identities, graph, statistics, then one edge
    /// write per edge in edge-list order.
    ///
    /// Edge write failures and cancellation during edge persistence do not
    /// fail the run; they are reported in [`GraphSeedResult::persistence`].
    ///
    /// # Errors
    ///
    /// See [`GraphSeeder::generate`].
    pub fn seed<S>(
        &self,
        request: &GraphSeedRequest,
        store: &mut S,
        cancel: &CancellationToken,
    ) -> Result<GraphSeedResult, SeedError>
    where
        S: IdentityStore + EdgeStore + ?Sized,
    {
        let generated = self.generate(request, store, cancel)?;
        Ok(self.persist(&generated, store, cancel))
    }

    /// Write the edges of `generated` and assemble the run result.
    pub fn persist<S: EdgeStore + ?Sized>(
        &self,
        generated: &GeneratedGraph,
        store: &mut S,
        cancel: &CancellationToken,
    ) -> GraphSeedResult {
        let outcome = persist_edges(
            store,
            generated.pool.external_ids(),
            generated.graph.edges(),
            cancel,
        );

        let total_request_charge = generated.pool.charge() + outcome.charge;
        let stats = generated.stats.clone();
        let message = format!(
            "Initialized {n} accounts, {n} persons and {edges} follow edges (incl. triadic + reciprocity).",
            n = stats.accounts_created,
            edges = stats.edges,
        );

        let persistence = PersistenceSummary {
            identities_persisted: generated.pool.len(),
            edges_persisted: outcome.persisted,
            edge_failures: outcome.failures,
            cancelled: outcome.cancelled,
        };
        if !persistence.is_complete(stats.edges) {
            warn!(
                persisted = persistence.edges_persisted,
                failed = persistence.edge_failures.len(),
                cancelled = persistence.cancelled,
                edges = stats.edges,
                "graph only partially persisted"
            );
        }

        info!(
            users = stats.users,
            edges = stats.edges,
            reciprocity = stats.reciprocity,
            gini = stats.gini_followers,
            charge = total_request_charge,
            "seed run finished"
        );

        GraphSeedResult {
            message,
            edge_fingerprint: generated.fingerprint(),
            stats,
            total_request_charge,
            persistence,
        }
    }

    fn config_is_usable(&self) -> Result<(), SeedError> {
        let rate = self.config.bot_rate;
        if !rate.is_finite() || rate < 0.0 {
            return Err(SeedError::InvalidParameter {
                name: "bot_rate",
                value: rate,
            });
        }
        Ok(())
    }
}
