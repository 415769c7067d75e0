//! Campaign runner: generate many seeds in memory and check each graph.
//!
//! Every seed is generated twice against a fresh [`MemoryStore`] so the
//! oracle can check determinism as well as structure. Each seed's follower
//! Gini is also compared against a baseline graph with the same population
//! and edge count whose targets are drawn uniformly at random.

use std::collections::BTreeSet;
use std::ops::Range;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::GeneratorConfig;
use crate::graph::DirectedEdge;
use crate::memory::MemoryStore;
use crate::oracle::{check_graph, check_replay};
use crate::request::GraphSeedRequest;
use crate::rng::RunRng;
use crate::seeder::GraphSeeder;
use crate::stats::gini;
use crate::store::CancellationToken;

/// Offset applied to a seed to derive the baseline generator's seed.
const BASELINE_SEED_OFFSET: u64 = 0xB45E;

/// Campaign-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Seeds to execute, e.g. `0..50`.
    pub seed_range: Range<u64>,
    /// Request used for every seed; its own `seed` field is ignored.
    pub request: GraphSeedRequest,
    pub generator: GeneratorConfig,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            seed_range: 0..20,
            request: GraphSeedRequest {
                users: 100,
                avg_follows: 3.0,
                ..GraphSeedRequest::default()
            },
            generator: GeneratorConfig::default(),
        }
    }
}

impl CampaignConfig {
    /// The request for one seed.
    #[must_use]
    pub fn request_for_seed(&self, seed: u64) -> GraphSeedRequest {
        GraphSeedRequest {
            seed: Some(seed),
            ..self.request.clone()
        }
    }

    /// Validate configuration before running.
    ///
    /// # Errors
    ///
    /// Returns an error if the seed range is empty or the request template
    /// is unusable.
    pub fn validate(&self) -> Result<()> {
        if self.seed_range.is_empty() {
            bail!("seed_range must not be empty");
        }
        self.request
            .validate()
            .context("campaign request template is invalid")?;
        Ok(())
    }
}

/// Per-seed figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub seed: u64,
    pub edges: usize,
    pub reciprocity: f64,
    pub gini_followers: f64,
    /// Follower Gini of the uniform-target baseline.
    pub baseline_gini: f64,
    pub fingerprint: String,
}

impl SeedSummary {
    /// Whether this seed's followers are more concentrated than the baseline.
    #[must_use]
    pub fn more_skewed_than_baseline(&self) -> bool {
        self.gini_followers > self.baseline_gini
    }
}

/// Failure details for a single seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFailure {
    pub seed: u64,
    pub violations: Vec<String>,
}

/// Outcome of one seed.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedRun {
    pub summary: SeedSummary,
    pub violations: Vec<String>,
}

/// Means across every seed of a campaign.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignAggregate {
    pub mean_edges: f64,
    pub mean_reciprocity: f64,
    pub mean_gini: f64,
    pub mean_baseline_gini: f64,
    /// Seeds whose follower Gini exceeds their baseline's.
    pub skewed_seeds: usize,
}

/// Aggregate report produced by a campaign run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignReport {
    pub seeds_run: usize,
    pub seeds_passed: usize,
    /// First seed that failed, for replay.
    pub first_failure: Option<u64>,
    pub failures: Vec<SeedFailure>,
    pub aggregate: CampaignAggregate,
    pub seeds: Vec<SeedSummary>,
}

impl CampaignReport {
    /// True if every seed passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run a full campaign across all seeds in the config.
///
/// # Errors
///
/// Returns an error if config validation fails or a seed cannot be
/// generated at all.
pub fn run_campaign(config: &CampaignConfig) -> Result<CampaignReport> {
    config.validate()?;

    let mut seeds_passed = 0_usize;
    let mut first_failure = None;
    let mut failures = Vec::new();
    let mut seeds = Vec::new();

    for seed in config.seed_range.clone() {
        let run = run_single_seed(seed, config)?;
        if run.violations.is_empty() {
            seeds_passed += 1;
        } else {
            first_failure.get_or_insert(seed);
            failures.push(SeedFailure {
                seed,
                violations: run.violations,
            });
        }
        seeds.push(run.summary);
    }

    let aggregate = aggregate(&seeds);
    info!(
        seeds = seeds.len(),
        passed = seeds_passed,
        skewed = aggregate.skewed_seeds,
        "campaign finished"
    );

    Ok(CampaignReport {
        seeds_run: seeds.len(),
        seeds_passed,
        first_failure,
        failures,
        aggregate,
        seeds,
    })
}

/// Generate one seed twice and run the oracle over it.
///
/// # Errors
///
/// Returns an error if generation itself fails (invalid parameters).
/// Invariant violations are reported in [`SeedRun::violations`].
pub fn run_single_seed(seed: u64, config: &CampaignConfig) -> Result<SeedRun> {
    let seeder = GraphSeeder::new(config.generator);
    let request = config.request_for_seed(seed);
    let cancel = CancellationToken::new();

    let first = seeder
        .generate(&request, &mut MemoryStore::default(), &cancel)
        .with_context(|| format!("seed {seed} failed to generate"))?;
    let second = seeder
        .generate(&request, &mut MemoryStore::default(), &cancel)
        .with_context(|| format!("seed {seed} failed to replay"))?;

    let mut violations: Vec<String> = check_graph(&first)
        .violations
        .iter()
        .map(ToString::to_string)
        .collect();
    violations.extend(
        check_replay(&first, &second)
            .violations
            .iter()
            .map(ToString::to_string),
    );

    let mut baseline_rng = RunRng::new(Some(seed.wrapping_add(BASELINE_SEED_OFFSET)));
    let baseline = uniform_in_degrees(
        first.graph.node_count(),
        first.graph.edge_count(),
        &mut baseline_rng,
    );

    let summary = SeedSummary {
        seed,
        edges: first.stats.edges,
        reciprocity: first.stats.reciprocity,
        gini_followers: first.stats.gini_followers,
        baseline_gini: gini(&baseline),
        fingerprint: first.fingerprint(),
    };
    debug!(
        seed,
        edges = summary.edges,
        gini = summary.gini_followers,
        baseline = summary.baseline_gini,
        violations = violations.len(),
        "seed checked"
    );

    Ok(SeedRun {
        summary,
        violations,
    })
}

/// In-degrees of a simple directed graph with `edges` distinct edges whose
/// endpoints are drawn uniformly from `0..n`.
///
/// `edges` is capped at `n * (n - 1)`.
#[must_use]
pub fn uniform_in_degrees(n: usize, edges: usize, rng: &mut RunRng) -> Vec<usize> {
    let mut in_degree = vec![0; n];
    let capacity = n.saturating_mul(n.saturating_sub(1));
    let wanted = edges.min(capacity);
    let mut placed = BTreeSet::new();

    while placed.len() < wanted {
        let source = rng.next_index(n);
        let target = rng.next_index(n);
        if source != target && placed.insert(DirectedEdge::new(source, target)) {
            in_degree[target] += 1;
        }
    }
    in_degree
}

#[allow(clippy::cast_precision_loss)]
fn aggregate(seeds: &[SeedSummary]) -> CampaignAggregate {
    if seeds.is_empty() {
        return CampaignAggregate::default();
    }
    let count = seeds.len() as f64;
    let mean = |f: fn(&SeedSummary) -> f64| seeds.iter().map(f).sum::<f64>() / count;

    CampaignAggregate {
        mean_edges: mean(|s| s.edges as f64),
        mean_reciprocity: mean(|s| s.reciprocity),
        mean_gini: mean(|s| s.gini_followers),
        mean_baseline_gini: mean(|s| s.baseline_gini),
        skewed_seeds: seeds.iter().filter(|s| s.more_skewed_than_baseline()).count(),
    }
}
