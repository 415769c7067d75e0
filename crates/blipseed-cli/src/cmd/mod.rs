pub mod campaign;
pub mod completions;
pub mod inspect;
pub mod seed;

use std::path::{Path, PathBuf};

use blipseed_core::GraphSeedRequest;
use blipseed_core::config::{GeneratorConfig, SeedConfig};
use clap::Args;

/// Database used when neither `--db` nor `[store] path` is given.
pub const DEFAULT_DB_FILE: &str = "blipseed.sqlite3";

/// Generation parameters shared by `seed` and `campaign`.
///
/// Anything left unset falls back to `[defaults]` in the config file, then
/// to the built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct RequestArgs {
    /// Number of users to create (clamped to 2..=100).
    #[arg(long, allow_negative_numbers = true)]
    pub users: Option<i64>,

    /// Target mean out-degree of the initial attachment pass.
    #[arg(long)]
    pub avg_follows: Option<f64>,

    /// Weight multiplier for targets sharing an interest.
    #[arg(long)]
    pub homophily_boost: Option<f64>,

    /// Weight multiplier for influencer targets.
    #[arg(long)]
    pub influencer_boost: Option<f64>,

    /// Probability of following each friend of a friend.
    #[arg(long)]
    pub triadic_prob: Option<f64>,

    /// Probability of following back.
    #[arg(long)]
    pub reciprocity_prob: Option<f64>,

    /// Probability that a pick ignores weights.
    #[arg(long)]
    pub noise_follow_prob: Option<f64>,

    /// Probability that a user is a bot.
    #[arg(long)]
    pub bot_rate: Option<f64>,

    /// Number of most-followed users to report.
    #[arg(long)]
    pub top_hubs: Option<usize>,
}

impl RequestArgs {
    /// Merge flags over the config defaults.
    pub fn to_request(&self, config: &SeedConfig, seed: Option<u64>) -> GraphSeedRequest {
        let base = &config.defaults;
        GraphSeedRequest {
            users: self.users.unwrap_or(base.users),
            seed: seed.or(base.seed),
            avg_follows: self.avg_follows.unwrap_or(base.avg_follows),
            homophily_boost: self.homophily_boost.unwrap_or(base.homophily_boost),
            influencer_boost: self.influencer_boost.unwrap_or(base.influencer_boost),
            triadic_prob: self.triadic_prob.unwrap_or(base.triadic_prob),
            reciprocity_prob: self.reciprocity_prob.unwrap_or(base.reciprocity_prob),
            noise_follow_prob: self.noise_follow_prob.unwrap_or(base.noise_follow_prob),
        }
    }

    /// Merge `--bot-rate` and `--top-hubs` over `[generator]`.
    pub fn to_generator(&self, config: &SeedConfig) -> GeneratorConfig {
        GeneratorConfig {
            bot_rate: self.bot_rate.unwrap_or(config.generator.bot_rate),
            top_hubs: self.top_hubs.unwrap_or(config.generator.top_hubs),
        }
    }
}

/// `--db`, else `[store] path`, else [`DEFAULT_DB_FILE`] in the working
/// directory.
pub fn resolve_db_path(flag: Option<&Path>, config: &SeedConfig) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| config.store.path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE))
}
