//! `blipseed seed`: generate a follow graph and write it to a store.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use blipseed_core::config::SeedConfig;
use blipseed_core::memory::MemoryStore;
use blipseed_core::stats::{TopologySummary, topology};
use blipseed_core::{
    CancellationToken, EdgeStore, ErrorCode, GraphSeedResult, GraphSeeder, IdentityStore,
    SeedError,
};
use blipseed_store::{StoreCharges, open_store};
use clap::Args;
use serde::Serialize;
use tracing::info;

use super::{RequestArgs, resolve_db_path};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `blipseed seed`.
#[derive(Args, Debug, Default)]
pub struct SeedArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Seed for the random generator. Omit for a fresh graph every run.
    #[arg(long)]
    pub seed: Option<u64>,

    /// SQLite database to write.
    #[arg(long, conflicts_with = "dry_run")]
    pub db: Option<PathBuf>,

    /// Generate against an in-memory store; nothing touches disk.
    #[arg(long)]
    pub dry_run: bool,

    /// Delete existing accounts, persons and follows first.
    #[arg(long, conflicts_with = "dry_run")]
    pub reset: bool,

    /// Add a structural summary (density, components) of the graph.
    #[arg(long)]
    pub topology: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeedOutput {
    /// `memory` or the database path.
    store: String,
    #[serde(flatten)]
    result: GraphSeedResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    topology: Option<TopologySummary>,
}

fn seed_into<S>(
    seeder: &GraphSeeder,
    args: &SeedArgs,
    config: &SeedConfig,
    store: &mut S,
) -> Result<(GraphSeedResult, Option<TopologySummary>), SeedError>
where
    S: IdentityStore + EdgeStore,
{
    let request = args.request.to_request(config, args.seed);
    let cancel = CancellationToken::new();
    let generated = seeder.generate(&request, store, &cancel)?;
    let summary = args.topology.then(|| topology(&generated.graph));
    Ok((seeder.persist(&generated, store, &cancel), summary))
}

/// Execute `blipseed seed`.
pub fn run_seed(args: &SeedArgs, config: &SeedConfig, output: OutputMode) -> Result<()> {
    let seeder = GraphSeeder::new(args.request.to_generator(config));

    let (label, (result, summary)) = if args.dry_run {
        let charges = StoreCharges::from(&config.store);
        let mut store = MemoryStore::with_charges(charges.account + charges.person, charges.follow);
        ("memory".to_string(), seed_into(&seeder, args, config, &mut store)?)
    } else {
        let path = resolve_db_path(args.db.as_deref(), config);
        let mut store = open_store(&path, StoreCharges::from(&config.store))
            .context(ErrorCode::StoreUnavailable)?;
        if args.reset {
            let removed = store.reset()?;
            info!(
                accounts = removed.accounts,
                persons = removed.persons,
                follows = removed.follows,
                "store reset"
            );
        }
        (
            path.display().to_string(),
            seed_into(&seeder, args, config, &mut store)?,
        )
    };

    let out = SeedOutput {
        store: label,
        result,
        topology: summary,
    };
    render_mode(output, &out, render_text, render_pretty)
}

fn render_text(out: &SeedOutput, w: &mut dyn Write) -> io::Result<()> {
    let stats = &out.result.stats;
    let persistence = &out.result.persistence;
    writeln!(
        w,
        "seed users={} edges={} avg_out={:.2} avg_in={:.2} reciprocity={:.3} gini_followers={:.4}",
        stats.users, stats.edges, stats.avg_out, stats.avg_in, stats.reciprocity, stats.gini_followers
    )?;
    writeln!(
        w,
        "passes triadic_added={} reciprocal_added={}",
        stats.triadic_added, stats.reciprocal_added
    )?;
    writeln!(
        w,
        "store target={} identities={} edges={} failures={} cancelled={} charge={}",
        out.store,
        persistence.identities_persisted,
        persistence.edges_persisted,
        persistence.edge_failures.len(),
        persistence.cancelled,
        out.result.total_request_charge
    )?;
    for failure in &persistence.edge_failures {
        writeln!(
            w,
            "edge_failure source={} target={} reason={:?}",
            failure.source, failure.target, failure.reason
        )?;
    }
    for hub in &stats.top_hubs {
        writeln!(w, "hub user={} followers={}", hub.user, hub.followers)?;
    }
    if let Some(topology) = &out.topology {
        writeln!(
            w,
            "topology density={:.4} weak_components={} isolated={} max_in={} max_out={} mutual_pairs={}",
            topology.density,
            topology.weak_components,
            topology.isolated,
            topology.max_in_degree,
            topology.max_out_degree,
            topology.mutual_pairs
        )?;
    }
    writeln!(w, "fingerprint {}", out.result.edge_fingerprint)
}

fn render_pretty(out: &SeedOutput, w: &mut dyn Write) -> io::Result<()> {
    let stats = &out.result.stats;
    let persistence = &out.result.persistence;

    pretty_section(w, "Seed Run")?;
    writeln!(w, "{}", out.result.message)?;
    writeln!(w)?;
    pretty_kv(w, "Store", &out.store)?;
    pretty_kv(w, "Users", stats.users.to_string())?;
    pretty_kv(w, "Edges", stats.edges.to_string())?;
    pretty_kv(w, "Avg out / in", format!("{:.2} / {:.2}", stats.avg_out, stats.avg_in))?;
    pretty_kv(
        w,
        "Passes",
        format!(
            "+{} triadic, +{} follow-back",
            stats.triadic_added, stats.reciprocal_added
        ),
    )?;
    pretty_kv(w, "Reciprocity", format!("{:.3}", stats.reciprocity))?;
    pretty_kv(w, "Gini", format!("{:.4}", stats.gini_followers))?;
    pretty_kv(w, "Charge", format!("{}", out.result.total_request_charge))?;
    pretty_kv(w, "Fingerprint", &out.result.edge_fingerprint)?;

    if !persistence.is_complete(stats.edges) {
        pretty_kv(
            w,
            "Persisted",
            format!(
                "{} of {} edges ({} failed{})",
                persistence.edges_persisted,
                stats.edges,
                persistence.edge_failures.len(),
                if persistence.cancelled { ", cancelled" } else { "" }
            ),
        )?;
    }

    if !stats.top_hubs.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Top Hubs")?;
        for hub in &stats.top_hubs {
            writeln!(w, "{:<20} {}", hub.user, hub.followers)?;
        }
    }

    if let Some(topology) = &out.topology {
        writeln!(w)?;
        pretty_section(w, "Topology")?;
        pretty_kv(w, "Density", format!("{:.4}", topology.density))?;
        pretty_kv(w, "Components", topology.weak_components.to_string())?;
        pretty_kv(w, "Isolated", topology.isolated.to_string())?;
        pretty_kv(
            w,
            "Max in / out",
            format!("{} / {}", topology.max_in_degree, topology.max_out_degree),
        )?;
        pretty_kv(w, "Mutual pairs", topology.mutual_pairs.to_string())?;
    }
    Ok(())
}
