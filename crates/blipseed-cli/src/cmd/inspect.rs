//! `blipseed inspect`: recompute statistics from a seeded database.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use blipseed_core::{ErrorCode, GraphSeedStats};
use blipseed_core::config::SeedConfig;
use blipseed_core::stats::{PassCounts, TopologySummary, edge_fingerprint, summarize, topology};
use blipseed_store::{StoreCharges, StoredGraph, open_store};
use clap::Args;
use serde::Serialize;

use super::resolve_db_path;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `blipseed inspect`.
#[derive(Args, Debug, Default)]
pub struct InspectArgs {
    /// SQLite database to read.
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Number of most-followed users to report.
    #[arg(long)]
    pub top_hubs: Option<usize>,

    /// Add a structural summary (density, components) of the graph.
    #[arg(long)]
    pub topology: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectOutput {
    store: String,
    accounts: usize,
    persons: usize,
    follows: usize,
    influencers: usize,
    bots: usize,
    stats: GraphSeedStats,
    edge_fingerprint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    topology: Option<TopologySummary>,
}

fn describe(
    stored: &StoredGraph,
    accounts: usize,
    hub_limit: usize,
    with_topology: bool,
) -> (GraphSeedStats, String, Option<TopologySummary>) {
    let stats = summarize(
        &stored.external_ids,
        &stored.graph,
        PassCounts {
            accounts_created: accounts,
            ..PassCounts::default()
        },
        hub_limit,
    );
    let fingerprint = edge_fingerprint(&stored.external_ids, stored.graph.edges());
    let summary = with_topology.then(|| topology(&stored.graph));
    (stats, fingerprint, summary)
}

/// Execute `blipseed inspect`.
pub fn run_inspect(args: &InspectArgs, config: &SeedConfig, output: OutputMode) -> Result<()> {
    let path = resolve_db_path(args.db.as_deref(), config);
    if !path.exists() {
        return Err(anyhow!(
            "no store at {}; run `blipseed seed` first",
            path.display()
        )
        .context(ErrorCode::StoreUnavailable));
    }

    let store =
        open_store(&path, StoreCharges::from(&config.store)).context(ErrorCode::StoreUnavailable)?;
    let counts = store.counts()?;
    let stored = store.load_graph()?;
    let hub_limit = args.top_hubs.unwrap_or(config.generator.top_hubs);
    let (stats, edge_fingerprint, summary) =
        describe(&stored, counts.accounts, hub_limit, args.topology);

    let out = InspectOutput {
        store: path.display().to_string(),
        accounts: counts.accounts,
        persons: counts.persons,
        follows: counts.follows,
        influencers: stored.influencers,
        bots: stored.bots,
        stats,
        edge_fingerprint,
        topology: summary,
    };
    render_mode(output, &out, render_text, render_pretty)
}

fn render_text(out: &InspectOutput, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "store path={} accounts={} persons={} follows={} influencers={} bots={}",
        out.store, out.accounts, out.persons, out.follows, out.influencers, out.bots
    )?;
    writeln!(
        w,
        "graph edges={} avg_out={:.2} avg_in={:.2} reciprocity={:.3} gini_followers={:.4}",
        out.stats.edges,
        out.stats.avg_out,
        out.stats.avg_in,
        out.stats.reciprocity,
        out.stats.gini_followers
    )?;
    for hub in &out.stats.top_hubs {
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
    writeln!(w, "fingerprint {}", out.edge_fingerprint)
}

fn render_pretty(out: &InspectOutput, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Stored Graph")?;
    pretty_kv(w, "Store", &out.store)?;
    pretty_kv(
        w,
        "Rows",
        format!(
            "{} accounts, {} persons, {} follows",
            out.accounts, out.persons, out.follows
        ),
    )?;
    pretty_kv(
        w,
        "Flags",
        format!("{} influencers, {} bots", out.influencers, out.bots),
    )?;
    pretty_kv(
        w,
        "Avg out / in",
        format!("{:.2} / {:.2}", out.stats.avg_out, out.stats.avg_in),
    )?;
    pretty_kv(w, "Reciprocity", format!("{:.3}", out.stats.reciprocity))?;
    pretty_kv(w, "Gini", format!("{:.4}", out.stats.gini_followers))?;
    pretty_kv(w, "Fingerprint", &out.edge_fingerprint)?;

    if !out.stats.top_hubs.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Top Hubs")?;
        for hub in &out.stats.top_hubs {
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
