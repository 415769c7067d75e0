//! `blipseed campaign`: generate many seeds in memory and check each graph.

use std::io::{self, Write};
use std::process;

use anyhow::Result;
use blipseed_core::campaign::{CampaignConfig, CampaignReport, run_campaign};
use blipseed_core::config::SeedConfig;
use clap::Args;

use super::RequestArgs;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Failures listed in full before the rest are summarized.
const FAILURE_SAMPLE: usize = 5;

/// Arguments for `blipseed campaign`.
#[derive(Args, Debug)]
pub struct CampaignArgs {
    /// Number of seeds to run.
    #[arg(long, default_value = "20")]
    pub seeds: u64,

    /// Starting seed value.
    #[arg(long, default_value = "0")]
    pub seed_start: u64,

    #[command(flatten)]
    pub request: RequestArgs,
}

fn build_campaign_config(args: &CampaignArgs, config: &SeedConfig) -> CampaignConfig {
    CampaignConfig {
        seed_range: args.seed_start..args.seed_start.saturating_add(args.seeds),
        request: args.request.to_request(config, None),
        generator: args.request.to_generator(config),
    }
}

/// Execute `blipseed campaign`.
///
/// Exits with status 1 when any seed violates an invariant.
pub fn run_campaign_cmd(args: &CampaignArgs, config: &SeedConfig, output: OutputMode) -> Result<()> {
    let campaign = build_campaign_config(args, config);
    let report = run_campaign(&campaign)?;

    render_mode(output, &report, render_text, |report, w| {
        render_pretty(report, &campaign, w)
    })?;

    if !report.all_passed() {
        process::exit(1);
    }
    Ok(())
}

fn render_text(report: &CampaignReport, w: &mut dyn Write) -> io::Result<()> {
    let agg = &report.aggregate;
    writeln!(
        w,
        "campaign seeds_run={} passed={} failed={} all_passed={}",
        report.seeds_run,
        report.seeds_passed,
        report.failures.len(),
        report.all_passed()
    )?;
    writeln!(
        w,
        "aggregate mean_edges={:.2} mean_reciprocity={:.3} mean_gini={:.4} mean_baseline_gini={:.4} skewed_seeds={}",
        agg.mean_edges, agg.mean_reciprocity, agg.mean_gini, agg.mean_baseline_gini, agg.skewed_seeds
    )?;
    for seed in &report.seeds {
        writeln!(
            w,
            "seed seed={} edges={} reciprocity={:.3} gini={:.4} baseline_gini={:.4}",
            seed.seed, seed.edges, seed.reciprocity, seed.gini_followers, seed.baseline_gini
        )?;
    }
    for failure in report.failures.iter().take(FAILURE_SAMPLE) {
        writeln!(
            w,
            "failure seed={} violations={}",
            failure.seed,
            failure.violations.len()
        )?;
    }
    if report.failures.len() > FAILURE_SAMPLE {
        writeln!(
            w,
            "failures_truncated count={}",
            report.failures.len() - FAILURE_SAMPLE
        )?;
    }
    if let Some(seed) = report.first_failure {
        writeln!(w, "hint replay_seed={seed}")?;
    }
    Ok(())
}

fn render_pretty(
    report: &CampaignReport,
    campaign: &CampaignConfig,
    w: &mut dyn Write,
) -> io::Result<()> {
    let agg = &report.aggregate;
    pretty_section(w, "Seed Campaign")?;
    pretty_kv(
        w,
        "Seeds",
        format!(
            "{} ({}..{})",
            report.seeds_run, campaign.seed_range.start, campaign.seed_range.end
        ),
    )?;
    pretty_kv(w, "Users", campaign.request.clamped_users().to_string())?;
    pretty_kv(w, "Avg follows", campaign.request.avg_follows.to_string())?;
    pretty_kv(
        w,
        "Results",
        format!(
            "{} passed / {} failed",
            report.seeds_passed,
            report.failures.len()
        ),
    )?;
    pretty_kv(w, "Mean edges", format!("{:.2}", agg.mean_edges))?;
    pretty_kv(w, "Mean recip.", format!("{:.3}", agg.mean_reciprocity))?;
    pretty_kv(
        w,
        "Mean Gini",
        format!(
            "{:.4} (uniform baseline {:.4})",
            agg.mean_gini, agg.mean_baseline_gini
        ),
    )?;
    pretty_kv(
        w,
        "Skewed seeds",
        format!("{} of {}", agg.skewed_seeds, report.seeds_run),
    )?;

    match report.first_failure {
        None => pretty_kv(w, "Status", "all seeds passed")?,
        Some(first) => {
            pretty_kv(
                w,
                "Status",
                format!("{} failures (first at seed {first})", report.failures.len()),
            )?;
            writeln!(w)?;
            pretty_section(w, "Failure Samples")?;
            for failure in report.failures.iter().take(FAILURE_SAMPLE) {
                writeln!(
                    w,
                    "seed {:<8} violations={}",
                    failure.seed,
                    failure.violations.len()
                )?;
                for violation in &failure.violations {
                    writeln!(w, "  - {violation}")?;
                }
            }
            if report.failures.len() > FAILURE_SAMPLE {
                writeln!(
                    w,
                    "... and {} more failures",
                    report.failures.len() - FAILURE_SAMPLE
                )?;
            }
            writeln!(w)?;
            pretty_kv(
                w,
                "Replay",
                format!(
                    "blipseed seed --dry-run --seed {first} --users {}",
                    campaign.request.clamped_users()
                ),
            )?;
        }
    }
    Ok(())
}
