#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::path::PathBuf;
use std::process;

use blipseed_core::config::load_config;
use clap::{CommandFactory, Parser, Subcommand};
use output::{OutputMode, coded_error, render_error, resolve_output_mode};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "blipseed: synthetic social follow-graph generator",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Output format: pretty, text or json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Config file to use instead of the user config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Generate",
        about = "Generate a follow graph and store it",
        long_about = "Create accounts and persons from the name catalogue, build a follow graph\n\
                      by preferential attachment, triadic closure and follow-backs, and write\n\
                      every edge to the store.",
        after_help = "EXAMPLES:\n    # Seed 50 users into ./blipseed.sqlite3\n    blipseed seed --users 50 --seed 7\n\n\
                      # Try parameters without writing anything\n    blipseed seed --dry-run --users 100 --avg-follows 6\n\n\
                      # Start from an empty database\n    blipseed seed --db graph.sqlite3 --reset\n\n\
                      # Machine-readable output\n    blipseed seed --dry-run --format json"
    )]
    Seed(cmd::seed::SeedArgs),

    #[command(
        next_help_heading = "Verify",
        about = "Check generated graphs across many seeds",
        long_about = "Generate one graph per seed in memory, replay it, and check the structural\n\
                      invariants. Exits with status 1 if any seed fails.",
        after_help = "EXAMPLES:\n    # 20 seeds with default parameters\n    blipseed campaign\n\n\
                      # 200 seeds of dense 100-user graphs\n    blipseed campaign --seeds 200 --users 100 --avg-follows 8\n\n\
                      # Machine-readable output\n    blipseed campaign --format json"
    )]
    Campaign(cmd::campaign::CampaignArgs),

    #[command(
        next_help_heading = "Verify",
        about = "Show statistics of a seeded database",
        long_about = "Read persons and follows back from a database and recompute the graph\n\
                      statistics and edge fingerprint.",
        after_help = "EXAMPLES:\n    # Inspect ./blipseed.sqlite3\n    blipseed inspect\n\n\
                      # Include density and component counts\n    blipseed inspect --db graph.sqlite3 --topology\n\n\
                      # Machine-readable output\n    blipseed inspect --format json"
    )]
    Inspect(cmd::inspect::InspectArgs),

    #[command(
        next_help_heading = "Shell",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Bash\n    blipseed completions bash > ~/.local/share/bash-completion/completions/blipseed\n\n\
                      # Zsh\n    blipseed completions zsh > ~/.zfunc/_blipseed"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

/// Filter used when `BLIPSEED_LOG` is unset.
const fn default_filter(verbose: bool, debug_env: bool) -> &'static str {
    if verbose || debug_env {
        "blipseed=debug,info"
    } else {
        "blipseed=info,warn"
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("BLIPSEED_LOG").unwrap_or_else(|_| {
        EnvFilter::new(default_filter(verbose, env::var("DEBUG").is_ok()))
    });

    let format = env::var("BLIPSEED_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output only
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            let output = resolve_output_mode(cli.format, cli.json, None);
            if let Some(coded) = coded_error(&err) {
                render_error(output, &coded)?;
                process::exit(1);
            }
            return Err(err);
        }
    };
    let output = resolve_output_mode(cli.format, cli.json, config.output.as_deref());
    debug!(?output, "output mode resolved");

    let command_result = match cli.command {
        Commands::Seed(ref args) => cmd::seed::run_seed(args, &config, output),
        Commands::Campaign(ref args) => cmd::campaign::run_campaign_cmd(args, &config, output),
        Commands::Inspect(ref args) => cmd::inspect::run_inspect(args, &config, output),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    };

    if let Err(err) = &command_result {
        if let Some(coded) = coded_error(err) {
            render_error(output, &coded)?;
            process::exit(1);
        }
    }

    command_result
}
