#![warn(missing_docs)]
//! SweepBench CLI Library
//!
//! This module provides the command-line harness for benchmark binaries.
//! Build a suite, then hand it to `sweepbench::run()` (or
//! `sweepbench_cli::run()`) in your main function to get filtering, listing,
//! configuration and progress output.
//!
//! # Example
//!
//! ```ignore
//! use sweepbench::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let suite = Suite::builder(Store::default())
//!         .param("Size", [10, 100], |s: &mut Store, v: u32| s.size = v)
//!         .case(CaseSpec::new("insert").arg(1024), |s, args| s.insert(args.get(0)?))
//!         .build()?;
//!     sweepbench_cli::run(suite)
//! }
//! ```

mod config;
mod executor;
mod planner;

pub use config::*;
pub use executor::{Orchestrator, format_plan};
pub use planner::{ExecutionPlan, build_plan};

use anyhow::Context;
use clap::{Parser, Subcommand};
use regex::Regex;
use std::net::SocketAddr;
use std::path::Path;
use sweepbench_core::Suite;
use sweepbench_metrics::CounterRegistry;
use sweepbench_report::Reporter;

/// Banner printed before a run
pub const START_BANNER: &str = "---Benchmark---";
/// Banner printed after a successful run
pub const END_BANNER: &str = "---Benchmark complete---";

/// SweepBench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "sweepbench")]
#[command(author, version, about = "SweepBench - parameter sweep load runner")]
pub struct Cli {
    /// Optional subcommand (List, Run); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Filter cases by regex pattern
    #[arg(default_value = ".*")]
    pub filter: String,

    /// Seconds each case keeps running per combination and argument tuple
    #[arg(short = 't', long)]
    pub case_run_time: Option<u64>,

    /// Plain lines instead of a progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Serve counters at http://0.0.0.0:PORT/metrics during the run
    #[arg(long)]
    pub metrics_port: Option<u16>,

    /// Dry run - list the plan without executing
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Internal: Absorb cargo bench's --bench flag
    #[arg(long, hide = true)]
    pub bench: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// List combinations and selected cases
    List,
    /// Run the suite (default)
    Run,
}

/// Run the SweepBench CLI over `suite` with the process arguments.
/// This is the main entry point for benchmark binaries.
pub fn run<T>(mut suite: Suite<T>) -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli, &mut suite, None)
}

/// Like [`run`], and serve `metrics` over HTTP while the suite runs when a
/// metrics port is configured.
pub fn run_with_metrics<T>(mut suite: Suite<T>, metrics: &CounterRegistry) -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli, &mut suite, Some(metrics))
}

/// Run the SweepBench CLI with pre-parsed arguments.
pub fn run_with_cli<T>(
    cli: Cli,
    suite: &mut Suite<T>,
    metrics: Option<&CounterRegistry>,
) -> anyhow::Result<()> {
    run_from(cli, suite, metrics, None)
}

/// `config_dir` is where `sweep.toml` discovery starts; the working
/// directory when `None`
fn run_from<T>(
    cli: Cli,
    suite: &mut Suite<T>,
    metrics: Option<&CounterRegistry>,
    config_dir: Option<&Path>,
) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    let filter = Regex::new(&cli.filter)
        .with_context(|| format!("invalid case filter `{}`", cli.filter))?;
    let plan = build_plan(suite, Some(&filter));

    match cli.command {
        Some(Commands::List) => list_plan(suite, &plan),
        Some(Commands::Run) => run_plan(&cli, suite, &plan, metrics, config_dir)?,
        None => {
            // Default: run the suite
            if cli.dry_run {
                list_plan(suite, &plan);
            } else {
                run_plan(&cli, suite, &plan, metrics, config_dir)?;
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "sweepbench=debug"
    } else {
        "sweepbench=info"
    };
    // Stdout belongs to the console sink
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn list_plan<T>(suite: &Suite<T>, plan: &ExecutionPlan) {
    print!("{}", format_plan(suite, plan));
}

fn run_plan<T>(
    cli: &Cli,
    suite: &mut Suite<T>,
    plan: &ExecutionPlan,
    metrics: Option<&CounterRegistry>,
    config_dir: Option<&Path>,
) -> anyhow::Result<()> {
    // Discover sweep.toml configuration (CLI flags override)
    let discovered = match config_dir {
        Some(dir) => SweepConfig::discover_from(dir)?,
        None => SweepConfig::discover()?,
    };
    let config = discovered.unwrap_or_default();
    let budget = config.budget(cli.case_run_time)?;

    if plan.is_empty() {
        println!("No cases matched.");
        return Ok(());
    }

    let _server = match (config.metrics_port(cli.metrics_port), metrics) {
        (Some(port), Some(metrics)) => Some(
            metrics
                .serve(SocketAddr::from(([0, 0, 0, 0], port)))
                .with_context(|| format!("cannot serve metrics on port {}", port))?,
        ),
        (Some(port), None) => {
            tracing::warn!(port, "metrics port set but the suite has no counter registry");
            None
        }
        (None, _) => None,
    };

    let reporter = if config.progress(cli.no_progress) {
        Reporter::progress()
    } else {
        Reporter::stdout()
    };

    println!("{}", START_BANNER);
    Orchestrator::new(budget, reporter).run(suite, plan)?;
    println!("{}", END_BANNER);
    Ok(())
}
