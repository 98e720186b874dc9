#![warn(missing_docs)]
//! # SweepBench
//!
//! Parameter-sweep soak benchmarking for Rust: run every case of a suite
//! against every combination of declared parameter values, each for a fixed
//! wall-clock budget.
//!
//! SweepBench drives sustained load rather than measuring it:
//! - **Parameter Sweeps**: Cartesian product of declared value domains, in a stable order
//! - **Lifecycle Hooks**: Global setup/cleanup once per run, case hooks around every timed loop
//! - **Eager Validation**: Hook bindings and argument tuples are checked before anything runs
//! - **Blocking or Async Bodies**: Async bodies are awaited one at a time on a current-thread runtime
//! - **Counters**: Optional prometheus counters handed to the target by the caller, scrapeable during a run
//!
//! ## Quick Start
//!
//! ```ignore
//! use sweepbench::prelude::*;
//!
//! #[derive(Default)]
//! struct Store { size: u32 }
//!
//! fn main() -> anyhow::Result<()> {
//!     let suite = Suite::builder(Store::default())
//!         .param("Size", [10, 100], |s: &mut Store, v: u32| s.size = v)
//!         .case(CaseSpec::new("insert").arg(1024), |s, args| {
//!             let bytes: usize = args.get(0)?;
//!             s.insert(bytes)
//!         })
//!         .build()?;
//!     sweepbench::run(suite)
//! }
//! ```
//!
//! ## Async Cases
//!
//! ```ignore
//! .case_async(CaseSpec::new("replace").arg(1024), |s, args| {
//!     async move { s.replace(args.get(0)?).await }.boxed_local()
//! })
//! ```

// Re-export core types
pub use sweepbench_core::{
    Args, Case, CaseId, CaseSpec, Combination, Completion, ConfigError, FromLiteral, Hook,
    HookRole, Literal, ParamDecl, Procedure, RunBudget, RunError, Signature, Stage, Suite, SuiteBuilder, Value,
    ValueKind, args, expand, run_timed_loop,
};

// Re-export reporting
pub use sweepbench_report::{
    ConsoleSink, MemorySink, Phase, ProgressSink, Reporter, StdoutSink, format_line,
};

// Re-export metrics
pub use sweepbench_metrics::{CounterRegistry, MetricsError, MetricsServer};

// Re-export the harness
pub use sweepbench_cli::{
    Cli, Commands, ExecutionPlan, Orchestrator, SweepConfig, build_plan, format_plan,
    run_with_cli, run_with_metrics,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Args, CaseSpec, CounterRegistry, RunBudget, Signature, Suite, ValueKind, args,
    };
    pub use futures::future::{FutureExt, LocalBoxFuture};
}

/// Run the SweepBench CLI harness over a suite.
///
/// Call this from your benchmark binary's `main()`:
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     sweepbench::run(build_suite()?)
/// }
/// ```
pub use sweepbench_cli::run;
