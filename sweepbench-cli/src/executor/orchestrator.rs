//! Lifecycle Orchestration
//!
//! Drives one suite through its phases:
//!
//! ```text
//! GlobalSetup
//!     │
//!     ▼
//! for combination ─► assign values
//!     for case ─► for tuple ─► setup hooks ─► timed loop ─► cleanup hooks
//!     │
//!     ▼
//! GlobalCleanup
//! ```
//!
//! The first failure ends the run. Nothing after it executes, cleanup included.

use crate::planner::ExecutionPlan;
use sweepbench_core::{HookRole, RunBudget, RunError, Suite};
use sweepbench_report::{Phase, Reporter};

/// Runs a planned suite against a budget, narrating through a reporter
#[derive(Debug)]
pub struct Orchestrator {
    budget: RunBudget,
    reporter: Reporter,
}

impl Orchestrator {
    /// Create an orchestrator
    pub fn new(budget: RunBudget, reporter: Reporter) -> Self {
        Self { budget, reporter }
    }

    /// Run to completion on a fresh single-threaded runtime
    pub fn run<T>(&mut self, suite: &mut Suite<T>, plan: &ExecutionPlan) -> Result<(), RunError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        rt.block_on(self.run_async(suite, plan))
    }

    /// Run to completion on the caller's runtime
    pub async fn run_async<T>(
        &mut self,
        suite: &mut Suite<T>,
        plan: &ExecutionPlan,
    ) -> Result<(), RunError> {
        tracing::info!(
            combinations = plan.combinations,
            cases = plan.cases.len(),
            loops = plan.planned_loops,
            budget = ?self.budget.as_duration(),
            "starting run"
        );
        self.reporter.begin(plan.planned_loops);

        tracing::info!(hooks = suite.global_setup_hooks().len(), "global setup");
        suite.run_global_setup().await?;

        for combination in suite.combinations() {
            let label = suite.label(&combination);
            tracing::info!(%label, "combination");
            suite.assign(&combination);

            for &id in &plan.cases {
                let name = suite.case(id).name().to_string();
                let invocations = suite.case(id).invocations();
                for args in invocations {
                    let shown = args.to_string();
                    self.reporter.phase(&label, &name, &shown, Phase::Start);
                    suite
                        .run_case_hooks(id, HookRole::Setup, &args, &label)
                        .await?;
                    self.reporter
                        .phase(&label, &name, &shown, Phase::SetupComplete);

                    self.reporter.phase(&label, &name, &shown, Phase::Running);
                    suite.run_case_loop(id, &args, self.budget, &label).await?;
                    self.reporter.phase(&label, &name, &shown, Phase::Finished);

                    self.reporter
                        .phase(&label, &name, &shown, Phase::CleanupInProgress);
                    suite
                        .run_case_hooks(id, HookRole::Cleanup, &args, &label)
                        .await?;
                    self.reporter.phase(&label, &name, &shown, Phase::Complete);
                }
            }
        }

        tracing::info!(hooks = suite.global_cleanup_hooks().len(), "global cleanup");
        suite.run_global_cleanup().await?;

        self.reporter.finish();
        tracing::info!("run complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::build_plan;
    use futures::FutureExt;
    use std::time::Duration;
    use sweepbench_core::{Args, CaseSpec, Signature, Stage, ValueKind};
    use sweepbench_report::MemorySink;

    #[derive(Default)]
    struct Journal {
        size: u32,
        events: Vec<String>,
    }

    impl Journal {
        fn note(&mut self, event: impl Into<String>) -> anyhow::Result<()> {
            self.events.push(event.into());
            Ok(())
        }
    }

    fn budget() -> RunBudget {
        RunBudget::from_duration(Duration::from_millis(5)).unwrap()
    }

    fn orchestrator(sink: &MemorySink) -> Orchestrator {
        Orchestrator::new(budget(), Reporter::new(sink.clone()))
    }

    fn dedup(events: &[String]) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for event in events {
            if out.last() != Some(event) {
                out.push(event.clone());
            }
        }
        out
    }

    #[test]
    fn test_lifecycle_order() {
        let int = Signature::of([ValueKind::Int]);
        let mut suite = Suite::builder(Journal::default())
            .param("Size", [10u32, 100], |j: &mut Journal, v| j.size = v)
            .global_setup("open", |j| j.note("global setup"))
            .global_cleanup("close", |j| j.note("global cleanup"))
            .hook("before", int.clone(), |j: &mut Journal, a: &Args| {
                j.note(format!("before {}", a))
            })
            .hook("after", int, |j: &mut Journal, a: &Args| {
                j.note(format!("after {}", a))
            })
            .case(
                CaseSpec::new("insert").arg(1024).setup("before").cleanup("after"),
                |j: &mut Journal, a: &Args| {
                    let size = j.size;
                    j.note(format!("insert {} size {}", a, size))
                },
            )
            .build()
            .unwrap();
        let plan = build_plan(&suite, None);
        let sink = MemorySink::new();
        orchestrator(&sink).run(&mut suite, &plan).unwrap();

        let events = suite.into_target().events;
        let count = |e: &str| events.iter().filter(|x| *x == e).count();
        assert_eq!(events.first().map(String::as_str), Some("global setup"));
        assert_eq!(events.last().map(String::as_str), Some("global cleanup"));
        assert_eq!(count("global setup"), 1);
        assert_eq!(count("global cleanup"), 1);
        assert_eq!(count("before 1024"), 2);
        assert_eq!(count("after 1024"), 2);
        assert_eq!(
            dedup(&events),
            vec![
                "global setup",
                "before 1024",
                "insert 1024 size 10",
                "after 1024",
                "before 1024",
                "insert 1024 size 100",
                "after 1024",
                "global cleanup",
            ]
        );

        let lines = sink.lines();
        assert_eq!(lines.len(), 12);
        assert_eq!(lines[0], "[Size:10]:insert(1024): starting");
        assert_eq!(lines[5], "[Size:10]:insert(1024): complete");
        assert_eq!(lines[6], "[Size:100]:insert(1024): starting");
        assert_eq!(sink.planned(), 2);
        assert_eq!(sink.completed(), 2);
        assert!(sink.is_finished());
    }

    #[test]
    fn test_case_without_args_runs_once_per_combination() {
        let mut suite = Suite::builder(Journal::default())
            .param("Size", [1u32, 2, 3], |j: &mut Journal, v| j.size = v)
            .case(CaseSpec::new("scan"), |j: &mut Journal, a: &Args| {
                assert!(a.is_empty());
                j.note("scan")
            })
            .build()
            .unwrap();
        let plan = build_plan(&suite, None);
        let sink = MemorySink::new();
        orchestrator(&sink).run(&mut suite, &plan).unwrap();

        let starts: Vec<_> = sink
            .lines()
            .into_iter()
            .filter(|l| l.ends_with(": starting"))
            .collect();
        assert_eq!(
            starts,
            vec![
                "[Size:1]:scan(): starting",
                "[Size:2]:scan(): starting",
                "[Size:3]:scan(): starting",
            ]
        );
    }

    #[test]
    fn test_no_parameters_runs_one_empty_combination() {
        let mut suite = Suite::builder(Journal::default())
            .global_setup("open", |j| j.note("global setup"))
            .global_cleanup("close", |j| j.note("global cleanup"))
            .case(CaseSpec::new("ping"), |j: &mut Journal, _: &Args| j.note("ping"))
            .build()
            .unwrap();
        let plan = build_plan(&suite, None);
        assert_eq!(plan.combinations, 1);
        let sink = MemorySink::new();
        orchestrator(&sink).run(&mut suite, &plan).unwrap();

        let events = suite.into_target().events;
        assert_eq!(events[0], "global setup");
        assert_eq!(events[events.len() - 1], "global cleanup");
        assert!(events[1..events.len() - 1].iter().all(|e| e == "ping"));
        assert!(events.len() >= 3);

        assert_eq!(sink.planned(), 1);
        assert_eq!(sink.lines()[0], "[]:ping(): starting");
        assert_eq!(sink.lines()[5], "[]:ping(): complete");
    }

    #[test]
    fn test_case_failure_aborts_run() {
        let mut suite = Suite::builder(Journal::default())
            .global_cleanup("close", |j| j.note("global cleanup"))
            .hook("after", Signature::empty(), |j: &mut Journal, _: &Args| {
                j.note("after")
            })
            .case(CaseSpec::new("broken").cleanup("after"), |_: &mut Journal, _: &Args| {
                Err(anyhow::anyhow!("connection reset"))
            })
            .case(CaseSpec::new("later"), |j: &mut Journal, _: &Args| j.note("later"))
            .build()
            .unwrap();
        let plan = build_plan(&suite, None);
        let sink = MemorySink::new();
        let err = orchestrator(&sink).run(&mut suite, &plan).unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Case));
        assert_eq!(err.to_string(), "case `broken` failed in []: connection reset");
        assert!(suite.into_target().events.is_empty());
        assert_eq!(sink.lines().last().unwrap(), "[]:broken(): running");
        assert!(!sink.is_finished());
    }

    #[test]
    fn test_setup_failure_skips_case() {
        let mut suite = Suite::builder(Journal::default())
            .hook("before", Signature::empty(), |_: &mut Journal, _: &Args| {
                anyhow::bail!("fixture missing")
            })
            .case(CaseSpec::new("insert").setup("before"), |j: &mut Journal, _: &Args| {
                j.note("insert")
            })
            .build()
            .unwrap();
        let plan = build_plan(&suite, None);
        let sink = MemorySink::new();
        let err = orchestrator(&sink).run(&mut suite, &plan).unwrap_err();

        assert_eq!(err.stage(), Some(Stage::CaseSetup));
        assert!(suite.into_target().events.is_empty());
    }

    #[test]
    fn test_filtered_plan_runs_selected_cases_only() {
        let mut suite = Suite::builder(Journal::default())
            .case(CaseSpec::new("insert"), |j: &mut Journal, _: &Args| j.note("insert"))
            .case(CaseSpec::new("delete"), |j: &mut Journal, _: &Args| j.note("delete"))
            .build()
            .unwrap();
        let re = regex::Regex::new("delete").unwrap();
        let plan = build_plan(&suite, Some(&re));
        let sink = MemorySink::new();
        orchestrator(&sink).run(&mut suite, &plan).unwrap();

        assert_eq!(dedup(&suite.into_target().events), vec!["delete"]);
    }

    #[tokio::test]
    async fn test_run_async_on_existing_runtime() {
        let mut suite = Suite::builder(Journal::default())
            .global_setup_async("open", |j| {
                async move {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    j.note("open")
                }
                .boxed_local()
            })
            .case_async(CaseSpec::new("read"), |j, _args| {
                async move {
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    j.note("read")
                }
                .boxed_local()
            })
            .build()
            .unwrap();
        let plan = build_plan(&suite, None);
        let sink = MemorySink::new();
        orchestrator(&sink)
            .run_async(&mut suite, &plan)
            .await
            .unwrap();

        assert_eq!(dedup(&suite.into_target().events), vec!["open", "read"]);
    }
}
