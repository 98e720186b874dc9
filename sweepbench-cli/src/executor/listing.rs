//! Plan Listing
//!
//! Tree view of what a run would execute: every combination, then every
//! selected case with its argument tuples and bound hooks.

use crate::planner::ExecutionPlan;
use std::fmt::Write;
use sweepbench_core::{HookRole, Suite};

/// Format the plan for terminal display
pub fn format_plan<T>(suite: &Suite<T>, plan: &ExecutionPlan) -> String {
    let mut output = String::new();

    output.push_str("SweepBench Plan:\n");

    let _ = writeln!(output, "├── combinations: {}", plan.combinations);
    for combination in suite.combinations() {
        let _ = writeln!(output, "│   ├── {}", suite.label(&combination));
    }

    for &id in &plan.cases {
        let case = suite.case(id);
        let description = case
            .description()
            .map(|d| format!(" - {}", d))
            .unwrap_or_default();
        let _ = writeln!(
            output,
            "├── case: {}{}{}",
            case.name(),
            case.signature(),
            description
        );

        for args in case.declared_args() {
            let _ = writeln!(output, "│   ├── args: ({})", args);
        }
        for role in [HookRole::Setup, HookRole::Cleanup] {
            let hooks = suite.bound_hooks(id, role);
            if !hooks.is_empty() {
                let _ = writeln!(output, "│   ├── {}: {}", role, hooks.join(", "));
            }
        }
    }

    let _ = writeln!(
        output,
        "{} cases selected, {} timed loops planned.",
        plan.cases.len(),
        plan.planned_loops
    );
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::build_plan;
    use sweepbench_core::{Args, CaseSpec, Signature, ValueKind};

    fn noop(_: &mut (), _: &Args) -> anyhow::Result<()> {
        Ok(())
    }

    #[test]
    fn test_format_plan() {
        let suite = Suite::builder(())
            .param("Size", [10, 100], |_: &mut (), _: i32| {})
            .hook("truncate", Signature::of([ValueKind::Int]), noop)
            .case(
                CaseSpec::new("insert")
                    .description("Row inserts")
                    .arg(1024)
                    .arg(4096)
                    .setup("truncate"),
                noop,
            )
            .case(CaseSpec::new("scan"), noop)
            .build()
            .unwrap();
        let plan = build_plan(&suite, None);
        let text = format_plan(&suite, &plan);

        let expected = "\
SweepBench Plan:
├── combinations: 2
│   ├── [Size:10]
│   ├── [Size:100]
├── case: insert(int) - Row inserts
│   ├── args: (1024)
│   ├── args: (4096)
│   ├── setup: truncate
├── case: scan()
2 cases selected, 6 timed loops planned.
";
        assert_eq!(text, expected);
    }
}
