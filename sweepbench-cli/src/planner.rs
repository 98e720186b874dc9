//! Case Planner
//!
//! Selects which cases of a suite run and sizes the run.
//!
//! Filtering is a regex match on the case name. Selected cases keep their
//! discovery order; the run order inside a combination is part of a suite's
//! observable behavior.

use sweepbench_core::{CaseId, Suite};

/// Cases selected for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// Selected cases in discovery order
    pub cases: Vec<CaseId>,
    /// Number of parameter combinations
    pub combinations: usize,
    /// Timed loops the run will perform
    pub planned_loops: u64,
}

impl ExecutionPlan {
    /// Whether no case was selected
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Build an execution plan for `suite`.
///
/// Each selected case contributes one timed loop per argument tuple (one if it
/// declares none) per combination.
pub fn build_plan<T>(suite: &Suite<T>, filter: Option<&regex::Regex>) -> ExecutionPlan {
    let cases: Vec<CaseId> = suite
        .case_ids()
        .filter(|&id| filter.is_none_or(|re| re.is_match(suite.case(id).name())))
        .collect();

    let combinations = suite.combinations().len();
    let loops_per_combination: u64 = cases
        .iter()
        .map(|&id| suite.case(id).declared_args().len().max(1) as u64)
        .sum();

    ExecutionPlan {
        cases,
        combinations,
        planned_loops: combinations as u64 * loops_per_combination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use sweepbench_core::{Args, CaseSpec, args};

    fn noop(_: &mut (), _: &Args) -> anyhow::Result<()> {
        Ok(())
    }

    fn suite() -> Suite<()> {
        Suite::builder(())
            .param("Size", [10, 100, 1000], |_: &mut (), _: i32| {})
            .param("Read", [false, true], |_: &mut (), _: bool| {})
            .case(CaseSpec::new("insert").arg(1024).arg(2048), noop)
            .case(CaseSpec::new("scan"), noop)
            .case(CaseSpec::new("insert_batch").args(args![16, "rows"]), noop)
            .build()
            .unwrap()
    }

    #[test]
    fn test_no_filter() {
        let suite = suite();
        let plan = build_plan(&suite, None);

        let names: Vec<_> = plan.cases.iter().map(|&id| suite.case(id).name()).collect();
        assert_eq!(names, vec!["insert", "scan", "insert_batch"]);
        assert_eq!(plan.combinations, 6);
        // (2 + 1 + 1) loops per combination
        assert_eq!(plan.planned_loops, 24);
    }

    #[test]
    fn test_regex_filter() {
        let suite = suite();
        let re = Regex::new("^insert").unwrap();
        let plan = build_plan(&suite, Some(&re));

        let names: Vec<_> = plan.cases.iter().map(|&id| suite.case(id).name()).collect();
        assert_eq!(names, vec!["insert", "insert_batch"]);
        assert_eq!(plan.planned_loops, 18);
    }

    #[test]
    fn test_empty_selection() {
        let suite = suite();
        let re = Regex::new("^delete$").unwrap();
        let plan = build_plan(&suite, Some(&re));

        assert!(plan.is_empty());
        assert_eq!(plan.planned_loops, 0);
    }
}
