//! Property tests for runner merging and the count-limiting stages.

use lintfold::linter::FnTask;
use lintfold::pipeline::stages::{MaxFromLinter, MaxSameIssues, UniqByLine};
use lintfold::pipeline::PipelineBuilder;
use lintfold::runner::{plan_jobs, Runner};
use lintfold::{AnalysisContext, Diagnostic, Finding, LinterConfig, Position};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

const LINTERS: [&str; 3] = ["govet", "errcheck", "unused"];

fn diagnostic_strategy() -> impl Strategy<Value = Diagnostic> {
    (0..LINTERS.len(), 1usize..20, 0usize..4).prop_map(|(linter, line, message)| {
        Finding::new(format!("message {}", message), Position::line_only("a.go", line))
            .attribute(LINTERS[linter])
    })
}

fn limited(input: Vec<Diagnostic>, same: usize, per_linter: usize) -> Vec<Diagnostic> {
    PipelineBuilder::new()
        .stage(UniqByLine::new())
        .stage(MaxSameIssues::new(same))
        .stage(MaxFromLinter::new(per_linter))
        .build()
        .process(input)
        .diagnostics
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_per_linter_limit_keeps_prefix(
        input in prop::collection::vec(diagnostic_strategy(), 0..60),
        limit in 1usize..8,
    ) {
        let output = PipelineBuilder::new()
            .stage(MaxFromLinter::new(limit))
            .build()
            .process(input.clone())
            .diagnostics;

        for linter in LINTERS {
            let expected: Vec<_> = input.iter().filter(|d| d.linter() == linter).take(limit).collect();
            let actual: Vec<_> = output.iter().filter(|d| d.linter() == linter).collect();
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn prop_uniq_by_line_keeps_first_seen(input in prop::collection::vec(diagnostic_strategy(), 0..60)) {
        let output = PipelineBuilder::new().stage(UniqByLine::new()).build().process(input.clone()).diagnostics;

        let mut seen = HashSet::new();
        let expected: Vec<_> = input.into_iter().filter(|d| seen.insert(d.line())).collect();
        prop_assert_eq!(output, expected);
    }

    #[test]
    fn prop_limiting_reaches_fixed_point(
        input in prop::collection::vec(diagnostic_strategy(), 0..60),
        same in 1usize..4,
        per_linter in 1usize..6,
    ) {
        let once = limited(input, same, per_linter);
        let twice = limited(once.clone(), same, per_linter);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_single_fault_never_loses_other_results(
        counts in prop::collection::vec(0usize..4, 2..6),
        crash_seed in any::<prop::sample::Index>(),
    ) {
        let crash = crash_seed.index(counts.len());
        let configs: Vec<_> = counts
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let name = format!("linter{}", i);
                let crashes = i == crash;
                LinterConfig::standalone(Arc::new(FnTask::new(name, move |_: &AnalysisContext| {
                    if crashes {
                        panic!("analyzer bug");
                    }
                    Ok((1..=count).map(|line| Finding::new("m", Position::line_only("a.go", line))).collect())
                })))
            })
            .collect();
        let jobs = plan_jobs(&configs).unwrap();

        let output = Runner::sequential().run(&jobs, &AnalysisContext::new("."));
        let expected: usize = counts.iter().enumerate().filter(|&(i, _)| i != crash).map(|(_, c)| c).sum();
        match output {
            Ok(output) => {
                prop_assert_eq!(output.diagnostics.len(), expected);
                prop_assert_eq!(output.errors.len(), 1);
                prop_assert!(output.errors[0].is_fault());
            }
            Err(err) => prop_assert!(false, "run failed with {}", err),
        }
    }
}
