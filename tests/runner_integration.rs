//! Integration tests for the task runner: fault isolation, deterministic
//! merging and the all-tasks-failed policy.

use lintfold::analysis::{FnAnalyzer, FnPrerequisite, LogicalLinter, Pass, PrerequisiteValue};
use lintfold::config::ParallelConfig;
use lintfold::runner::{plan_jobs, Runner};
use lintfold::{AnalysisContext, CancellationToken, Finding, LintError, LinterConfig, Position};
use lintfold::linter::FnTask;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn reporting(name: &'static str, count: usize) -> LinterConfig {
    LinterConfig::standalone(Arc::new(FnTask::new(name, move |_: &AnalysisContext| {
        Ok((1..=count)
            .map(|line| Finding::new(format!("{} finding", name), Position::line_only("main.go", line)))
            .collect())
    })))
}

fn panicking(name: &'static str) -> LinterConfig {
    LinterConfig::standalone(Arc::new(FnTask::new(name, |_: &AnalysisContext| {
        panic!("index out of range")
    })))
}

fn failing(name: &'static str) -> LinterConfig {
    LinterConfig::standalone(Arc::new(FnTask::new(name, |_: &AnalysisContext| {
        Err(anyhow::anyhow!("can't load package"))
    })))
}

fn parallel(workers: usize) -> Runner {
    Runner::new(ParallelConfig {
        enabled: true,
        max_concurrency: Some(workers),
    })
}

fn linters_of(diagnostics: &[lintfold::Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.linter()).collect()
}

// ============================================================================
// Fault isolation
// ============================================================================

#[test]
fn test_one_fault_keeps_every_other_result() {
    let configs = vec![
        reporting("govet", 2),
        panicking("crashy"),
        reporting("errcheck", 1),
        reporting("unused", 3),
    ];
    let jobs = plan_jobs(&configs).unwrap();
    let ctx = AnalysisContext::new(".");

    for runner in [Runner::sequential(), parallel(3)] {
        let output = runner.run(&jobs, &ctx).unwrap();
        assert_eq!(
            linters_of(&output.diagnostics),
            vec!["govet", "govet", "errcheck", "unused", "unused", "unused"]
        );
        assert_eq!(output.errors.len(), 1);
        assert!(output.errors[0].is_fault());
        assert_eq!(output.errors[0].linter(), Some("crashy"));
    }
}

#[test]
fn test_fault_message_is_captured() {
    let jobs = plan_jobs(&[panicking("crashy"), reporting("govet", 1)]).unwrap();
    let output = Runner::sequential().run(&jobs, &AnalysisContext::new(".")).unwrap();

    match &output.errors[0] {
        LintError::Fault { message, .. } => assert!(message.contains("index out of range")),
        other => panic!("expected a fault, got {:?}", other),
    }
}

#[test]
fn test_task_errors_reported_alongside_diagnostics() {
    let jobs = plan_jobs(&[failing("typecheck"), reporting("govet", 1)]).unwrap();
    let output = parallel(2).run(&jobs, &AnalysisContext::new(".")).unwrap();

    assert_eq!(linters_of(&output.diagnostics), vec!["govet"]);
    assert_eq!(output.errors.len(), 1);
    assert!(output.errors[0].to_string().contains("can't load package"));
}

// ============================================================================
// All tasks failed
// ============================================================================

#[test]
fn test_all_failed_returns_first_error_in_job_order() {
    let jobs = plan_jobs(&[failing("first"), panicking("second"), failing("third")]).unwrap();
    let result = parallel(3).run(&jobs, &AnalysisContext::new("."));

    let err = result.unwrap_err();
    assert_eq!(err.linter(), Some("first"));
}

#[test]
fn test_success_with_zero_diagnostics_is_not_failure() {
    let jobs = plan_jobs(&[reporting("quiet", 0), failing("broken")]).unwrap();
    let output = Runner::sequential().run(&jobs, &AnalysisContext::new(".")).unwrap();
    assert!(output.diagnostics.is_empty());
    assert!(output.has_errors());
}

// ============================================================================
// Ordering and batching
// ============================================================================

#[test]
fn test_parallel_merge_matches_sequential() {
    let configs: Vec<_> = ["a", "b", "c", "d", "e", "f", "g", "h"]
        .into_iter()
        .enumerate()
        .map(|(i, name)| reporting(name, i + 1))
        .collect();
    let jobs = plan_jobs(&configs).unwrap();
    let ctx = AnalysisContext::new(".");

    let sequential = Runner::sequential().run(&jobs, &ctx).unwrap();
    let concurrent = parallel(4).run(&jobs, &ctx).unwrap();
    assert_eq!(sequential.diagnostics, concurrent.diagnostics);
}

#[test]
fn test_batched_linters_run_as_one_job() {
    let analyzer = |name: &'static str| -> Arc<dyn lintfold::Analyzer> {
        Arc::new(FnAnalyzer::new(name, move |_: &Pass<'_>| {
            Ok(vec![Finding::new(format!("{} says hi", name), Position::line_only("a.go", 1))])
        }))
    };
    let configs = vec![
        reporting("gofmt", 1),
        LinterConfig::batched(LogicalLinter::new("staticcheck", vec![analyzer("SA1000")])),
        LinterConfig::batched(LogicalLinter::new("unused", vec![analyzer("U1000")])),
    ];
    let jobs = plan_jobs(&configs).unwrap();
    assert_eq!(jobs.len(), 2);

    let output = parallel(2).run(&jobs, &AnalysisContext::new(".")).unwrap();
    assert_eq!(linters_of(&output.diagnostics), vec!["gofmt", "staticcheck", "unused"]);
    assert_eq!(output.timings.len(), 3);
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn test_cancelled_run_skips_everything() {
    let token = CancellationToken::new();
    token.cancel();
    let ctx = AnalysisContext::new(".").with_cancellation(token);
    let jobs = plan_jobs(&[reporting("a", 1), reporting("b", 1)]).unwrap();

    let output = Runner::sequential().run(&jobs, &ctx).unwrap();
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.skipped, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_batch_cancelled_after_prerequisites_is_skipped() {
    let cancelling = Arc::new(FnPrerequisite::new("types", |ctx: &AnalysisContext, _| {
        ctx.cancellation().cancel();
        Ok(Arc::new(()) as PrerequisiteValue)
    }));
    let analyzer = FnAnalyzer::new("SA1000", |_: &Pass<'_>| {
        Ok(vec![Finding::new("unreachable", Position::line_only("a.go", 1))])
    })
    .requiring(cancelling);
    let configs = vec![
        LinterConfig::batched(LogicalLinter::new("staticcheck", vec![Arc::new(analyzer)])),
        LinterConfig::batched(LogicalLinter::new(
            "unused",
            vec![Arc::new(FnAnalyzer::new("U1000", |_: &Pass<'_>| Ok(vec![])))],
        )),
    ];
    let jobs = plan_jobs(&configs).unwrap();
    assert_eq!(jobs.len(), 1);

    let output = Runner::sequential()
        .run(&jobs, &AnalysisContext::new("."))
        .unwrap();
    assert!(output.diagnostics.is_empty());
    assert!(output.errors.is_empty());
    assert_eq!(output.skipped, vec!["staticcheck".to_string(), "unused".to_string()]);
}
