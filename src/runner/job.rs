//! Units of work handed to runner workers.

use super::guard::run_guarded;
use crate::analysis::{aggregate, LogicalLinter, MetaLinter};
use crate::context::AnalysisContext;
use crate::core::Diagnostic;
use crate::errors::{LintError, Result};
use crate::linter::{AnalyzerTask, LinterConfig, LinterKind};
use crate::observability::{set_phase, LintPhase};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of one logical linter. Consumed by the runner's merge step.
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub linter: String,
    pub outcome: std::result::Result<Vec<Diagnostic>, LintError>,
    pub duration: Duration,
}

impl TaskResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[derive(Clone)]
pub enum Job {
    Single(Arc<dyn AnalyzerTask>),
    Batch(MetaLinter),
}

impl Job {
    pub fn name(&self) -> &str {
        match self {
            Job::Single(task) => task.name(),
            Job::Batch(meta) => meta.name(),
        }
    }

    /// Logical linters whose results this job produces.
    pub fn linter_names(&self) -> Vec<String> {
        match self {
            Job::Single(task) => vec![task.name().to_string()],
            Job::Batch(meta) => meta.plan().linter_names(),
        }
    }

    /// Run the job. Never panics: faults come back as failed results.
    pub fn execute(&self, ctx: &AnalysisContext) -> Vec<TaskResult> {
        let _span = tracing::info_span!("linter", name = self.name()).entered();
        match self {
            Job::Single(task) => vec![run_single(task.as_ref(), ctx)],
            Job::Batch(meta) => meta.run(ctx),
        }
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Job::Single(task) => f.debug_tuple("Single").field(&task.name()).finish(),
            Job::Batch(meta) => f.debug_tuple("Batch").field(meta.plan()).finish(),
        }
    }
}

fn run_single(task: &dyn AnalyzerTask, ctx: &AnalysisContext) -> TaskResult {
    let _phase = set_phase(LintPhase::Linting);
    let start = Instant::now();
    let outcome = run_guarded(task.name(), || task.run(ctx)).map(|findings| {
        findings
            .into_iter()
            .map(|finding| Diagnostic::from_finding(task.name(), finding))
            .collect()
    });
    TaskResult {
        linter: task.name().to_string(),
        outcome,
        duration: start.elapsed(),
    }
}

/// Turn the enabled linters into jobs.
///
/// Every standalone linter gets its own job. All batchable linters share a
/// single meta-linter job, placed where the first of them was listed.
pub fn plan_jobs(enabled: &[LinterConfig]) -> Result<Vec<Job>> {
    let mut jobs = Vec::new();
    let mut batched: Vec<Arc<LogicalLinter>> = Vec::new();
    let mut batch_slot = None;

    for config in enabled {
        match config.kind() {
            LinterKind::Standalone(task) => jobs.push(Job::Single(Arc::clone(task))),
            LinterKind::Batched(linter) => {
                batch_slot.get_or_insert(jobs.len());
                batched.push(Arc::clone(linter));
            }
        }
    }

    if let Some(slot) = batch_slot {
        let plan = aggregate(batched)?;
        jobs.insert(slot, Job::Batch(MetaLinter::new(plan)));
    }

    log::debug!(
        "Planned {} jobs: {}",
        jobs.len(),
        jobs.iter().map(Job::name).collect::<Vec<_>>().join(", ")
    );
    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Analyzer, FnAnalyzer, Pass};
    use crate::core::{Finding, Position};
    use crate::linter::FnTask;

    fn standalone(name: &str) -> LinterConfig {
        let message = format!("{} says hi", name);
        LinterConfig::standalone(Arc::new(FnTask::new(name, move |_: &AnalysisContext| {
            Ok(vec![Finding::new(message.clone(), Position::line_only("a.go", 1))])
        })))
    }

    fn batched(name: &str) -> LinterConfig {
        let analyzer: Arc<dyn Analyzer> =
            Arc::new(FnAnalyzer::new(format!("{}_analyzer", name), |_: &Pass<'_>| Ok(vec![])));
        LinterConfig::batched(LogicalLinter::new(name, vec![analyzer]))
    }

    #[test]
    fn test_plan_jobs_groups_batched_linters() {
        let jobs = plan_jobs(&[
            standalone("errcheck"),
            batched("govet"),
            standalone("gofmt"),
            batched("unused"),
        ])
        .unwrap();

        let names: Vec<_> = jobs.iter().map(Job::name).collect();
        assert_eq!(names, vec!["errcheck", "analysis_metalinter", "gofmt"]);
        assert_eq!(jobs[1].linter_names(), vec!["govet", "unused"]);
    }

    #[test]
    fn test_single_job_attributes_findings() {
        let jobs = plan_jobs(&[standalone("lll")]).unwrap();
        let results = jobs[0].execute(&AnalysisContext::new("."));

        assert_eq!(results.len(), 1);
        let diagnostics = results[0].outcome.as_ref().unwrap();
        assert_eq!(diagnostics[0].linter(), "lll");
        assert_eq!(diagnostics[0].message, "lll says hi");
    }

    #[test]
    fn test_single_job_contains_panics() {
        let config = LinterConfig::standalone(Arc::new(FnTask::new(
            "crashy",
            |_: &AnalysisContext| -> anyhow::Result<Vec<Finding>> { panic!("boom") },
        )));
        let jobs = plan_jobs(&[config]).unwrap();
        let results = jobs[0].execute(&AnalysisContext::new("."));
        assert!(results[0].outcome.as_ref().is_err_and(LintError::is_fault));
    }
}
