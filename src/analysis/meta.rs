//! Meta-aggregation of batchable linters.
//!
//! [`aggregate`] turns a set of [`LogicalLinter`]s into a [`BatchPlan`]:
//!
//! - prerequisites are deduplicated by id so each one runs once per batch
//! - the batch load level is the maximum any member declared, so no member
//!   ever runs against less than its own minimum
//! - every analyzer is mapped back to its logical linter; that attribution
//!   map is the only thing that decides `Diagnostic::linter` for batched
//!   output
//!
//! [`MetaLinter::run`] executes the plan. A failed prerequisite fails every
//! linter depending on it with the same cause and leaves the others alone.

use super::{Analyzer, LogicalLinter, Pass, Prerequisite, PrerequisiteResults};
use crate::context::AnalysisContext;
use crate::core::{Diagnostic, LoadLevel};
use crate::errors::LintError;
use crate::observability::{set_phase, LintPhase};
use crate::runner::guard::run_guarded;
use crate::runner::TaskResult;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const META_LINTER_NAME: &str = "analysis_metalinter";

/// Execution plan for one batch of logical linters.
#[derive(Clone)]
pub struct BatchPlan {
    linters: Vec<Arc<LogicalLinter>>,
    analyzers: Vec<Arc<dyn Analyzer>>,
    prerequisites: Vec<Arc<dyn Prerequisite>>,
    attribution: HashMap<String, String>,
    load_level: LoadLevel,
}

/// Build a batch plan.
///
/// Fails when two linters claim an analyzer with the same name, since the
/// attribution map could not tell their output apart.
pub fn aggregate(linters: Vec<Arc<LogicalLinter>>) -> Result<BatchPlan, LintError> {
    let mut analyzers: Vec<Arc<dyn Analyzer>> = Vec::new();
    let mut attribution: HashMap<String, String> = HashMap::new();
    let mut prerequisites: Vec<Arc<dyn Prerequisite>> = Vec::new();

    for linter in &linters {
        if linter.analyzers().is_empty() {
            return Err(LintError::Registry(format!(
                "linter {} has no analyzers",
                linter.name()
            )));
        }

        for analyzer in linter.analyzers() {
            if let Some(owner) = attribution.get(analyzer.name()) {
                return Err(LintError::Registry(format!(
                    "analyzer {} is claimed by both {} and {}",
                    analyzer.name(),
                    owner,
                    linter.name()
                )));
            }
            attribution.insert(analyzer.name().to_string(), linter.name().to_string());
            analyzers.push(Arc::clone(analyzer));

            for prerequisite in analyzer.requires() {
                if !prerequisites.iter().any(|p| p.id() == prerequisite.id()) {
                    prerequisites.push(prerequisite);
                }
            }
        }
    }

    let load_level = LoadLevel::max_of(linters.iter().map(|l| l.load_level()));

    log::debug!(
        "Batched {} linters ({} analyzers, {} shared prerequisites) at load level {}",
        linters.len(),
        analyzers.len(),
        prerequisites.len(),
        load_level
    );

    Ok(BatchPlan {
        linters,
        analyzers,
        prerequisites,
        attribution,
        load_level,
    })
}

impl BatchPlan {
    pub fn load_level(&self) -> LoadLevel {
        self.load_level
    }

    pub fn linters(&self) -> &[Arc<LogicalLinter>] {
        &self.linters
    }

    pub fn linter_names(&self) -> Vec<String> {
        self.linters.iter().map(|l| l.name().to_string()).collect()
    }

    pub fn prerequisite_ids(&self) -> Vec<&str> {
        self.prerequisites.iter().map(|p| p.id()).collect()
    }

    /// Logical linter an analyzer's output belongs to.
    pub fn linter_for(&self, analyzer: &str) -> Option<&str> {
        self.attribution.get(analyzer).map(String::as_str)
    }
}

impl std::fmt::Debug for BatchPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchPlan")
            .field("linters", &self.linter_names())
            .field("prerequisites", &self.prerequisite_ids())
            .field("load_level", &self.load_level)
            .finish()
    }
}

struct AnalyzerOutput {
    analyzer: String,
    outcome: Result<Vec<crate::core::Finding>, LintError>,
    duration: Duration,
}

/// Runs a [`BatchPlan`] as one job.
#[derive(Debug, Clone)]
pub struct MetaLinter {
    plan: BatchPlan,
}

impl MetaLinter {
    pub fn new(plan: BatchPlan) -> Self {
        Self { plan }
    }

    pub fn name(&self) -> &str {
        META_LINTER_NAME
    }

    pub fn plan(&self) -> &BatchPlan {
        &self.plan
    }

    /// Run the batch, producing one result per logical linter in plan order.
    pub fn run(&self, ctx: &AnalysisContext) -> Vec<TaskResult> {
        let (results, failed) = self.compute_prerequisites(ctx);
        let mut blocked = self.blocked_linters(&failed);
        if ctx.is_cancelled() {
            log::info!("Cancelled after prerequisites, skipping analyzers of {}", self.name());
            for linter in &self.plan.linters {
                blocked
                    .entry(linter.name().to_string())
                    .or_insert_with(|| LintError::Cancelled(linter.name().to_string()));
            }
        }
        let outputs = self.run_analyzers(ctx, &results, &blocked);

        self.plan
            .linters
            .par_iter()
            .map(|linter| match blocked.get(linter.name()) {
                Some(err) => TaskResult {
                    linter: linter.name().to_string(),
                    outcome: Err(err.clone()),
                    duration: Duration::ZERO,
                },
                None => self.collect_linter(linter, ctx, &outputs),
            })
            .collect()
    }

    fn compute_prerequisites(
        &self,
        ctx: &AnalysisContext,
    ) -> (PrerequisiteResults, HashMap<String, String>) {
        let level = self.plan.load_level;
        let computed: Vec<_> = self
            .plan
            .prerequisites
            .par_iter()
            .map(|prerequisite| {
                let _phase = set_phase(LintPhase::Prerequisites);
                let _span = tracing::debug_span!("prerequisite", id = prerequisite.id()).entered();
                let outcome = run_guarded(prerequisite.id(), || prerequisite.compute(ctx, level));
                (prerequisite.id().to_string(), outcome)
            })
            .collect();

        let mut results = PrerequisiteResults::default();
        let mut failed = HashMap::new();
        for (id, outcome) in computed {
            match outcome {
                Ok(value) => results.insert(id, value),
                Err(err) => {
                    log::warn!("Prerequisite {} failed: {}", id, err);
                    failed.insert(id, failure_cause(&err));
                }
            }
        }
        (results, failed)
    }

    /// Linters depending on a failed prerequisite, with the error each one reports.
    ///
    /// The first failed prerequisite in declaration order is the reported cause.
    fn blocked_linters(&self, failed: &HashMap<String, String>) -> HashMap<String, LintError> {
        let mut blocked = HashMap::new();
        if failed.is_empty() {
            return blocked;
        }
        for linter in &self.plan.linters {
            let cause = linter
                .prerequisite_ids()
                .into_iter()
                .find_map(|id| failed.get(&id).map(|cause| (id, cause.clone())));
            if let Some((prerequisite, cause)) = cause {
                blocked.insert(
                    linter.name().to_string(),
                    LintError::Prerequisite {
                        linter: linter.name().to_string(),
                        prerequisite,
                        cause,
                    },
                );
            }
        }
        blocked
    }

    fn run_analyzers(
        &self,
        ctx: &AnalysisContext,
        results: &PrerequisiteResults,
        blocked: &HashMap<String, LintError>,
    ) -> Vec<AnalyzerOutput> {
        let pass = Pass::new(ctx, self.plan.load_level, results);
        self.plan
            .analyzers
            .par_iter()
            .filter(|analyzer| {
                self.plan
                    .linter_for(analyzer.name())
                    .is_some_and(|linter| !blocked.contains_key(linter))
            })
            .map(|analyzer| {
                let _phase = set_phase(LintPhase::Linting);
                let start = Instant::now();
                let outcome = run_guarded(analyzer.name(), || analyzer.run(&pass));
                AnalyzerOutput {
                    analyzer: analyzer.name().to_string(),
                    outcome,
                    duration: start.elapsed(),
                }
            })
            .collect()
    }

    fn collect_linter(
        &self,
        linter: &LogicalLinter,
        ctx: &AnalysisContext,
        outputs: &[AnalyzerOutput],
    ) -> TaskResult {
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let mut duration = Duration::ZERO;

        for output in outputs {
            let Some(owner) = self.plan.linter_for(&output.analyzer) else {
                continue;
            };
            if owner != linter.name() {
                continue;
            }
            duration += output.duration;
            match &output.outcome {
                Ok(findings) => diagnostics.extend(
                    findings
                        .iter()
                        .cloned()
                        .map(|finding| Diagnostic::from_finding(owner, finding)),
                ),
                Err(err) => {
                    return TaskResult {
                        linter: linter.name().to_string(),
                        outcome: Err(err.clone().attributed_to(linter.name())),
                        duration,
                    }
                }
            }
        }

        if let Some(reporter) = linter.issues_reporter() {
            let _phase = set_phase(LintPhase::Reporting);
            let start = Instant::now();
            let reported = run_guarded(linter.name(), || reporter(ctx));
            duration += start.elapsed();
            match reported {
                Ok(findings) => diagnostics.extend(
                    findings
                        .into_iter()
                        .map(|finding| Diagnostic::from_finding(linter.name(), finding)),
                ),
                Err(err) => {
                    return TaskResult {
                        linter: linter.name().to_string(),
                        outcome: Err(err),
                        duration,
                    }
                }
            }
        }

        TaskResult {
            linter: linter.name().to_string(),
            outcome: Ok(diagnostics),
            duration,
        }
    }
}

fn failure_cause(err: &LintError) -> String {
    match err {
        LintError::Task { message, .. } => message.clone(),
        LintError::Fault { message, .. } => format!("panic: {}", message),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{FnAnalyzer, FnPrerequisite, PrerequisiteValue};
    use crate::core::{Finding, Position};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn analyzer(name: &str, prerequisite: Option<Arc<dyn Prerequisite>>) -> Arc<dyn Analyzer> {
        let message = format!("{} finding", name);
        let mut analyzer = FnAnalyzer::new(name, move |_: &Pass<'_>| {
            Ok(vec![Finding::new(message.clone(), Position::line_only("main.go", 1))])
        });
        if let Some(p) = prerequisite {
            analyzer = analyzer.requiring(p);
        }
        Arc::new(analyzer)
    }

    fn linter(name: &str, analyzers: Vec<Arc<dyn Analyzer>>, level: LoadLevel) -> Arc<LogicalLinter> {
        Arc::new(LogicalLinter::new(name, analyzers).with_load_level(level))
    }

    #[test]
    fn test_aggregate_picks_max_load_level() {
        let plan = aggregate(vec![
            linter("gofmt", vec![analyzer("gofmt", None)], LoadLevel::Syntax),
            linter("unused", vec![analyzer("u", None)], LoadLevel::WholeProgram),
            linter("govet", vec![analyzer("printf", None)], LoadLevel::Types),
        ])
        .unwrap();
        assert_eq!(plan.load_level(), LoadLevel::WholeProgram);
    }

    #[test]
    fn test_aggregate_rejects_shared_analyzer_names() {
        let result = aggregate(vec![
            linter("a", vec![analyzer("dup", None)], LoadLevel::Syntax),
            linter("b", vec![analyzer("dup", None)], LoadLevel::Syntax),
        ]);
        assert!(matches!(result, Err(LintError::Registry(_))));
    }

    #[test]
    fn test_shared_prerequisite_computed_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let trees: Arc<dyn Prerequisite> = Arc::new(FnPrerequisite::new(
            "syntax_trees",
            move |_: &AnalysisContext, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(()) as PrerequisiteValue)
            },
        ));

        let plan = aggregate(vec![
            linter("a", vec![analyzer("a1", Some(Arc::clone(&trees)))], LoadLevel::Syntax),
            linter("b", vec![analyzer("b1", Some(Arc::clone(&trees)))], LoadLevel::Syntax),
        ])
        .unwrap();
        assert_eq!(plan.prerequisite_ids(), vec!["syntax_trees"]);

        let results = MetaLinter::new(plan).run(&AnalysisContext::new("."));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| r.outcome.is_ok()));
    }

    #[test]
    fn test_cancel_during_prerequisites_skips_analyzers() {
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        let checker: Arc<dyn Analyzer> = Arc::new(FnAnalyzer::new("checker", move |_: &Pass<'_>| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }));
        let cancelling: Arc<dyn Prerequisite> = Arc::new(FnPrerequisite::new(
            "types",
            |ctx: &AnalysisContext, _| {
                ctx.cancellation().cancel();
                Ok(Arc::new(()) as PrerequisiteValue)
            },
        ));
        let plan = aggregate(vec![
            linter("a", vec![analyzer("typed", Some(cancelling))], LoadLevel::Types),
            linter("b", vec![checker], LoadLevel::Syntax),
        ])
        .unwrap();

        let results = MetaLinter::new(plan).run(&AnalysisContext::new("."));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert!(matches!(&results[0].outcome, Err(LintError::Cancelled(name)) if name == "a"));
        assert!(matches!(&results[1].outcome, Err(LintError::Cancelled(name)) if name == "b"));
    }

    #[test]
    fn test_attribution_uses_logical_linter_name() {
        let plan = aggregate(vec![linter(
            "govet",
            vec![analyzer("printf", None), analyzer("shadow", None)],
            LoadLevel::Types,
        )])
        .unwrap();
        assert_eq!(plan.linter_for("shadow"), Some("govet"));

        let results = MetaLinter::new(plan).run(&AnalysisContext::new("."));
        let diagnostics = results[0].outcome.as_ref().unwrap();
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|d| d.linter() == "govet"));
        assert_eq!(diagnostics[0].message, "printf finding");
    }

    #[test]
    fn test_analyzer_fault_fails_only_its_linter() {
        let crashing: Arc<dyn Analyzer> =
            Arc::new(FnAnalyzer::new("crash", |_: &Pass<'_>| panic!("bad AST")));
        let plan = aggregate(vec![
            linter("broken", vec![crashing], LoadLevel::Syntax),
            linter("fine", vec![analyzer("fine", None)], LoadLevel::Syntax),
        ])
        .unwrap();

        let results = MetaLinter::new(plan).run(&AnalysisContext::new("."));
        assert!(matches!(
            &results[0].outcome,
            Err(LintError::Fault { linter, .. }) if linter == "broken"
        ));
        assert_eq!(results[1].outcome.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_issues_reporter_output_is_attributed() {
        let reporter_linter = LogicalLinter::new("unused", vec![analyzer("unused_checker", None)])
            .with_issues_reporter(Arc::new(|_ctx: &AnalysisContext| {
                Ok(vec![Finding::new("func `f` is unused", Position::line_only("a.go", 9))])
            }));
        let plan = aggregate(vec![Arc::new(reporter_linter)]).unwrap();

        let results = MetaLinter::new(plan).run(&AnalysisContext::new("."));
        let diagnostics = results[0].outcome.as_ref().unwrap();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[1].linter(), "unused");
        assert_eq!(diagnostics[1].line(), 9);
    }
}
