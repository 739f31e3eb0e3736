//! Pipeline builder and driver.
//!
//! # Example
//!
//! ```rust
//! use lintfold::pipeline::stages::{MaxFromLinter, UniqByLine};
//! use lintfold::pipeline::PipelineBuilder;
//!
//! let dedupe = true;
//! let pipeline = PipelineBuilder::new()
//!     .when(dedupe, |p| p.stage(UniqByLine::new()))
//!     .stage(MaxFromLinter::new(50))
//!     .build();
//! assert_eq!(pipeline.stage_names(), vec!["uniq_by_line", "max_from_linter"]);
//! ```

use super::stage::Stage;
use crate::core::Diagnostic;
use crate::errors::LintError;
use crate::observability::{set_phase, LintPhase, Stopwatch};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Builder for constructing pipelines.
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<Box<dyn Stage>>,
}

impl PipelineBuilder {
    /// Create a new empty pipeline builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage; stages run in the order they were added.
    pub fn stage<S: Stage + 'static>(mut self, stage: S) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn boxed_stage(mut self, stage: Box<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Add stages conditionally.
    pub fn when<F>(self, condition: bool, f: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        if condition {
            f(self)
        } else {
            self
        }
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

/// Before/after counts of one stage in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageStat {
    pub name: &'static str,
    pub in_count: usize,
    pub out_count: usize,
    pub duration: Duration,
    /// The stage errored and its input was passed through unchanged.
    pub failed: bool,
}

impl StageStat {
    pub fn dropped(&self) -> usize {
        self.in_count.saturating_sub(self.out_count)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessedDiagnostics {
    pub diagnostics: Vec<Diagnostic>,
    pub stats: Vec<StageStat>,
    /// Errors of stages that were skipped, in stage order.
    pub errors: Vec<LintError>,
}

/// An ordered list of stages, good for exactly one run.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage in order, then every stage's `finish` hook.
    ///
    /// A failing stage is logged and skipped: its input flows to the next
    /// stage unchanged. Failing `finish` hooks are only logged.
    pub fn process(mut self, diagnostics: Vec<Diagnostic>) -> ProcessedDiagnostics {
        let _phase = set_phase(LintPhase::Processing);
        let mut stopwatch = Stopwatch::new("processing");
        let mut current = diagnostics;
        let mut stats = Vec::with_capacity(self.stages.len());
        let mut errors = Vec::new();

        for stage in &mut self.stages {
            let name = stage.name();
            let _span = tracing::debug_span!("stage", stage = name).entered();
            let in_count = current.len();
            let start = Instant::now();

            let failed = match stage.process(&current) {
                Ok(output) => {
                    current = output;
                    false
                }
                Err(err) => {
                    log::warn!("Can't process result by {} processor: {}", name, err);
                    errors.push(err);
                    true
                }
            };

            let duration = start.elapsed();
            stopwatch.record(name, duration);
            if current.len() != in_count {
                log::debug!("{}: {} of {} issues left", name, current.len(), in_count);
            }
            stats.push(StageStat {
                name,
                in_count,
                out_count: current.len(),
                duration,
                failed,
            });
        }

        for stage in &mut self.stages {
            if let Err(err) = stage.finish() {
                log::warn!("Can't finish {} processor: {}", stage.name(), err);
            }
        }
        stopwatch.print_stages();

        ProcessedDiagnostics {
            diagnostics: current,
            stats,
            errors,
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Finding, Position};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn diagnostics(n: usize) -> Vec<Diagnostic> {
        (1..=n)
            .map(|line| Finding::new("m", Position::line_only("a.go", line)).attribute("x"))
            .collect()
    }

    struct KeepFirst(usize);

    impl Stage for KeepFirst {
        fn name(&self) -> &'static str {
            "keep_first"
        }

        fn process(&mut self, input: &[Diagnostic]) -> Result<Vec<Diagnostic>, LintError> {
            Ok(input.iter().take(self.0).cloned().collect())
        }
    }

    struct Broken;

    impl Stage for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn process(&mut self, _input: &[Diagnostic]) -> Result<Vec<Diagnostic>, LintError> {
            Err(LintError::stage("broken", "regex engine exploded"))
        }

        fn finish(&mut self) -> Result<(), LintError> {
            Err(LintError::stage("broken", "cannot finish either"))
        }
    }

    struct CountFinish(Arc<AtomicUsize>);

    impl Stage for CountFinish {
        fn name(&self) -> &'static str {
            "count_finish"
        }

        fn process(&mut self, input: &[Diagnostic]) -> Result<Vec<Diagnostic>, LintError> {
            Ok(input.to_vec())
        }

        fn finish(&mut self) -> Result<(), LintError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_stages_run_in_order() {
        let result = PipelineBuilder::new()
            .stage(KeepFirst(3))
            .stage(KeepFirst(1))
            .build()
            .process(diagnostics(5));

        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.stats[0].in_count, 5);
        assert_eq!(result.stats[0].out_count, 3);
        assert_eq!(result.stats[1].in_count, 3);
        assert_eq!(result.stats[0].dropped(), 2);
    }

    #[test]
    fn test_failing_stage_passes_input_through() {
        let result = PipelineBuilder::new()
            .stage(Broken)
            .stage(KeepFirst(10))
            .build()
            .process(diagnostics(4));

        assert_eq!(result.diagnostics.len(), 4);
        assert!(result.stats[0].failed);
        assert_eq!(result.stats[0].out_count, 4);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_finish_runs_for_every_stage_even_after_failures() {
        let finished = Arc::new(AtomicUsize::new(0));
        PipelineBuilder::new()
            .stage(CountFinish(Arc::clone(&finished)))
            .stage(Broken)
            .stage(CountFinish(Arc::clone(&finished)))
            .build()
            .process(diagnostics(1));

        assert_eq!(finished.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_when_skips_stage() {
        let pipeline = PipelineBuilder::new()
            .when(false, |p| p.stage(KeepFirst(0)))
            .stage(KeepFirst(2))
            .build();
        assert_eq!(pipeline.stage_count(), 1);
    }
}
