//! Task runner: executes jobs, isolates failures and merges results.
//!
//! Jobs run either sequentially or on a fixed pool of scoped worker threads
//! pulling job indices from a `crossbeam` channel. Either way results are
//! merged in job order, so callers see the same diagnostic order no matter
//! how the workers interleaved.

use super::job::{Job, TaskResult};
use crate::config::{LintfoldConfig, ParallelConfig};
use crate::context::AnalysisContext;
use crate::core::Diagnostic;
use crate::errors::LintError;
use crate::observability::{
    format_duration, install_fault_hook, worker_idle_times, Progress, StageTiming, Stopwatch,
};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

const DEFAULT_SLOW_TASK_THRESHOLD: Duration = Duration::from_secs(10);

/// Everything a run produced.
#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    pub diagnostics: Vec<Diagnostic>,
    /// Errors of failed linters, in job order. They never stopped the run.
    pub errors: Vec<LintError>,
    /// Per-linter durations, in job order.
    pub timings: Vec<StageTiming>,
    /// Linters never started because the run was cancelled.
    pub skipped: Vec<String>,
}

impl RunOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Runner {
    parallel: ParallelConfig,
    slow_task_threshold: Duration,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(ParallelConfig::default())
    }
}

impl Runner {
    pub fn new(parallel: ParallelConfig) -> Self {
        Self {
            parallel,
            slow_task_threshold: DEFAULT_SLOW_TASK_THRESHOLD,
        }
    }

    pub fn sequential() -> Self {
        Self::new(ParallelConfig::sequential())
    }

    pub fn from_config(config: &LintfoldConfig) -> Self {
        Self::new(config.run.parallel.clone())
            .with_slow_task_threshold(config.run.slow_task_threshold())
    }

    /// Tasks running longer than this are reported (never interrupted).
    pub fn with_slow_task_threshold(mut self, threshold: Duration) -> Self {
        self.slow_task_threshold = threshold;
        self
    }

    /// Run every job against `ctx`.
    ///
    /// One job failing, even by panicking, never affects the others. The
    /// run itself fails only when nothing succeeded and at least one linter
    /// failed; the first error in job order is returned then.
    pub fn run(&self, jobs: &[Job], ctx: &AnalysisContext) -> Result<RunOutput, LintError> {
        install_fault_hook();
        let progress = Progress::new(jobs.len());

        let workers = self.worker_count(jobs.len());
        let slots = if workers > 1 {
            self.run_parallel(jobs, ctx, workers, &progress)
        } else {
            run_sequential(jobs, ctx, &progress)
        };

        self.merge(jobs, slots)
    }

    fn worker_count(&self, jobs: usize) -> usize {
        if !self.parallel.enabled {
            return 1;
        }
        self.parallel.effective_concurrency().min(jobs).max(1)
    }

    fn run_parallel(
        &self,
        jobs: &[Job],
        ctx: &AnalysisContext,
        workers: usize,
        progress: &Progress,
    ) -> Vec<Option<Vec<TaskResult>>> {
        log::debug!("Running {} jobs on {} workers", jobs.len(), workers);

        let (sender, receiver) = crossbeam::channel::unbounded();
        for index in 0..jobs.len() {
            // The receiver outlives this loop, so sending cannot fail.
            let _ = sender.send(index);
        }
        drop(sender);

        let slots: Mutex<Vec<Option<Vec<TaskResult>>>> =
            Mutex::new((0..jobs.len()).map(|_| None).collect());

        let finish_times: Vec<Instant> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let receiver = receiver.clone();
                    let slots = &slots;
                    scope.spawn(move || {
                        for index in receiver.iter() {
                            if ctx.is_cancelled() {
                                break;
                            }
                            let results = jobs[index].execute(ctx);
                            progress.finish_one();
                            slots.lock()[index] = Some(results);
                        }
                        Instant::now()
                    })
                })
                .collect();

            handles
                .into_iter()
                .filter_map(|handle| match handle.join() {
                    Ok(finished) => Some(finished),
                    Err(_) => {
                        log::warn!("Runner worker terminated abnormally");
                        None
                    }
                })
                .collect()
        });

        let idle = worker_idle_times(&finish_times);
        if !idle.is_empty() {
            log::info!(
                "Workers idle times: {}",
                idle.iter()
                    .map(|d| format_duration(*d))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        slots.into_inner()
    }

    fn merge(
        &self,
        jobs: &[Job],
        slots: Vec<Option<Vec<TaskResult>>>,
    ) -> Result<RunOutput, LintError> {
        let mut output = RunOutput::default();
        let mut stopwatch = Stopwatch::new("linters");
        let mut succeeded = 0usize;

        for (job, slot) in jobs.iter().zip(slots) {
            let Some(results) = slot else {
                output.skipped.extend(job.linter_names());
                continue;
            };

            for result in results {
                stopwatch.record(&result.linter, result.duration);
                output.timings.push(StageTiming {
                    name: result.linter.clone(),
                    duration: result.duration,
                });
                if result.duration > self.slow_task_threshold {
                    log::warn!(
                        "Linter {} took {}",
                        result.linter,
                        format_duration(result.duration)
                    );
                }

                match result.outcome {
                    Ok(diagnostics) => {
                        succeeded += 1;
                        log::debug!(
                            "Linter {} reported {} issues",
                            result.linter,
                            diagnostics.len()
                        );
                        output.diagnostics.extend(diagnostics);
                    }
                    Err(LintError::Cancelled(linter)) => output.skipped.push(linter),
                    Err(err) => {
                        log::warn!("{}", err);
                        output.errors.push(err);
                    }
                }
            }
        }

        if !output.skipped.is_empty() {
            log::warn!(
                "Run cancelled, linters not started: {}",
                output.skipped.join(", ")
            );
        }
        stopwatch.print();

        if succeeded == 0 && !output.errors.is_empty() {
            return Err(output.errors.swap_remove(0));
        }
        Ok(output)
    }
}

fn run_sequential(
    jobs: &[Job],
    ctx: &AnalysisContext,
    progress: &Progress,
) -> Vec<Option<Vec<TaskResult>>> {
    let mut slots: Vec<Option<Vec<TaskResult>>> = Vec::with_capacity(jobs.len());
    for job in jobs {
        if ctx.is_cancelled() {
            slots.push(None);
            continue;
        }
        slots.push(Some(job.execute(ctx)));
        progress.finish_one();
    }
    slots
}
