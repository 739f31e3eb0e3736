//! Thread-local context tracking for fault reports.
//!
//! Records which linter (and which phase of the run) the current thread is
//! working on, so a contained panic can say where it happened. Uses
//! thread-local storage because linters run on worker threads; guards
//! restore the previous context on drop, which makes nesting work (a
//! prerequisite inside a batch inside a worker).

use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};

thread_local! {
    static CURRENT_CONTEXT: RefCell<RunContext> = const { RefCell::new(RunContext::new()) };
}

/// Snapshot of what the current thread is doing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContext {
    pub phase: Option<LintPhase>,
    pub current_linter: Option<String>,
}

impl RunContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: None,
            current_linter: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintPhase {
    /// Computing shared prerequisites of a batch
    Prerequisites,
    /// Running analyzer tasks
    Linting,
    /// Running issue reporters attached to batched linters
    Reporting,
    /// Running the diagnostic pipeline
    Processing,
}

impl std::fmt::Display for LintPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prerequisites => write!(f, "prerequisites"),
            Self::Linting => write!(f, "linting"),
            Self::Reporting => write!(f, "reporting"),
            Self::Processing => write!(f, "processing"),
        }
    }
}

/// RAII guard restoring the previous context on drop.
pub struct ContextGuard {
    previous: RunContext,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CURRENT_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = self.previous.clone();
        });
    }
}

#[must_use]
pub fn set_phase(phase: LintPhase) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        ctx.borrow_mut().phase = Some(phase);
        ContextGuard { previous }
    })
}

#[must_use]
pub fn set_current_linter(name: &str) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        ctx.borrow_mut().current_linter = Some(name.to_string());
        ContextGuard { previous }
    })
}

pub fn get_current_context() -> RunContext {
    CURRENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Finished-job counter of one run, shared by that run's workers.
#[derive(Debug)]
pub struct Progress {
    finished: AtomicUsize,
    total: usize,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            finished: AtomicUsize::new(0),
            total,
        }
    }

    /// Count one finished job, returning how many are done.
    pub fn finish_one(&self) -> usize {
        let done = self.finished.fetch_add(1, Ordering::Relaxed) + 1;
        log::debug!("Finished {}/{} jobs", done, self.total);
        done
    }

    /// (finished, total) jobs.
    pub fn get(&self) -> (usize, usize) {
        (self.finished.load(Ordering::Relaxed), self.total)
    }
}
