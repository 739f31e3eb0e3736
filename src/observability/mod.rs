//! Observability infrastructure: fault reports, run context and timing.
//!
//! ## Features
//!
//! - **Fault hook**: captures message, location and stack trace of panics
//!   inside guarded linter runs
//! - **Context tracking**: thread-local linter and phase for fault reports,
//!   per-run job progress
//! - **Timing**: per-run stopwatches for linters and pipeline stages
//! - **Logging**: `env_logger` setup for embedding front-ends

pub mod context;
pub mod fault_hook;
pub mod logging;
pub mod timing;

pub use context::{
    get_current_context, set_current_linter, set_phase, ContextGuard, LintPhase, Progress,
    RunContext,
};
pub use fault_hook::{install_fault_hook, FaultReport};
pub use logging::init_logging;
pub use timing::{format_duration, worker_idle_times, StageTiming, Stopwatch};
