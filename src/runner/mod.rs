//! Task execution with per-task fault isolation.
//!
//! - [`guard`]: the one place panics become `LintError::Fault` values
//! - [`job`]: standalone and batched jobs, job planning
//! - [`engine`]: the [`Runner`] worker pool and deterministic merge

pub mod engine;
pub mod guard;
pub mod job;

pub use engine::{RunOutput, Runner};
pub use guard::run_guarded;
pub use job::{plan_jobs, Job, TaskResult};
