//! lintfold runs many source-code linters as one batch and reduces their
//! findings to a clean, deduplicated, scoped list of diagnostics.
//!
//! The crate has two halves:
//!
//! - the [`runner`], which executes linter tasks with fault isolation and
//!   merges their results in a deterministic order, with batchable linters
//!   folded into one meta-linter by [`analysis::meta`] so shared
//!   prerequisites are computed once
//! - the [`pipeline`], an ordered list of stages that exclude, suppress,
//!   scope, limit and annotate the merged diagnostics
//!
//! [`LintSession`] ties both together.

// Export modules for library usage
pub mod analysis;
pub mod config;
pub mod context;
pub mod core;
pub mod errors;
pub mod lint;
pub mod linter;
pub mod observability;
pub mod pipeline;
pub mod runner;
pub mod source;

// Re-export commonly used types
pub use crate::analysis::{Analyzer, LogicalLinter, MetaLinter, Prerequisite};
pub use crate::config::{load_config, LintfoldConfig};
pub use crate::context::{AnalysisContext, CancellationToken};
pub use crate::core::{Diagnostic, Finding, LoadLevel, Position, Replacement, TextEdit};
pub use crate::errors::{LintError, Result};
pub use crate::lint::{LintReport, LintSession};
pub use crate::linter::{AnalyzerTask, LinterConfig, LinterRegistry, Preset};
pub use crate::pipeline::{build_pipeline, Pipeline, PipelineBuilder, PipelineEnv, Stage};
pub use crate::runner::{RunOutput, Runner, TaskResult};
