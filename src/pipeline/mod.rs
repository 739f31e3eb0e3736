//! Diagnostic pipeline.
//!
//! The merged output of every linter passes through an ordered list of
//! [`Stage`]s that filter and rewrite it: path cleanup, generated-file and
//! pattern exclusion, inline suppression, change scoping, count limits and
//! source attachment. [`build_pipeline`] assembles the standard order from
//! configuration; [`PipelineBuilder`] assembles any other.

mod builder;
mod stage;
pub mod stages;
mod standard;

pub use builder::{Pipeline, PipelineBuilder, ProcessedDiagnostics, StageStat};
pub use stage::Stage;
pub use standard::{build_pipeline, PipelineEnv};
