//! The capability interface every standalone linter implements.

use crate::context::AnalysisContext;
use crate::core::Finding;

/// An opaque unit that inspects program data and yields findings.
///
/// Implementations are registered once at startup. A task may fail with an
/// ordinary error or even panic; the runner contains both and keeps the
/// rest of the batch going.
pub trait AnalyzerTask: Send + Sync {
    /// Logical linter name shown to users and stamped on every diagnostic.
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn run(&self, ctx: &AnalysisContext) -> anyhow::Result<Vec<Finding>>;
}

/// An [`AnalyzerTask`] backed by a closure.
///
/// # Example
///
/// ```rust
/// use lintfold::core::{Finding, Position};
/// use lintfold::linter::{AnalyzerTask, FnTask};
/// use lintfold::AnalysisContext;
///
/// let task = FnTask::new("todo", |_ctx: &AnalysisContext| {
///     Ok(vec![Finding::new("TODO left in code", Position::line_only("main.go", 4))])
/// });
/// let findings = task.run(&AnalysisContext::new(".")).unwrap();
/// assert_eq!(findings.len(), 1);
/// ```
pub struct FnTask<F> {
    name: String,
    description: String,
    func: F,
}

impl<F> FnTask<F>
where
    F: Fn(&AnalysisContext) -> anyhow::Result<Vec<Finding>> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            func,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl<F> AnalyzerTask for FnTask<F>
where
    F: Fn(&AnalysisContext) -> anyhow::Result<Vec<Finding>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn run(&self, ctx: &AnalysisContext) -> anyhow::Result<Vec<Finding>> {
        (self.func)(ctx)
    }
}
