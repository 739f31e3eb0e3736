//! Batchable analyzers and their shared prerequisites.
//!
//! A [`LogicalLinter`] is what users see as one linter. Underneath it runs
//! one or more [`Analyzer`]s, each declaring the [`Prerequisite`]
//! computations it needs (parsed syntax trees, whole-program type facts,
//! ...). The [`meta`] module batches many logical linters so each
//! prerequisite is computed once and shared read-only.

pub mod meta;

pub use meta::{aggregate, BatchPlan, MetaLinter};

use crate::context::AnalysisContext;
use crate::core::{Finding, LoadLevel};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Result of a prerequisite computation, shared read-only by every dependent analyzer.
pub type PrerequisiteValue = Arc<dyn Any + Send + Sync>;

/// Collaborator producing findings after a batched linter's analyzers ran.
pub type IssuesReporter =
    Arc<dyn Fn(&AnalysisContext) -> anyhow::Result<Vec<Finding>> + Send + Sync>;

/// A computation several analyzers may depend on.
///
/// Identity is the [`id`](Prerequisite::id): two instances with the same id
/// are the same computation and run once per batch.
pub trait Prerequisite: Send + Sync {
    fn id(&self) -> &str;

    /// Compute the value at the batch's load level, which is never below
    /// the level any dependent linter declared.
    fn compute(&self, ctx: &AnalysisContext, level: LoadLevel) -> anyhow::Result<PrerequisiteValue>;
}

pub trait Analyzer: Send + Sync {
    fn name(&self) -> &str;

    fn requires(&self) -> Vec<Arc<dyn Prerequisite>> {
        Vec::new()
    }

    fn run(&self, pass: &Pass<'_>) -> anyhow::Result<Vec<Finding>>;
}

/// Computed prerequisite values of one batch run, keyed by prerequisite id.
#[derive(Default, Clone)]
pub struct PrerequisiteResults {
    values: HashMap<String, PrerequisiteValue>,
}

impl PrerequisiteResults {
    pub fn insert(&mut self, id: impl Into<String>, value: PrerequisiteValue) {
        self.values.insert(id.into(), value);
    }

    pub fn get<T: Any + Send + Sync>(&self, id: &str) -> Option<&T> {
        self.values.get(id)?.downcast_ref::<T>()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// What an analyzer sees while running inside a batch.
pub struct Pass<'a> {
    ctx: &'a AnalysisContext,
    load_level: LoadLevel,
    results: &'a PrerequisiteResults,
}

impl<'a> Pass<'a> {
    pub fn new(
        ctx: &'a AnalysisContext,
        load_level: LoadLevel,
        results: &'a PrerequisiteResults,
    ) -> Self {
        Self {
            ctx,
            load_level,
            results,
        }
    }

    pub fn ctx(&self) -> &AnalysisContext {
        self.ctx
    }

    pub fn load_level(&self) -> LoadLevel {
        self.load_level
    }

    pub fn result<T: Any + Send + Sync>(&self, id: &str) -> Option<&T> {
        self.results.get::<T>(id)
    }

    /// Like [`result`](Self::result) but an error when the value is missing or of another type.
    pub fn require<T: Any + Send + Sync>(&self, id: &str) -> anyhow::Result<&T> {
        self.result::<T>(id)
            .ok_or_else(|| anyhow::anyhow!("prerequisite {} is not available", id))
    }
}

/// A named group of analyzers presented to users as one linter.
#[derive(Clone)]
pub struct LogicalLinter {
    name: String,
    description: String,
    analyzers: Vec<Arc<dyn Analyzer>>,
    load_level: LoadLevel,
    issues_reporter: Option<IssuesReporter>,
}

impl LogicalLinter {
    pub fn new(name: impl Into<String>, analyzers: Vec<Arc<dyn Analyzer>>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            analyzers,
            load_level: LoadLevel::Syntax,
            issues_reporter: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_load_level(mut self, level: LoadLevel) -> Self {
        self.load_level = level;
        self
    }

    pub fn with_issues_reporter(mut self, reporter: IssuesReporter) -> Self {
        self.issues_reporter = Some(reporter);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn analyzers(&self) -> &[Arc<dyn Analyzer>] {
        &self.analyzers
    }

    pub fn load_level(&self) -> LoadLevel {
        self.load_level
    }

    pub fn issues_reporter(&self) -> Option<&IssuesReporter> {
        self.issues_reporter.as_ref()
    }

    /// Ids of every prerequisite this linter depends on, first-declared order, no duplicates.
    pub fn prerequisite_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for analyzer in &self.analyzers {
            for prerequisite in analyzer.requires() {
                if !ids.iter().any(|id| id == prerequisite.id()) {
                    ids.push(prerequisite.id().to_string());
                }
            }
        }
        ids
    }
}

impl std::fmt::Debug for LogicalLinter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogicalLinter")
            .field("name", &self.name)
            .field(
                "analyzers",
                &self.analyzers.iter().map(|a| a.name()).collect::<Vec<_>>(),
            )
            .field("load_level", &self.load_level)
            .field("has_issues_reporter", &self.issues_reporter.is_some())
            .finish()
    }
}

/// An [`Analyzer`] backed by a closure.
pub struct FnAnalyzer<F> {
    name: String,
    requires: Vec<Arc<dyn Prerequisite>>,
    func: F,
}

impl<F> FnAnalyzer<F>
where
    F: Fn(&Pass<'_>) -> anyhow::Result<Vec<Finding>> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            requires: Vec::new(),
            func,
        }
    }

    pub fn requiring(mut self, prerequisite: Arc<dyn Prerequisite>) -> Self {
        self.requires.push(prerequisite);
        self
    }
}

impl<F> Analyzer for FnAnalyzer<F>
where
    F: Fn(&Pass<'_>) -> anyhow::Result<Vec<Finding>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn requires(&self) -> Vec<Arc<dyn Prerequisite>> {
        self.requires.clone()
    }

    fn run(&self, pass: &Pass<'_>) -> anyhow::Result<Vec<Finding>> {
        (self.func)(pass)
    }
}

/// A [`Prerequisite`] backed by a closure.
pub struct FnPrerequisite<F> {
    id: String,
    func: F,
}

impl<F> FnPrerequisite<F>
where
    F: Fn(&AnalysisContext, LoadLevel) -> anyhow::Result<PrerequisiteValue> + Send + Sync,
{
    pub fn new(id: impl Into<String>, func: F) -> Self {
        Self {
            id: id.into(),
            func,
        }
    }
}

impl<F> Prerequisite for FnPrerequisite<F>
where
    F: Fn(&AnalysisContext, LoadLevel) -> anyhow::Result<PrerequisiteValue> + Send + Sync,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn compute(&self, ctx: &AnalysisContext, level: LoadLevel) -> anyhow::Result<PrerequisiteValue> {
        (self.func)(ctx, level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Position;

    fn syntax_trees() -> Arc<dyn Prerequisite> {
        Arc::new(FnPrerequisite::new("syntax_trees", |ctx: &AnalysisContext, _| {
            Ok(Arc::new(ctx.files().len()) as PrerequisiteValue)
        }))
    }

    #[test]
    fn test_prerequisite_ids_are_deduplicated() {
        let a: Arc<dyn Analyzer> = Arc::new(
            FnAnalyzer::new("a", |_: &Pass<'_>| Ok(vec![])).requiring(syntax_trees()),
        );
        let b: Arc<dyn Analyzer> = Arc::new(
            FnAnalyzer::new("b", |_: &Pass<'_>| Ok(vec![])).requiring(syntax_trees()),
        );
        let linter = LogicalLinter::new("pair", vec![a, b]);
        assert_eq!(linter.prerequisite_ids(), vec!["syntax_trees".to_string()]);
    }

    #[test]
    fn test_pass_reads_typed_results() {
        let ctx = AnalysisContext::new(".");
        let mut results = PrerequisiteResults::default();
        results.insert("count", Arc::new(3_usize) as PrerequisiteValue);
        let pass = Pass::new(&ctx, LoadLevel::Types, &results);

        assert_eq!(pass.result::<usize>("count"), Some(&3));
        assert!(pass.result::<String>("count").is_none());
        assert!(pass.require::<usize>("missing").is_err());
    }

    #[test]
    fn test_fn_analyzer_runs_against_pass() {
        let analyzer = FnAnalyzer::new("files", |pass: &Pass<'_>| {
            let count = pass.require::<usize>("count")?;
            Ok(vec![Finding::new(
                format!("{} files", count),
                Position::line_only("a.go", 1),
            )])
        });
        let ctx = AnalysisContext::new(".");
        let mut results = PrerequisiteResults::default();
        results.insert("count", Arc::new(2_usize) as PrerequisiteValue);

        let findings = analyzer.run(&Pass::new(&ctx, LoadLevel::Syntax, &results)).unwrap();
        assert_eq!(findings[0].message, "2 files");
    }
}
