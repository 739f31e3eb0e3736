//! The standard stage order, assembled from configuration.

use super::builder::{Pipeline, PipelineBuilder};
use super::stages::diff::{absolute_dir, absolutize};
use super::stages::{
    AutogeneratedExclude, Diff, DiffScope, Exclude, ExcludeRules, IdentifierMarker,
    MaxFromLinter, MaxPerFileFromLinter, MaxSameIssues, Nolint, PathNormalizer, PathPrettifier,
    PathShortener, SkipDirs, SkipFiles, SourceCode, UniqByLine,
};
use crate::config::{default_exclude_patterns, default_skip_dir_patterns, LintfoldConfig};
use crate::errors::Result;
use crate::linter::LinterRegistry;
use crate::source::LineCache;
use std::path::PathBuf;
use std::sync::Arc;

/// What the pipeline needs to know about the run besides configuration.
#[derive(Debug, Clone)]
pub struct PipelineEnv {
    pub working_dir: PathBuf,
    /// Files handed to the linters; searched for `//line` directives.
    pub source_files: Vec<PathBuf>,
    pub line_cache: Arc<LineCache>,
    pub registry: Arc<LinterRegistry>,
}

impl PipelineEnv {
    /// A relative `working_dir` is resolved against the current directory.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = absolute_dir(&working_dir.into());
        Self {
            line_cache: Arc::new(LineCache::new(&working_dir)),
            working_dir,
            source_files: Vec::new(),
            registry: Arc::new(LinterRegistry::default()),
        }
    }

    pub fn with_source_files(mut self, files: Vec<PathBuf>) -> Self {
        self.source_files = files;
        self
    }

    pub fn with_registry(mut self, registry: Arc<LinterRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_line_cache(mut self, line_cache: Arc<LineCache>) -> Self {
        self.line_cache = line_cache;
        self
    }
}

/// Build the standard pipeline.
///
/// Fails with [`LintError::Config`](crate::errors::LintError::Config) when a
/// configured pattern does not compile.
pub fn build_pipeline(config: &LintfoldConfig, env: &PipelineEnv) -> Result<Pipeline> {
    let run = &config.run;
    let issues = &config.issues;
    let wd = &env.working_dir;

    let mut skip_dirs = run.skip_dirs.clone();
    if run.skip_dirs_use_default {
        skip_dirs.extend(default_skip_dir_patterns());
    }

    let mut excludes = issues.exclude.clone();
    if issues.exclude_use_default {
        excludes.extend(default_exclude_patterns().iter().map(|p| p.pattern.to_string()));
    }

    let build_cache_dirs = run
        .build_cache_dirs
        .iter()
        .map(|dir| absolutize(wd, dir))
        .collect();

    let pipeline = PipelineBuilder::new()
        .stage(PathNormalizer::new(
            build_cache_dirs,
            env.source_files.clone(),
            Arc::clone(&env.line_cache),
        ))
        .stage(PathPrettifier::new(wd.clone()))
        .stage(SkipFiles::new(&run.skip_files)?)
        .stage(SkipDirs::new(&skip_dirs)?)
        .stage(AutogeneratedExclude::new(Arc::clone(&env.line_cache)))
        .stage(IdentifierMarker::new())
        .stage(Exclude::new(&excludes)?)
        .stage(ExcludeRules::new(&issues.exclude_rules, Arc::clone(&env.line_cache))?)
        .stage(Nolint::new(Arc::clone(&env.line_cache), Arc::clone(&env.registry)))
        .when(issues.uniq_by_line, |p| p.stage(UniqByLine::new()))
        .stage(Diff::new(DiffScope::from_config(issues), wd.clone()))
        .stage(MaxPerFileFromLinter::new(issues.max_per_file_from_linter.clone()))
        .stage(MaxSameIssues::new(issues.max_same_issues))
        .stage(MaxFromLinter::new(issues.max_issues_per_linter))
        .stage(SourceCode::new(Arc::clone(&env.line_cache)))
        .stage(PathShortener::new(wd))
        .build();

    log::debug!("Pipeline stages: {}", pipeline.stage_names().join(" -> "));
    Ok(pipeline)
}
