//! One lint run, end to end: resolve the requested linters, run them, and
//! reduce their merged output through the standard pipeline.

use crate::config::{validate, LintfoldConfig};
use crate::context::AnalysisContext;
use crate::core::Diagnostic;
use crate::errors::{format_error_list, LintError, Result};
use crate::linter::{LinterConfig, LinterRegistry};
use crate::observability::StageTiming;
use crate::pipeline::{build_pipeline, PipelineEnv, StageStat};
use crate::runner::{plan_jobs, Runner};
use crate::source::LineCache;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// What a front-end shows after a run.
#[derive(Debug, Clone, Default)]
pub struct LintReport {
    pub diagnostics: Vec<Diagnostic>,
    /// Linters that failed. The run still produced everything else.
    pub task_errors: Vec<LintError>,
    /// Pipeline stages that errored and were skipped.
    pub stage_errors: Vec<LintError>,
    pub timings: Vec<StageTiming>,
    pub stage_stats: Vec<StageStat>,
    /// Linters never started because the run was cancelled.
    pub skipped: Vec<String>,
}

impl LintReport {
    pub fn has_errors(&self) -> bool {
        !self.task_errors.is_empty() || !self.stage_errors.is_empty()
    }

    /// Render the report for machine consumers.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let errors: Vec<String> = self
            .task_errors
            .iter()
            .chain(&self.stage_errors)
            .map(ToString::to_string)
            .collect();
        serde_json::to_string_pretty(&JsonReport {
            issues: &self.diagnostics,
            stages: &self.stage_stats,
            errors,
            skipped: &self.skipped,
        })
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    issues: &'a [Diagnostic],
    stages: &'a [StageStat],
    errors: Vec<String>,
    skipped: &'a [String],
}

pub struct LintSession {
    config: LintfoldConfig,
    registry: Arc<LinterRegistry>,
    runner: Runner,
}

impl LintSession {
    /// Create a session after validating `config`.
    ///
    /// Every configuration problem is reported in one error.
    pub fn new(config: LintfoldConfig, registry: LinterRegistry) -> Result<Self> {
        if let Err(errors) = validate(&config) {
            return Err(LintError::config(format!(
                "invalid configuration:\n{}",
                format_error_list(&errors)
            )));
        }
        Ok(Self {
            runner: Runner::from_config(&config),
            config,
            registry: Arc::new(registry),
        })
    }

    pub fn with_runner(mut self, runner: Runner) -> Self {
        self.runner = runner;
        self
    }

    pub fn config(&self) -> &LintfoldConfig {
        &self.config
    }

    pub fn registry(&self) -> &LinterRegistry {
        &self.registry
    }

    /// Resolve linter names, alternative names included, to their
    /// configurations. Duplicates collapse onto the first occurrence.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<LinterConfig>> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let config = self
                .registry
                .get(name)
                .ok_or_else(|| LintError::Registry(format!("unknown linter {}", name)))?;
            if seen.insert(config.name().to_string()) {
                resolved.push(config.clone());
            }
        }
        Ok(resolved)
    }

    /// Run the given linters against `ctx` and process their output.
    ///
    /// Fails only when the linters can't be resolved or planned, when the
    /// pipeline can't be built, or when every linter failed.
    pub fn run<S: AsRef<str>>(&self, linters: &[S], ctx: &AnalysisContext) -> Result<LintReport> {
        let enabled = self.resolve(linters)?;
        self.run_linters(&enabled, ctx)
    }

    /// Run the linters the registry enables by default.
    pub fn run_default(&self, ctx: &AnalysisContext) -> Result<LintReport> {
        let enabled: Vec<LinterConfig> = self
            .registry
            .enabled_by_default()
            .into_iter()
            .cloned()
            .collect();
        self.run_linters(&enabled, ctx)
    }

    fn run_linters(&self, enabled: &[LinterConfig], ctx: &AnalysisContext) -> Result<LintReport> {
        let names: Vec<_> = enabled.iter().map(LinterConfig::name).collect();
        log::info!("Active {} linters: [{}]", names.len(), names.join(" "));

        let env = PipelineEnv::new(ctx.root())
            .with_source_files(ctx.files().to_vec())
            .with_registry(Arc::clone(&self.registry))
            .with_line_cache(Arc::new(LineCache::new(ctx.root())));
        let pipeline = build_pipeline(&self.config, &env)?;

        let jobs = plan_jobs(enabled)?;
        let output = self.runner.run(&jobs, ctx)?;
        for err in &output.errors {
            log::warn!("{}", err);
        }

        let processed = pipeline.process(output.diagnostics);
        log::info!(
            "{} issues left after processing, {} files read",
            processed.diagnostics.len(),
            env.line_cache.cached_files()
        );

        Ok(LintReport {
            diagnostics: processed.diagnostics,
            task_errors: output.errors,
            stage_errors: processed.errors,
            timings: output.timings,
            stage_stats: processed.stats,
            skipped: output.skipped,
        })
    }
}
