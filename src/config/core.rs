use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use super::parallel::ParallelConfig;

fn default_true() -> bool {
    true
}

fn default_slow_task_threshold_ms() -> u64 {
    10_000
}

fn default_max_issues_per_linter() -> usize {
    50
}

fn default_max_same_issues() -> usize {
    3
}

/// Formatters report one issue per file; more would only repeat the same diff.
fn default_max_per_file_from_linter() -> BTreeMap<String, usize> {
    BTreeMap::from([("gofmt".to_string(), 1), ("goimports".to_string(), 1)])
}

/// Root configuration structure, read from `.lintfold.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintfoldConfig {
    /// How linters are run and which files they see
    pub run: RunConfig,

    /// How reported issues are filtered
    pub issues: IssuesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Regexes of files whose issues are dropped
    pub skip_files: Vec<String>,

    /// Regexes of directories whose issues are dropped
    pub skip_dirs: Vec<String>,

    /// Also skip `vendor`, `third_party`, `testdata`, ... (default: true)
    #[serde(default = "default_true")]
    pub skip_dirs_use_default: bool,

    /// Build tool cache directories; issues reported inside them are dropped
    pub build_cache_dirs: Vec<PathBuf>,

    /// Linters slower than this are reported in the log (default: 10s)
    #[serde(default = "default_slow_task_threshold_ms")]
    pub slow_task_threshold_ms: u64,

    pub parallel: ParallelConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            skip_files: Vec::new(),
            skip_dirs: Vec::new(),
            skip_dirs_use_default: true,
            build_cache_dirs: Vec::new(),
            slow_task_threshold_ms: default_slow_task_threshold_ms(),
            parallel: ParallelConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn slow_task_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_task_threshold_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuesConfig {
    /// Regexes of issue texts to exclude, matched case-insensitively
    pub exclude: Vec<String>,

    /// Also apply the built-in exclude patterns (default: true)
    #[serde(default = "default_true")]
    pub exclude_use_default: bool,

    pub exclude_rules: Vec<ExcludeRuleConfig>,

    /// Maximum issues per linter, 0 for unlimited (default: 50)
    #[serde(default = "default_max_issues_per_linter")]
    pub max_issues_per_linter: usize,

    /// Maximum issues with the same text, 0 for unlimited (default: 3)
    #[serde(default = "default_max_same_issues")]
    pub max_same_issues: usize,

    /// Per-linter caps on issues reported in one file
    #[serde(default = "default_max_per_file_from_linter")]
    pub max_per_file_from_linter: BTreeMap<String, usize>,

    /// Keep only one issue per line (default: true)
    #[serde(default = "default_true")]
    pub uniq_by_line: bool,

    /// Only show issues in uncommitted changes
    pub new: bool,

    /// Only show issues in changes made after this git revision
    pub new_from_rev: Option<String>,

    /// Only show issues in lines added by this unified diff
    pub new_from_patch: Option<PathBuf>,
}

impl Default for IssuesConfig {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            exclude_use_default: true,
            exclude_rules: Vec::new(),
            max_issues_per_linter: default_max_issues_per_linter(),
            max_same_issues: default_max_same_issues(),
            max_per_file_from_linter: default_max_per_file_from_linter(),
            uniq_by_line: true,
            new: false,
            new_from_rev: None,
            new_from_patch: None,
        }
    }
}

impl IssuesConfig {
    /// Whether any change scope is configured.
    pub fn has_diff_scope(&self) -> bool {
        self.new || self.new_from_rev.is_some() || self.new_from_patch.is_some()
    }
}

/// One `[[issues.exclude_rules]]` entry.
///
/// Every condition that is set must match; unset conditions match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExcludeRuleConfig {
    pub linters: Vec<String>,
    pub path: Option<String>,
    pub text: Option<String>,
    pub source: Option<String>,
}

impl ExcludeRuleConfig {
    /// Number of conditions this rule sets.
    pub fn condition_count(&self) -> usize {
        usize::from(!self.linters.is_empty())
            + usize::from(self.path.is_some())
            + usize::from(self.text.is_some())
            + usize::from(self.source.is_some())
    }
}
