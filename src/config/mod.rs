//! Configuration: `.lintfold.toml` types, discovery, validation and the
//! built-in exclude patterns.

mod core;
pub mod defaults;
mod loader;
mod parallel;
pub mod validation;

pub use self::core::{ExcludeRuleConfig, IssuesConfig, LintfoldConfig, RunConfig};
pub use defaults::{
    default_exclude_patterns, default_skip_dir_patterns, exclude_pattern_by_id, ExcludePattern,
    DEFAULT_SKIP_DIRS,
};
pub use loader::{
    directory_ancestors, load_config, load_config_from, load_config_from_path, parse_config,
    CONFIG_FILE_NAME,
};
pub use parallel::ParallelConfig;
pub use validation::{validate, MIN_RULE_CONDITIONS};
