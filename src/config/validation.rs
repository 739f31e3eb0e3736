//! Validation with error accumulation for configuration.
//!
//! Every problem is collected before reporting, so users see all
//! configuration issues in a single run instead of fixing them one by one.
//!
//! # Example
//!
//! ```rust
//! use lintfold::config::{validate, LintfoldConfig};
//!
//! let mut config = LintfoldConfig::default();
//! config.issues.exclude.push("unclosed (group".into());
//! config.run.skip_files.push("[".into());
//!
//! let errors = validate(&config).unwrap_err();
//! assert_eq!(errors.len(), 2);
//! ```

use regex::Regex;

use super::core::{ExcludeRuleConfig, LintfoldConfig};
use crate::errors::LintError;

/// Rules must narrow by at least this many conditions; a single-condition
/// rule is what `exclude` or `skip_*` are for.
pub const MIN_RULE_CONDITIONS: usize = 2;

/// Validate the whole config, accumulating ALL errors.
pub fn validate(config: &LintfoldConfig) -> Result<(), Vec<LintError>> {
    let mut errors = Vec::new();

    check_patterns("run.skip_files", &config.run.skip_files, &mut errors);
    check_patterns("run.skip_dirs", &config.run.skip_dirs, &mut errors);
    check_patterns("issues.exclude", &config.issues.exclude, &mut errors);

    for (index, rule) in config.issues.exclude_rules.iter().enumerate() {
        errors.extend(validate_rule(index, rule));
    }

    if config.issues.new_from_rev.is_some() && config.issues.new_from_patch.is_some() {
        errors.push(LintError::config(
            "issues.new_from_rev and issues.new_from_patch are mutually exclusive",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate one exclude rule, returning every problem found.
pub fn validate_rule(index: usize, rule: &ExcludeRuleConfig) -> Vec<LintError> {
    let mut errors = Vec::new();
    let field = format!("issues.exclude_rules[{}]", index);

    if rule.condition_count() < MIN_RULE_CONDITIONS {
        errors.push(LintError::config(format!(
            "{}: at least {} of (text, source, path, linters) should be set",
            field, MIN_RULE_CONDITIONS
        )));
    }

    for (name, pattern) in [
        ("text", &rule.text),
        ("source", &rule.source),
        ("path", &rule.path),
    ] {
        if let Some(pattern) = pattern {
            if let Err(e) = Regex::new(pattern) {
                errors.push(pattern_error(&format!("{}.{}", field, name), pattern, &e));
            }
        }
    }

    errors
}

fn check_patterns(field: &str, patterns: &[String], errors: &mut Vec<LintError>) {
    for pattern in patterns {
        if let Err(e) = Regex::new(pattern) {
            errors.push(pattern_error(field, pattern, &e));
        }
    }
}

fn pattern_error(field: &str, pattern: &str, error: &regex::Error) -> LintError {
    LintError::config(format!("{}: can't compile regex {:?}: {}", field, pattern, error))
}
