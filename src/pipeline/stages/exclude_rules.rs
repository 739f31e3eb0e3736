//! Rule-based exclusion.
//!
//! A rule combines up to four conditions. Every condition a rule sets must
//! match for the rule to drop a diagnostic; unset conditions are wildcards.
//! The `source` condition reads the diagnostic's source line through the
//! shared line cache, and only for rules that have one.

use super::skip_files::path_text;
use crate::config::{ExcludeRuleConfig, MIN_RULE_CONDITIONS};
use crate::core::Diagnostic;
use crate::errors::LintError;
use crate::pipeline::stage::filter_diagnostics;
use crate::pipeline::Stage;
use crate::source::LineCache;
use regex::Regex;
use std::sync::Arc;

#[derive(Debug)]
struct ExcludeRule {
    linters: Vec<String>,
    path: Option<Regex>,
    text: Option<Regex>,
    source: Option<Regex>,
}

impl ExcludeRule {
    fn compile(index: usize, config: &ExcludeRuleConfig) -> Result<Self, LintError> {
        if config.condition_count() < MIN_RULE_CONDITIONS {
            return Err(LintError::config(format!(
                "exclude rule #{}: at least {} of (text, source, path, linters) should be set",
                index + 1,
                MIN_RULE_CONDITIONS
            )));
        }
        let compile = |field: &str, pattern: &Option<String>, case_insensitive: bool| {
            pattern
                .as_ref()
                .map(|p| {
                    let source = if case_insensitive {
                        format!("(?i){}", p)
                    } else {
                        p.clone()
                    };
                    Regex::new(&source).map_err(|e| {
                        LintError::config(format!(
                            "exclude rule #{}: can't compile {} regex {:?}: {}",
                            index + 1,
                            field,
                            p,
                            e
                        ))
                    })
                })
                .transpose()
        };

        Ok(Self {
            linters: config.linters.clone(),
            path: compile("path", &config.path, false)?,
            text: compile("text", &config.text, true)?,
            source: compile("source", &config.source, false)?,
        })
    }

    fn matches(&self, diagnostic: &Diagnostic, line_cache: &LineCache) -> bool {
        if !self.linters.is_empty() && !self.linters.iter().any(|l| l == diagnostic.linter()) {
            return false;
        }
        if let Some(text) = &self.text {
            if !text.is_match(&diagnostic.message) {
                return false;
            }
        }
        if let Some(path) = &self.path {
            if !path.is_match(&path_text(diagnostic.path())) {
                return false;
            }
        }
        if let Some(source) = &self.source {
            let line = match &diagnostic.source_line {
                Some(line) => line.clone(),
                None => match line_cache.line(diagnostic.path(), diagnostic.line()) {
                    Ok(line) => line,
                    Err(err) => {
                        log::warn!("Failed to get line for {}: {}", diagnostic.position, err);
                        return false;
                    }
                },
            };
            if !source.is_match(&line) {
                return false;
            }
        }
        true
    }
}

pub struct ExcludeRules {
    rules: Vec<ExcludeRule>,
    line_cache: Arc<LineCache>,
}

impl ExcludeRules {
    pub fn new(rules: &[ExcludeRuleConfig], line_cache: Arc<LineCache>) -> Result<Self, LintError> {
        let rules = rules
            .iter()
            .enumerate()
            .map(|(index, rule)| ExcludeRule::compile(index, rule))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules, line_cache })
    }
}

impl Stage for ExcludeRules {
    fn name(&self) -> &'static str {
        "exclude-rules"
    }

    fn process(&mut self, input: &[Diagnostic]) -> Result<Vec<Diagnostic>, LintError> {
        if self.rules.is_empty() {
            return Ok(input.to_vec());
        }
        let line_cache = &self.line_cache;
        filter_diagnostics(input, |d| {
            Ok(!self.rules.iter().any(|rule| rule.matches(d, line_cache)))
        })
    }
}
