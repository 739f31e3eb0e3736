use super::skip_files::path_text;
use crate::core::Diagnostic;
use crate::errors::LintError;
use crate::pipeline::Stage;
use regex::Regex;
use std::collections::BTreeMap;

/// Drops diagnostics located in directories matching any configured regex.
///
/// Patterns are matched against the directory part of the (already
/// prettified) path, so `(^|/)vendor($|/)` hits `vendor/x.go` and
/// `pkg/vendor/lib/y.go` but not `vendored/z.go`.
pub struct SkipDirs {
    patterns: Vec<Regex>,
    skipped: BTreeMap<String, usize>,
}

impl SkipDirs {
    pub fn new(patterns: &[String]) -> Result<Self, LintError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    LintError::config(format!("can't compile regex {:?} for skip_dirs: {}", p, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            patterns,
            skipped: BTreeMap::new(),
        })
    }
}

impl Stage for SkipDirs {
    fn name(&self) -> &'static str {
        "skip_dirs"
    }

    fn process(&mut self, input: &[Diagnostic]) -> Result<Vec<Diagnostic>, LintError> {
        if self.patterns.is_empty() {
            return Ok(input.to_vec());
        }

        let mut output = Vec::with_capacity(input.len());
        for diagnostic in input {
            let dir = diagnostic
                .path()
                .parent()
                .map(path_text)
                .unwrap_or_default();
            match self.patterns.iter().find(|re| re.is_match(&dir)) {
                Some(re) => *self.skipped.entry(re.as_str().to_string()).or_default() += 1,
                None => output.push(diagnostic.clone()),
            }
        }
        Ok(output)
    }

    fn finish(&mut self) -> Result<(), LintError> {
        for (pattern, count) in &self.skipped {
            log::info!("Skipped {} issues by pattern {:?}", count, pattern);
        }
        Ok(())
    }
}
