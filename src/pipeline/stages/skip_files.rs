use crate::core::Diagnostic;
use crate::errors::LintError;
use crate::pipeline::stage::filter_diagnostics;
use crate::pipeline::Stage;
use regex::Regex;

/// Drops diagnostics whose file path matches any configured regex.
pub struct SkipFiles {
    patterns: Vec<Regex>,
}

impl SkipFiles {
    pub fn new(patterns: &[String]) -> Result<Self, LintError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    LintError::config(format!("can't compile regex {:?} for skip_files: {}", p, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }
}

/// Path as matched by path patterns: `/`-separated on every platform.
pub(crate) fn path_text(path: &std::path::Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

impl Stage for SkipFiles {
    fn name(&self) -> &'static str {
        "skip_files"
    }

    fn process(&mut self, input: &[Diagnostic]) -> Result<Vec<Diagnostic>, LintError> {
        if self.patterns.is_empty() {
            return Ok(input.to_vec());
        }
        filter_diagnostics(input, |d| {
            let path = path_text(d.path());
            Ok(!self.patterns.iter().any(|re| re.is_match(&path)))
        })
    }
}
