//! Inline suppression through `//nolint` (or `#nolint`) comments.
//!
//! ```text
//! x := f() //nolint:errcheck     suppresses errcheck on this line
//! //nolint:govet,vet              suppresses govet on the next line
//! y := g() //nolint               suppresses every linter on this line
//! ```
//!
//! Names are resolved through the linter registry, so alternative names
//! work. `all` is a wildcard. Names the registry does not know are
//! collected and reported once when the pipeline finishes.

use crate::core::Diagnostic;
use crate::errors::LintError;
use crate::linter::LinterRegistry;
use crate::pipeline::Stage;
use crate::source::LineCache;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The comment marker must start the line or follow whitespace, so
/// `"#nolint"` in a string or `http://x#nolint` doesn't count.
static NOLINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s)(?://|#)\s?nolint(?::([\w\-]+(?:\s*,\s*[\w\-]+)*))?\b")
        .expect("nolint regex is valid")
});

const WILDCARD: &str = "all";

/// One suppression comment and the line it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Suppression {
    line: usize,
    /// Canonical linter names; empty suppresses every linter.
    linters: Vec<String>,
}

impl Suppression {
    fn covers(&self, linter: &str) -> bool {
        self.linters.is_empty() || self.linters.iter().any(|l| l == linter)
    }
}

pub struct Nolint {
    line_cache: Arc<LineCache>,
    registry: Arc<LinterRegistry>,
    files: HashMap<PathBuf, Vec<Suppression>>,
    unknown_linters: BTreeSet<String>,
}

impl Nolint {
    pub fn new(line_cache: Arc<LineCache>, registry: Arc<LinterRegistry>) -> Self {
        Self {
            line_cache,
            registry,
            files: HashMap::new(),
            unknown_linters: BTreeSet::new(),
        }
    }

    fn suppressions(&mut self, path: &Path) -> &[Suppression] {
        if !self.files.contains_key(path) {
            let parsed = match self.line_cache.lines(path) {
                Ok(lines) => self.parse(&lines),
                Err(err) => {
                    log::debug!("Can't look for nolint comments in {}: {}", path.display(), err);
                    Vec::new()
                }
            };
            self.files.insert(path.to_path_buf(), parsed);
        }
        self.files.get(path).map(Vec::as_slice).unwrap_or_default()
    }

    fn parse(&mut self, lines: &[String]) -> Vec<Suppression> {
        let mut suppressions = Vec::new();
        for (index, text) in lines.iter().enumerate() {
            let Some(caps) = NOLINT.captures(text) else {
                continue;
            };
            let linters = caps
                .get(1)
                .map(|names| self.resolve_names(names.as_str()))
                .unwrap_or_default();

            let line = index + 1;
            let trimmed = text.trim_start();
            let comment_only = trimmed.starts_with("//") || trimmed.starts_with('#');
            suppressions.push(Suppression {
                line,
                linters: linters.clone(),
            });
            if comment_only {
                suppressions.push(Suppression {
                    line: line + 1,
                    linters,
                });
            }
        }
        suppressions
    }

    /// Canonical names of a comma-separated list; empty when it contains `all`.
    fn resolve_names(&mut self, names: &str) -> Vec<String> {
        let mut resolved = Vec::new();
        for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if name == WILDCARD {
                return Vec::new();
            }
            match self.registry.canonical_name(name) {
                Some(canonical) => resolved.push(canonical.to_string()),
                None => {
                    if !self.registry.is_empty() {
                        self.unknown_linters.insert(name.to_string());
                    }
                    resolved.push(name.to_string());
                }
            }
        }
        resolved
    }

    fn is_suppressed(&mut self, diagnostic: &Diagnostic) -> bool {
        let linter = self
            .registry
            .canonical_name(diagnostic.linter())
            .unwrap_or(diagnostic.linter())
            .to_string();
        let line = diagnostic.line();
        self.suppressions(diagnostic.path())
            .iter()
            .any(|s| s.line == line && s.covers(&linter))
    }
}

impl Stage for Nolint {
    fn name(&self) -> &'static str {
        "nolint"
    }

    fn process(&mut self, input: &[Diagnostic]) -> Result<Vec<Diagnostic>, LintError> {
        let mut output = Vec::with_capacity(input.len());
        for diagnostic in input {
            if self.is_suppressed(diagnostic) {
                log::debug!("Suppressed by nolint: {}", diagnostic);
            } else {
                output.push(diagnostic.clone());
            }
        }
        Ok(output)
    }

    fn finish(&mut self) -> Result<(), LintError> {
        if !self.unknown_linters.is_empty() {
            let names: Vec<_> = self.unknown_linters.iter().map(String::as_str).collect();
            log::warn!("Found unknown linters in //nolint directives: {}", names.join(", "));
        }
        self.files.clear();
        Ok(())
    }
}
