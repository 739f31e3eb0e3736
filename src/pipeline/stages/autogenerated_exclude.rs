use crate::core::Diagnostic;
use crate::errors::LintError;
use crate::pipeline::Stage;
use crate::source::LineCache;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const GENERATED_MARKERS: &[&str] = &["code generated", "do not edit", "autogenerated file"];

/// Drops diagnostics in machine-generated files.
///
/// A file counts as generated when a comment in its header (the leading
/// run of comment and blank lines) contains one of the well-known markers.
/// The verdict is cached per file for the run. A file that can't be read
/// counts as not generated.
pub struct AutogeneratedExclude {
    line_cache: Arc<LineCache>,
    verdicts: HashMap<PathBuf, bool>,
}

impl AutogeneratedExclude {
    pub fn new(line_cache: Arc<LineCache>) -> Self {
        Self {
            line_cache,
            verdicts: HashMap::new(),
        }
    }

    fn is_generated(&mut self, path: &Path) -> bool {
        if let Some(&verdict) = self.verdicts.get(path) {
            return verdict;
        }
        let verdict = match self.line_cache.lines(path) {
            Ok(lines) => has_generated_header(&lines),
            Err(err) => {
                log::warn!("Can't check whether {} is generated: {}", path.display(), err);
                false
            }
        };
        if verdict {
            log::debug!("File {} is generated", path.display());
        }
        self.verdicts.insert(path.to_path_buf(), verdict);
        verdict
    }
}

fn is_comment(line: &str) -> bool {
    ["//", "/*", "*", "#"].iter().any(|p| line.starts_with(p))
}

pub(crate) fn has_generated_header(lines: &[String]) -> bool {
    lines
        .iter()
        .map(|l| l.trim())
        .take_while(|l| l.is_empty() || is_comment(l))
        .filter(|l| !l.is_empty())
        .any(|comment| {
            let lower = comment.to_lowercase();
            GENERATED_MARKERS.iter().any(|marker| lower.contains(marker))
        })
}

impl Stage for AutogeneratedExclude {
    fn name(&self) -> &'static str {
        "autogenerated_exclude"
    }

    fn process(&mut self, input: &[Diagnostic]) -> Result<Vec<Diagnostic>, LintError> {
        Ok(input
            .iter()
            .filter(|d| !self.is_generated(d.path()))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Finding, Position};
    use indoc::indoc;
    use std::fs;
    use tempfile::TempDir;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_header_markers() {
        assert!(has_generated_header(&lines(indoc! {"
            // Code generated by protoc-gen-go. DO NOT EDIT.
            package api
        "})));
        assert!(has_generated_header(&lines(indoc! {"

            /*
             * This is an autogenerated file
             */
            package x
        "})));
        assert!(!has_generated_header(&lines(indoc! {"
            package main

            // do not edit this by hand
        "})));
    }

    #[test]
    fn test_drops_generated_files_only() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("gen.go"), "// Code generated. DO NOT EDIT.\npackage a\n").unwrap();
        fs::write(temp.path().join("main.go"), "package a\n").unwrap();

        let input: Vec<_> = ["gen.go", "main.go", "gen.go"]
            .iter()
            .map(|p| Finding::new("m", Position::line_only(*p, 2)).attribute("x"))
            .collect();
        let mut stage = AutogeneratedExclude::new(Arc::new(LineCache::new(temp.path())));
        let output = stage.process(&input).unwrap();

        assert_eq!(output.len(), 1);
        assert_eq!(output[0].path(), Path::new("main.go"));
        assert_eq!(stage.verdicts.len(), 2);
    }

    #[test]
    fn test_unreadable_file_is_kept() {
        let input = vec![Finding::new("m", Position::line_only("missing.go", 1)).attribute("x")];
        let mut stage = AutogeneratedExclude::new(Arc::new(LineCache::new("/nonexistent")));
        assert_eq!(stage.process(&input).unwrap(), input);
    }

    #[test]
    fn test_non_utf8_file_does_not_hide_generated_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("gen.go"), "// Code generated. DO NOT EDIT.\npackage a\n").unwrap();
        fs::write(temp.path().join("latin1.go"), b"// caf\xe9\npackage a\n").unwrap();

        let input: Vec<_> = ["latin1.go", "gen.go", "missing.go"]
            .iter()
            .map(|p| Finding::new("m", Position::line_only(*p, 2)).attribute("x"))
            .collect();
        let mut stage = AutogeneratedExclude::new(Arc::new(LineCache::new(temp.path())));
        let output = stage.process(&input).unwrap();

        let paths: Vec<_> = output.iter().map(Diagnostic::path).collect();
        assert_eq!(paths, vec![Path::new("latin1.go"), Path::new("missing.go")]);
    }
}
