//! Maps build-tool positions back to real source files.
//!
//! Two things are handled here:
//!
//! - diagnostics reported inside build cache directories (generated glue
//!   code the user never wrote) are dropped
//! - positions produced through `//line file:N` directives are mapped back
//!   to the source file containing the directive
//!
//! A `//line target.tmpl:10` directive at line 4 of `gen.go` says that line
//! 5 of `gen.go` is line 10 of `target.tmpl`, line 6 is line 11, and so on
//! until the next directive. Analyzers honoring the directive report
//! against `target.tmpl`; this stage rewrites such positions to `gen.go`.

use crate::core::{Diagnostic, Position};
use crate::errors::LintError;
use crate::pipeline::Stage;
use crate::source::LineCache;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

static LINE_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^//line (.+?):(\d+)(?::\d+)?\s*$").expect("line directive regex is valid")
});

/// Lines of `source` starting at `source_start` that a directive maps onto
/// `target_start..target_start + len` of the directive's target.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MappedRegion {
    source: PathBuf,
    source_start: usize,
    target_start: usize,
    len: usize,
}

impl MappedRegion {
    fn unadjust(&self, line: usize) -> Option<usize> {
        (line >= self.target_start && line < self.target_start + self.len)
            .then(|| self.source_start + (line - self.target_start))
    }
}

pub struct PathNormalizer {
    build_cache_dirs: Vec<PathBuf>,
    source_files: Vec<PathBuf>,
    line_cache: Arc<LineCache>,
    regions: Option<HashMap<PathBuf, Vec<MappedRegion>>>,
}

impl PathNormalizer {
    pub fn new(
        build_cache_dirs: Vec<PathBuf>,
        source_files: Vec<PathBuf>,
        line_cache: Arc<LineCache>,
    ) -> Self {
        Self {
            build_cache_dirs,
            source_files,
            line_cache,
            regions: None,
        }
    }

    fn in_build_cache(&self, path: &Path) -> bool {
        self.build_cache_dirs.iter().any(|dir| path.starts_with(dir))
    }

    fn regions(&mut self) -> &HashMap<PathBuf, Vec<MappedRegion>> {
        let line_cache = &self.line_cache;
        let source_files = &self.source_files;
        self.regions
            .get_or_insert_with(|| index_directives(line_cache, source_files))
    }

    fn unadjust(&mut self, position: &Position) -> Option<Position> {
        if self.source_files.iter().any(|source| *source == position.path) {
            return None;
        }
        self.regions().get(&position.path)?.iter().find_map(|region| {
            region
                .unadjust(position.line)
                .map(|line| Position::new(region.source.clone(), line, position.column))
        })
    }
}

fn index_directives(
    line_cache: &LineCache,
    source_files: &[PathBuf],
) -> HashMap<PathBuf, Vec<MappedRegion>> {
    let mut regions: HashMap<PathBuf, Vec<MappedRegion>> = HashMap::new();

    for source in source_files {
        let lines = match line_cache.lines(source) {
            Ok(lines) => lines,
            Err(err) => {
                log::debug!("Skipping line directives of {}: {}", source.display(), err);
                continue;
            }
        };

        let directives: Vec<(usize, PathBuf, usize)> = lines
            .iter()
            .enumerate()
            .filter_map(|(index, text)| {
                let caps = LINE_DIRECTIVE.captures(text.trim_end())?;
                let target_line = caps[2].parse().ok()?;
                Some((index + 1, PathBuf::from(&caps[1]), target_line))
            })
            .collect();

        for (i, (directive_line, target, target_start)) in directives.iter().enumerate() {
            let next = directives
                .get(i + 1)
                .map(|(line, _, _)| *line)
                .unwrap_or(lines.len() + 1);
            regions.entry(target.clone()).or_default().push(MappedRegion {
                source: source.clone(),
                source_start: directive_line + 1,
                target_start: *target_start,
                len: next.saturating_sub(directive_line + 1),
            });
        }
    }

    log::debug!("Indexed line directives for {} targets", regions.len());
    regions
}

impl Stage for PathNormalizer {
    fn name(&self) -> &'static str {
        "path_normalizer"
    }

    fn process(&mut self, input: &[Diagnostic]) -> Result<Vec<Diagnostic>, LintError> {
        let mut output = Vec::with_capacity(input.len());
        for diagnostic in input {
            if self.in_build_cache(diagnostic.path()) {
                log::debug!("Dropping issue in build cache: {}", diagnostic.position);
                continue;
            }

            let mut diagnostic = diagnostic.clone();
            if !self.source_files.is_empty() {
                if let Some(position) = self.unadjust(&diagnostic.position) {
                    log::debug!("Unadjusted {} to {}", diagnostic.position, position);
                    diagnostic.position = position;
                }
            }
            output.push(diagnostic);
        }
        Ok(output)
    }
}
