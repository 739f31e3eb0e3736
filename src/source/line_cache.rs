//! Thread-safe cache of source file lines.
//!
//! Several pipeline stages look at source text (rule exclusion, inline
//! suppression, generated-file detection, snippet attachment). Each file is
//! read and split once per run; relative paths are resolved against the
//! cache's base directory.

use crate::errors::{LintError, Result};
use dashmap::DashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct LineCache {
    base_dir: PathBuf,
    files: DashMap<PathBuf, Arc<Vec<String>>>,
}

impl LineCache {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            files: DashMap::new(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// All lines of a file, without line terminators. Bytes that are not
    /// valid UTF-8 are replaced with U+FFFD.
    pub fn lines(&self, path: &Path) -> Result<Arc<Vec<String>>> {
        let resolved = self.resolve(path);
        if let Some(lines) = self.files.get(&resolved) {
            return Ok(Arc::clone(lines.value()));
        }

        let bytes = fs::read(&resolved)
            .map_err(|e| LintError::io_with_path(format!("can't read file: {}", e), &resolved))?;
        let contents = String::from_utf8_lossy(&bytes);
        let lines = Arc::new(contents.lines().map(str::to_string).collect::<Vec<_>>());
        self.files.insert(resolved, Arc::clone(&lines));
        Ok(lines)
    }

    /// One 1-based line of a file.
    pub fn line(&self, path: &Path, line: usize) -> Result<String> {
        if line == 0 {
            return Err(LintError::io_with_path("invalid line number 0", path));
        }
        let lines = self.lines(path)?;
        lines.get(line - 1).cloned().ok_or_else(|| {
            LintError::io_with_path(
                format!("line {} is out of range, file has {} lines", line, lines.len()),
                path,
            )
        })
    }

    pub fn cached_files(&self) -> usize {
        self.files.len()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}
