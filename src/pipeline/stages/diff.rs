//! Change-scoped filtering.
//!
//! Keeps only diagnostics on lines added or modified by a change. The
//! change comes from one of:
//!
//! - an explicit set of changed lines
//! - a unified diff file (`new_from_patch`)
//! - a git revision; everything changed since it, including untracked
//!   files, is in scope (`new_from_rev`)
//! - uncommitted changes (`new`); when the work tree is clean the last
//!   commit is used instead
//!
//! The changed-line set is computed on first use, so a pipeline that never
//! sees a diagnostic never touches git.

use crate::config::IssuesConfig;
use crate::core::Diagnostic;
use crate::errors::LintError;
use crate::pipeline::stage::filter_diagnostics;
use crate::pipeline::Stage;
use git2::{DiffOptions, ErrorCode, Repository};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Changed line numbers per file. Keys are absolute paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedLines {
    files: HashMap<PathBuf, BTreeSet<usize>>,
}

impl ChangedLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, line: usize) {
        self.files.entry(path.into()).or_default().insert(line);
    }

    pub fn contains(&self, path: &Path, line: usize) -> bool {
        self.files.get(path).is_some_and(|lines| lines.contains(&line))
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn line_count(&self) -> usize {
        self.files.values().map(BTreeSet::len).sum()
    }

    /// Resolve relative keys against `base`.
    pub fn rebased(self, base: &Path) -> Self {
        let mut rebased = Self::new();
        for (path, lines) in self.files {
            rebased
                .files
                .entry(absolutize(base, &path))
                .or_default()
                .extend(lines);
        }
        rebased
    }

    /// Lines added by a unified diff whose paths are relative to `base`.
    pub fn from_patch(patch: &str, base: &Path) -> Result<Self, LintError> {
        let diff = git2::Diff::from_buffer(patch.as_bytes())?;
        Self::from_git_diff(&diff, base)
    }

    /// Lines changed since `rev` in the repository containing `dir`,
    /// counting staged, unstaged and untracked changes.
    pub fn from_revision(dir: &Path, rev: &str) -> Result<Self, LintError> {
        let repo = Repository::discover(dir)?;
        let base = repo_workdir(&repo)?;
        let tree = repo.revparse_single(rev)?.peel_to_tree()?;
        let diff = repo.diff_tree_to_workdir_with_index(Some(&tree), Some(&mut diff_options()))?;
        Self::from_git_diff(&diff, &base)
    }

    /// Uncommitted lines of the repository containing `dir`; the last
    /// commit's lines when there are none.
    pub fn from_uncommitted(dir: &Path) -> Result<Self, LintError> {
        let repo = Repository::discover(dir)?;
        let base = repo_workdir(&repo)?;
        let head = match repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => None,
            Err(e) => return Err(e.into()),
        };
        let head_tree = head.as_ref().map(|c| c.tree()).transpose()?;

        let diff =
            repo.diff_tree_to_workdir_with_index(head_tree.as_ref(), Some(&mut diff_options()))?;
        let changed = Self::from_git_diff(&diff, &base)?;
        if !changed.is_empty() {
            return Ok(changed);
        }

        let Some(commit) = head else {
            return Ok(changed);
        };
        log::debug!("No uncommitted changes, using last commit {}", commit.id());
        let parent_tree = match commit.parent(0) {
            Ok(parent) => Some(parent.tree()?),
            Err(_) => None,
        };
        let diff = repo.diff_tree_to_tree(
            parent_tree.as_ref(),
            head_tree.as_ref(),
            Some(&mut diff_options()),
        )?;
        Self::from_git_diff(&diff, &base)
    }

    fn from_git_diff(diff: &git2::Diff<'_>, base: &Path) -> Result<Self, LintError> {
        let mut changed = Self::new();
        diff.foreach(
            &mut |_delta, _progress| true,
            None,
            None,
            Some(&mut |delta, _hunk, line| {
                if line.origin() == '+' {
                    if let (Some(path), Some(number)) = (delta.new_file().path(), line.new_lineno()) {
                        changed.insert(absolutize(base, path), number as usize);
                    }
                }
                true
            }),
        )?;
        log::debug!(
            "Diff scope: {} changed lines in {} files",
            changed.line_count(),
            changed.file_count()
        );
        Ok(changed)
    }
}

fn diff_options() -> DiffOptions {
    let mut options = DiffOptions::new();
    options
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .show_untracked_content(true);
    options
}

fn repo_workdir(repo: &Repository) -> Result<PathBuf, LintError> {
    repo.workdir()
        .map(Path::to_path_buf)
        .ok_or_else(|| LintError::Git("repository has no working directory".to_string()))
}

/// Lexically absolute form of `path`: joined to `base` when relative,
/// `.` and `..` components resolved without touching the file system.
pub(crate) fn absolutize(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Absolute form of a working directory, resolved against the current
/// directory when relative. Changed-line keys from git are always absolute.
pub(crate) fn absolute_dir(dir: &Path) -> PathBuf {
    match std::env::current_dir() {
        Ok(cwd) => absolutize(&cwd, dir),
        Err(err) => {
            log::warn!("Can't resolve working directory {}: {}", dir.display(), err);
            dir.to_path_buf()
        }
    }
}

/// Where the changed lines come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffScope {
    Lines(ChangedLines),
    Patch(PathBuf),
    Revision(String),
    Uncommitted,
}

impl DiffScope {
    pub fn from_config(issues: &IssuesConfig) -> Option<Self> {
        if let Some(patch) = &issues.new_from_patch {
            Some(Self::Patch(patch.clone()))
        } else if let Some(rev) = &issues.new_from_rev {
            Some(Self::Revision(rev.clone()))
        } else if issues.new {
            Some(Self::Uncommitted)
        } else {
            None
        }
    }
}

pub struct Diff {
    scope: Option<DiffScope>,
    working_dir: PathBuf,
    changed: Option<ChangedLines>,
}

impl Diff {
    pub fn new(scope: Option<DiffScope>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            scope,
            working_dir: absolute_dir(&working_dir.into()),
            changed: None,
        }
    }

    fn changed_lines(&mut self) -> Result<Option<&ChangedLines>, LintError> {
        if self.changed.is_none() {
            let Some(scope) = &self.scope else {
                return Ok(None);
            };
            let wd = &self.working_dir;
            let changed = match scope {
                DiffScope::Lines(lines) => lines.clone().rebased(wd),
                DiffScope::Patch(path) => {
                    let path = absolutize(wd, path);
                    let patch = fs::read_to_string(&path).map_err(|e| {
                        LintError::io_with_path(format!("can't read patch: {}", e), &path)
                    })?;
                    ChangedLines::from_patch(&patch, wd)?
                }
                DiffScope::Revision(rev) => ChangedLines::from_revision(wd, rev)?,
                DiffScope::Uncommitted => ChangedLines::from_uncommitted(wd)?,
            };
            self.changed = Some(changed);
        }
        Ok(self.changed.as_ref())
    }
}

impl Stage for Diff {
    fn name(&self) -> &'static str {
        "diff"
    }

    fn process(&mut self, input: &[Diagnostic]) -> Result<Vec<Diagnostic>, LintError> {
        if input.is_empty() {
            return Ok(Vec::new());
        }
        let working_dir = self.working_dir.clone();
        let Some(changed) = self.changed_lines()? else {
            return Ok(input.to_vec());
        };
        filter_diagnostics(input, |d| {
            Ok(changed.contains(&absolutize(&working_dir, d.path()), d.line()))
        })
    }
}
