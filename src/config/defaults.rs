//! Built-in exclude patterns and skip directories.
//!
//! Patterns hide well-known false positives of popular linters. They are
//! appended to the user's `exclude` list when `exclude_use_default` is on,
//! and each one keeps a stable id so users can refer to it.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExcludePattern {
    pub id: &'static str,
    pub pattern: &'static str,
    pub linter: &'static str,
    pub why: &'static str,
}

const DEFAULT_EXCLUDE_PATTERNS: &[ExcludePattern] = &[
    ExcludePattern {
        id: "EXC0001",
        pattern: r"Error return value of .((os\.)?std(out|err)\..*|.*Close|.*Flush|os\.Remove(All)?|.*print(f|ln)?|os\.(Un)?Setenv). is not checked",
        linter: "errcheck",
        why: "Almost all programs ignore errors on these functions and in most cases it's ok",
    },
    ExcludePattern {
        id: "EXC0002",
        pattern: "(comment on exported (method|function|type|const)|should have( a package)? comment|comment should be of the form)",
        linter: "golint",
        why: "Annoying issue about not having a comment. The rare codebase has such comments",
    },
    ExcludePattern {
        id: "EXC0003",
        pattern: r"func name will be used as test\.Test.* by other packages, and that stutters; consider calling this",
        linter: "golint",
        why: "False positive when tests are defined in package 'test'",
    },
    ExcludePattern {
        id: "EXC0004",
        pattern: "(possible misuse of unsafe.Pointer|should have signature)",
        linter: "govet",
        why: "Common false positives",
    },
    ExcludePattern {
        id: "EXC0005",
        pattern: "ineffective break statement. Did you mean to break out of the outer loop",
        linter: "staticcheck",
        why: "Developers tend to write in C-style with an explicit 'break' in a 'switch', so it's ok to ignore",
    },
    ExcludePattern {
        id: "EXC0006",
        pattern: "Use of unsafe calls should be audited",
        linter: "gosec",
        why: "Too many false-positives on 'unsafe' usage",
    },
    ExcludePattern {
        id: "EXC0007",
        pattern: "Subprocess launch(ed with variable|ing should be audited)",
        linter: "gosec",
        why: "Too many false-positives for parametrized shell calls",
    },
    ExcludePattern {
        id: "EXC0008",
        pattern: "(G104|G307)",
        linter: "gosec",
        why: "Duplicated errcheck checks",
    },
    ExcludePattern {
        id: "EXC0009",
        pattern: "(Expect directory permissions to be 0750 or less|Expect file permissions to be 0600 or less)",
        linter: "gosec",
        why: "Too many issues in popular repos",
    },
    ExcludePattern {
        id: "EXC0010",
        pattern: "Potential file inclusion via variable",
        linter: "gosec",
        why: "False positive is triggered by 'src, err := ioutil.ReadFile(filename)'",
    },
];

/// Directories skipped when `skip_dirs_use_default` is on.
pub const DEFAULT_SKIP_DIRS: &[&str] = &[
    "vendor",
    "third_party",
    "testdata",
    "examples",
    "Godeps",
    "builtin",
];

pub fn default_exclude_patterns() -> &'static [ExcludePattern] {
    DEFAULT_EXCLUDE_PATTERNS
}

/// Look up a built-in exclude pattern by id.
pub fn exclude_pattern_by_id(id: &str) -> Option<&'static ExcludePattern> {
    DEFAULT_EXCLUDE_PATTERNS.iter().find(|p| p.id == id)
}

/// Regexes matching the default skip dirs as whole path components.
pub fn default_skip_dir_patterns() -> Vec<String> {
    DEFAULT_SKIP_DIRS
        .iter()
        .map(|dir| format!("(^|/){}($|/)", dir))
        .collect()
}
