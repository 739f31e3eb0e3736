//! Unified error type for lint runs.
//!
//! Every failure that crosses a module boundary is a [`LintError`]. The type
//! is `Clone` so a single failure can be attributed to several linters (a
//! failed shared prerequisite fails every dependent linter with the same
//! cause) and so run reports can hand errors to presentation layers by value.
//!
//! Collaborator code (analyzers, prerequisites) reports failures with
//! `anyhow`; those are rendered with their full context chain into the
//! string payloads here.
//!
//! # Example
//!
//! ```rust
//! use lintfold::errors::LintError;
//!
//! let err = LintError::task("errcheck", "malformed input");
//! assert_eq!(err.linter(), Some("errcheck"));
//! assert_eq!(err.category(), "Task");
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LintError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LintError {
    /// Expected failure reported by a linter (malformed input, unsupported file, ...)
    #[error("can't run linter {linter}: {message}")]
    Task { linter: String, message: String },

    /// Unrecoverable runtime failure (panic) contained by the fault guard
    #[error("panic in {linter}: {message}")]
    Fault {
        linter: String,
        message: String,
        location: Option<String>,
        backtrace: String,
    },

    /// A shared prerequisite computation failed; every dependent linter gets the same cause
    #[error("can't run linter {linter}: prerequisite {prerequisite} failed: {cause}")]
    Prerequisite {
        linter: String,
        prerequisite: String,
        cause: String,
    },

    /// A pipeline stage failed; the pipeline treats the stage as a no-op
    #[error("can't process result by {stage} processor: {message}")]
    Stage { stage: String, message: String },

    /// Invalid configuration (bad pattern, under-specified rule, ...)
    #[error("Config error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// File system errors
    #[error("I/O error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
    },

    /// Errors from the git backend used for change scoping
    #[error("Git error: {0}")]
    Git(String),

    /// Inconsistent linter registry or batch plan
    #[error("Registry error: {0}")]
    Registry(String),

    /// The run was cancelled before the unit could start
    #[error("cancelled before {0} could run")]
    Cancelled(String),
}

impl LintError {
    pub fn task(linter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Task {
            linter: linter.into(),
            message: message.into(),
        }
    }

    /// Wrap a collaborator error, keeping its whole context chain.
    pub fn from_anyhow(linter: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::task(linter, format!("{:#}", err))
    }

    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            path: None,
        }
    }

    pub fn config_with_path(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: None,
        }
    }

    pub fn io_with_path(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// The linter this error is attributed to, if any.
    pub fn linter(&self) -> Option<&str> {
        match self {
            Self::Task { linter, .. }
            | Self::Fault { linter, .. }
            | Self::Prerequisite { linter, .. } => Some(linter),
            Self::Cancelled(unit) => Some(unit),
            _ => None,
        }
    }

    /// Re-attribute a unit-level error to a specific linter.
    ///
    /// Used when a failure caught around a shared unit (a prerequisite or
    /// a batch) has to be reported once per affected linter.
    pub fn attributed_to(self, name: &str) -> Self {
        match self {
            Self::Task { message, .. } => Self::Task {
                linter: name.to_string(),
                message,
            },
            Self::Fault {
                message,
                location,
                backtrace,
                ..
            } => Self::Fault {
                linter: name.to_string(),
                message,
                location,
                backtrace,
            },
            Self::Prerequisite {
                prerequisite,
                cause,
                ..
            } => Self::Prerequisite {
                linter: name.to_string(),
                prerequisite,
                cause,
            },
            Self::Cancelled(_) => Self::Cancelled(name.to_string()),
            other => other,
        }
    }

    /// Whether this error came from a contained panic.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault { .. })
    }

    /// Get the error category name.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Task { .. } => "Task",
            Self::Fault { .. } => "Fault",
            Self::Prerequisite { .. } => "Prerequisite",
            Self::Stage { .. } => "Stage",
            Self::Config { .. } => "Config",
            Self::Io { .. } => "I/O",
            Self::Git(_) => "Git",
            Self::Registry(_) => "Registry",
            Self::Cancelled(_) => "Cancelled",
        }
    }
}

impl From<std::io::Error> for LintError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<git2::Error> for LintError {
    fn from(err: git2::Error) -> Self {
        Self::Git(err.message().to_string())
    }
}

impl From<regex::Error> for LintError {
    fn from(err: regex::Error) -> Self {
        Self::config(format!("invalid pattern: {}", err))
    }
}

/// Format a list of errors for display.
///
/// ```rust
/// use lintfold::errors::{format_error_list, LintError};
///
/// let errors = vec![LintError::task("a", "boom"), LintError::config("bad regex")];
/// let formatted = format_error_list(&errors);
/// assert!(formatted.contains("1. can't run linter a"));
/// assert!(formatted.contains("2. Config error"));
/// ```
pub fn format_error_list(errors: &[LintError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, e)| format!("  {}. {}", i + 1, e))
        .collect::<Vec<_>>()
        .join("\n")
}
