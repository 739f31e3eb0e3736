//! Diagnostic data model.
//!
//! Analyzers emit [`Finding`]s. A finding becomes a [`Diagnostic`] once it is
//! attributed to the logical linter that produced it, either by the runner
//! right after a standalone task completes or by the meta-linter's
//! attribution map. The linter name is private to this module and has no
//! setter: pipeline stages can read it, never rewrite it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Location of a finding. Lines and columns are 1-based; column 0 means unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub path: PathBuf,
    pub line: usize,
    #[serde(default)]
    pub column: usize,
}

impl Position {
    pub fn new(path: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            path: path.into(),
            line,
            column,
        }
    }

    /// Position without column information.
    pub fn line_only(path: impl Into<PathBuf>, line: usize) -> Self {
        Self::new(path, line, 0)
    }

    pub fn has_column(&self) -> bool {
        self.column > 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_column() {
            write!(f, "{}:{}:{}", self.path.display(), self.line, self.column)
        } else {
            write!(f, "{}:{}", self.path.display(), self.line)
        }
    }
}

/// One text edit of an auto-fix suggestion. Opaque to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub start_line: usize,
    pub end_line: usize,
    pub new_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub edits: Vec<TextEdit>,
}

/// Unattributed output of an analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub message: String,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<Replacement>,
}

impl Finding {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
            replacement: None,
        }
    }

    pub fn with_replacement(mut self, replacement: Replacement) -> Self {
        self.replacement = Some(replacement);
        self
    }

    /// Attribute this finding to a logical linter.
    pub fn attribute(self, linter: impl Into<String>) -> Diagnostic {
        Diagnostic::from_finding(linter, self)
    }
}

/// One reported finding, attributed to its logical linter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    from_linter: String,
    pub message: String,
    pub position: Position,
    /// Literal source text at `position.line`, attached by the `source_code` stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<Replacement>,
}

impl Diagnostic {
    pub fn from_finding(linter: impl Into<String>, finding: Finding) -> Self {
        Self {
            from_linter: linter.into(),
            message: finding.message,
            position: finding.position,
            source_line: None,
            replacement: finding.replacement,
        }
    }

    /// Name of the logical linter that produced this diagnostic.
    pub fn linter(&self) -> &str {
        &self.from_linter
    }

    pub fn path(&self) -> &Path {
        &self.position.path
    }

    pub fn line(&self) -> usize {
        self.position.line
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.position, self.message, self.from_linter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_sets_linter_once() {
        let finding = Finding::new("unused variable", Position::new("a.go", 3, 7));
        let diag = finding.attribute("unused");
        assert_eq!(diag.linter(), "unused");
        assert_eq!(diag.line(), 3);
        assert!(diag.source_line.is_none());
    }

    #[test]
    fn test_position_display_without_column() {
        assert_eq!(Position::line_only("x.go", 9).to_string(), "x.go:9");
        assert_eq!(Position::new("x.go", 9, 2).to_string(), "x.go:9:2");
    }

    #[test]
    fn test_replacement_is_passed_through() {
        let replacement = Replacement {
            edits: vec![TextEdit {
                start_line: 1,
                end_line: 1,
                new_text: "fixed".into(),
            }],
        };
        let diag = Finding::new("m", Position::line_only("f.go", 1))
            .with_replacement(replacement.clone())
            .attribute("gofmt");
        assert_eq!(diag.replacement, Some(replacement));
    }

    #[test]
    fn test_diagnostic_serializes_linter_name() {
        let diag = Finding::new("m", Position::line_only("f.go", 1)).attribute("lll");
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["from_linter"], "lll");
        assert!(json.get("source_line").is_none());
    }
}
