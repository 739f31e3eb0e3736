use crate::core::Diagnostic;
use crate::errors::LintError;
use crate::pipeline::Stage;
use crate::source::LineCache;
use std::sync::Arc;

/// Attaches the literal source line each diagnostic points at.
///
/// A line that can't be read is logged and left empty; the diagnostic is
/// kept either way.
pub struct SourceCode {
    line_cache: Arc<LineCache>,
}

impl SourceCode {
    pub fn new(line_cache: Arc<LineCache>) -> Self {
        Self { line_cache }
    }
}

impl Stage for SourceCode {
    fn name(&self) -> &'static str {
        "source_code"
    }

    fn process(&mut self, input: &[Diagnostic]) -> Result<Vec<Diagnostic>, LintError> {
        Ok(input
            .iter()
            .map(|d| {
                let mut d = d.clone();
                if d.source_line.is_none() {
                    match self.line_cache.line(d.path(), d.line()) {
                        Ok(line) => d.source_line = Some(line),
                        Err(err) => log::warn!("Failed to get line {} for {}: {}", d.line(), d.path().display(), err),
                    }
                }
                d
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Finding, Position};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_attaches_line_or_leaves_empty() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.go"), "package a\nfunc f() {}\n").unwrap();
        let mut stage = SourceCode::new(Arc::new(LineCache::new(temp.path())));

        let output = stage
            .process(&[
                Finding::new("m", Position::line_only("a.go", 2)).attribute("x"),
                Finding::new("m", Position::line_only("a.go", 99)).attribute("x"),
                Finding::new("m", Position::line_only("gone.go", 1)).attribute("x"),
            ])
            .unwrap();

        assert_eq!(output.len(), 3);
        assert_eq!(output[0].source_line.as_deref(), Some("func f() {}"));
        assert_eq!(output[1].source_line, None);
        assert_eq!(output[2].source_line, None);
    }
}
