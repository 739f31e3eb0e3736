use crate::core::Diagnostic;
use crate::errors::LintError;
use crate::pipeline::stage::filter_diagnostics;
use crate::pipeline::Stage;
use std::collections::HashSet;
use std::path::PathBuf;

/// Keeps only the first diagnostic reported for each (file, line).
///
/// Input order decides which one wins.
#[derive(Debug, Default)]
pub struct UniqByLine {
    seen: HashSet<(PathBuf, usize)>,
}

impl UniqByLine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stage for UniqByLine {
    fn name(&self) -> &'static str {
        "uniq_by_line"
    }

    fn process(&mut self, input: &[Diagnostic]) -> Result<Vec<Diagnostic>, LintError> {
        filter_diagnostics(input, |d| {
            Ok(self.seen.insert((d.path().to_path_buf(), d.line())))
        })
    }

    fn finish(&mut self) -> Result<(), LintError> {
        self.seen.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Finding, Position};

    #[test]
    fn test_first_seen_wins() {
        let input = vec![
            Finding::new("first", Position::new("a.go", 10, 1)).attribute("govet"),
            Finding::new("second", Position::new("a.go", 10, 5)).attribute("errcheck"),
            Finding::new("other line", Position::new("a.go", 11, 1)).attribute("errcheck"),
            Finding::new("other file", Position::new("b.go", 10, 1)).attribute("errcheck"),
        ];
        let output = UniqByLine::new().process(&input).unwrap();
        let messages: Vec<_> = output.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "other line", "other file"]);
    }
}
