use crate::core::Diagnostic;
use crate::errors::LintError;
use crate::pipeline::stage::filter_diagnostics;
use crate::pipeline::Stage;
use regex::Regex;

/// Drops diagnostics whose message matches any exclude pattern.
///
/// All patterns are joined into one case-insensitive alternation.
pub struct Exclude {
    pattern: Option<Regex>,
}

impl Exclude {
    pub fn new(patterns: &[String]) -> Result<Self, LintError> {
        if patterns.is_empty() {
            return Ok(Self { pattern: None });
        }
        let combined = format!("(?i)({})", patterns.join("|"));
        let pattern = Regex::new(&combined)
            .map_err(|e| LintError::config(format!("can't compile exclude pattern: {}", e)))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }
}

impl Stage for Exclude {
    fn name(&self) -> &'static str {
        "exclude"
    }

    fn process(&mut self, input: &[Diagnostic]) -> Result<Vec<Diagnostic>, LintError> {
        let Some(pattern) = &self.pattern else {
            return Ok(input.to_vec());
        };
        filter_diagnostics(input, |d| Ok(!pattern.is_match(&d.message)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_exclude_patterns;
    use crate::core::{Finding, Position};

    fn diag(message: &str) -> Diagnostic {
        Finding::new(message, Position::line_only("a.go", 1)).attribute("x")
    }

    #[test]
    fn test_case_insensitive_alternation() {
        let mut stage = Exclude::new(&["should have comment".into(), "^TODO".into()]).unwrap();
        let output = stage
            .process(&[
                diag("exported func Run SHOULD HAVE COMMENT"),
                diag("todo: remove"),
                diag("ineffectual assignment to err"),
            ])
            .unwrap();
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].message, "ineffectual assignment to err");
    }

    #[test]
    fn test_no_patterns_pass_through() {
        let mut stage = Exclude::new(&[]).unwrap();
        assert_eq!(stage.process(&[diag("anything")]).unwrap().len(), 1);
    }

    #[test]
    fn test_default_patterns_combine() {
        let patterns: Vec<String> = default_exclude_patterns()
            .iter()
            .map(|p| p.pattern.to_string())
            .collect();
        let mut stage = Exclude::new(&patterns).unwrap();
        let output = stage
            .process(&[diag("Error return value of `f.Close` is not checked")])
            .unwrap();
        assert!(output.is_empty());
    }
}
