//! The stage abstraction of the diagnostic pipeline.

use crate::core::Diagnostic;
use crate::errors::LintError;

/// One step of the diagnostic pipeline.
///
/// A stage sees the whole collection produced by the previous stage and
/// returns the collection the next stage will see. Stages may keep state
/// (counters, caches) but only for the single pipeline run they belong to:
/// the pipeline is consumed by [`Pipeline::process`](super::Pipeline::process).
///
/// # Example
///
/// ```rust
/// use lintfold::core::Diagnostic;
/// use lintfold::errors::LintError;
/// use lintfold::pipeline::Stage;
///
/// struct DropEmpty;
///
/// impl Stage for DropEmpty {
///     fn name(&self) -> &'static str {
///         "drop_empty"
///     }
///
///     fn process(&mut self, input: &[Diagnostic]) -> Result<Vec<Diagnostic>, LintError> {
///         Ok(input.iter().filter(|d| !d.message.is_empty()).cloned().collect())
///     }
/// }
/// ```
pub trait Stage: Send {
    /// Stage name for logs and stats.
    fn name(&self) -> &'static str;

    /// Transform the collection. On error the pipeline keeps the input unchanged.
    fn process(&mut self, input: &[Diagnostic]) -> Result<Vec<Diagnostic>, LintError>;

    /// Called once after every stage ran; release per-run state or log summaries here.
    fn finish(&mut self) -> Result<(), LintError> {
        Ok(())
    }
}

/// Keep the diagnostics matching `keep`, preserving order.
pub(crate) fn filter_diagnostics(
    input: &[Diagnostic],
    mut keep: impl FnMut(&Diagnostic) -> Result<bool, LintError>,
) -> Result<Vec<Diagnostic>, LintError> {
    let mut output = Vec::with_capacity(input.len());
    for diagnostic in input {
        if keep(diagnostic)? {
            output.push(diagnostic.clone());
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Finding, Position};

    #[test]
    fn test_filter_diagnostics_preserves_order() {
        let input: Vec<_> = (1..=4)
            .map(|line| Finding::new("m", Position::line_only("a.go", line)).attribute("x"))
            .collect();
        let output = filter_diagnostics(&input, |d| Ok(d.line() % 2 == 0)).unwrap();
        let lines: Vec<_> = output.iter().map(Diagnostic::line).collect();
        assert_eq!(lines, vec![2, 4]);
    }

    #[test]
    fn test_filter_diagnostics_propagates_errors() {
        let input = vec![Finding::new("m", Position::line_only("a.go", 1)).attribute("x")];
        let result = filter_diagnostics(&input, |_| Err(LintError::stage("t", "boom")));
        assert!(result.is_err());
    }
}
