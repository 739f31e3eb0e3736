use crate::core::Diagnostic;
use crate::errors::LintError;
use crate::pipeline::stage::filter_diagnostics;
use crate::pipeline::Stage;
use std::collections::HashMap;

/// Caps how many diagnostics each linter may contribute.
///
/// The first `limit` diagnostics of a linter, in input order, survive.
/// A limit of 0 disables the cap.
pub struct MaxFromLinter {
    limit: usize,
    counts: HashMap<String, usize>,
}

impl MaxFromLinter {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            counts: HashMap::new(),
        }
    }
}

impl Stage for MaxFromLinter {
    fn name(&self) -> &'static str {
        "max_from_linter"
    }

    fn process(&mut self, input: &[Diagnostic]) -> Result<Vec<Diagnostic>, LintError> {
        if self.limit == 0 {
            return Ok(input.to_vec());
        }
        let limit = self.limit;
        let counts = &mut self.counts;
        filter_diagnostics(input, |d| {
            let count = counts.entry(d.linter().to_string()).or_insert(0);
            *count += 1;
            Ok(*count <= limit)
        })
    }

    fn finish(&mut self) -> Result<(), LintError> {
        let mut hidden: Vec<_> = self
            .counts
            .iter()
            .filter(|(_, count)| **count > self.limit)
            .map(|(linter, &count)| (linter.as_str(), count - self.limit))
            .collect();
        hidden.sort();
        for (linter, count) in hidden {
            log::info!(
                "{}/{} issues from linter {} were hidden, use max_issues_per_linter = 0 to see them all",
                count,
                count + self.limit,
                linter
            );
        }
        self.counts.clear();
        Ok(())
    }
}
