use crate::core::Diagnostic;
use crate::errors::LintError;
use crate::pipeline::stage::filter_diagnostics;
use crate::pipeline::Stage;
use std::collections::HashMap;

/// Caps how many diagnostics with an identical message are shown.
///
/// A limit of 0 disables the cap.
pub struct MaxSameIssues {
    limit: usize,
    counts: HashMap<String, usize>,
}

impl MaxSameIssues {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            counts: HashMap::new(),
        }
    }
}

impl Stage for MaxSameIssues {
    fn name(&self) -> &'static str {
        "max_same_issues"
    }

    fn process(&mut self, input: &[Diagnostic]) -> Result<Vec<Diagnostic>, LintError> {
        if self.limit == 0 {
            return Ok(input.to_vec());
        }
        let limit = self.limit;
        let counts = &mut self.counts;
        filter_diagnostics(input, |d| {
            let count = counts.entry(d.message.clone()).or_insert(0);
            *count += 1;
            Ok(*count <= limit)
        })
    }

    fn finish(&mut self) -> Result<(), LintError> {
        let mut hidden: Vec<_> = self
            .counts
            .iter()
            .filter(|(_, count)| **count > self.limit)
            .map(|(message, &count)| (message.as_str(), count - self.limit))
            .collect();
        hidden.sort();
        for (message, count) in hidden {
            log::info!(
                "{}/{} issues with text {:?} were hidden, use max_same_issues = 0 to see them all",
                count,
                count + self.limit,
                message
            );
        }
        self.counts.clear();
        Ok(())
    }
}
