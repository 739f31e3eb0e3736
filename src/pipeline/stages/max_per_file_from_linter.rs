use crate::core::Diagnostic;
use crate::errors::LintError;
use crate::pipeline::stage::filter_diagnostics;
use crate::pipeline::Stage;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Caps how many diagnostics one linter may report for one file.
///
/// Linters without an entry, or with a limit of 0, are not capped.
/// Formatters report a whole file as one problem, hence the defaults of 1
/// for `gofmt` and `goimports`.
pub struct MaxPerFileFromLinter {
    limits: BTreeMap<String, usize>,
    counts: HashMap<(PathBuf, String), usize>,
}

impl MaxPerFileFromLinter {
    pub fn new(limits: BTreeMap<String, usize>) -> Self {
        Self {
            limits,
            counts: HashMap::new(),
        }
    }
}

impl Stage for MaxPerFileFromLinter {
    fn name(&self) -> &'static str {
        "max_per_file_from_linter"
    }

    fn process(&mut self, input: &[Diagnostic]) -> Result<Vec<Diagnostic>, LintError> {
        let limits = &self.limits;
        let counts = &mut self.counts;
        filter_diagnostics(input, |d| {
            let limit = match limits.get(d.linter()) {
                Some(&limit) if limit > 0 => limit,
                _ => return Ok(true),
            };
            let count = counts
                .entry((d.path().to_path_buf(), d.linter().to_string()))
                .or_insert(0);
            *count += 1;
            Ok(*count <= limit)
        })
    }

    fn finish(&mut self) -> Result<(), LintError> {
        self.counts.clear();
        Ok(())
    }
}
