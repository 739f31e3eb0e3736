use crate::core::Diagnostic;
use crate::errors::LintError;
use crate::pipeline::Stage;
use std::path::Path;

/// Removes the working directory prefix from message text.
///
/// A working directory at the file system root leaves messages untouched.
pub struct PathShortener {
    prefix: Option<String>,
}

impl PathShortener {
    pub fn new(working_dir: &Path) -> Self {
        let prefix = if working_dir.parent().is_none() {
            None
        } else {
            let dir = working_dir.to_string_lossy();
            if dir.ends_with('/') {
                Some(dir.into_owned())
            } else {
                Some(format!("{}/", dir))
            }
        };
        Self { prefix }
    }
}

impl Stage for PathShortener {
    fn name(&self) -> &'static str {
        "path_shortener"
    }

    fn process(&mut self, input: &[Diagnostic]) -> Result<Vec<Diagnostic>, LintError> {
        let Some(prefix) = &self.prefix else {
            return Ok(input.to_vec());
        };
        Ok(input
            .iter()
            .map(|d| {
                let mut d = d.clone();
                if d.message.contains(prefix.as_str()) {
                    d.message = d.message.replace(prefix.as_str(), "");
                }
                d
            })
            .collect())
    }
}
