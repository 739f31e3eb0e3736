use crate::core::Diagnostic;
use crate::errors::LintError;
use crate::pipeline::Stage;
use std::path::{Component, Path, PathBuf};

/// Rewrites paths under the working directory to relative form.
///
/// Paths outside the working directory stay absolute; relative paths lose
/// redundant `./` components. Everything downstream matches patterns
/// against these paths.
pub struct PathPrettifier {
    working_dir: PathBuf,
}

impl PathPrettifier {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    fn prettify(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            if path.starts_with(&self.working_dir) {
                if let Some(relative) = pathdiff::diff_paths(path, &self.working_dir) {
                    return clean(&relative);
                }
            }
            return path.to_path_buf();
        }
        clean(path)
    }
}

fn clean(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

impl Stage for PathPrettifier {
    fn name(&self) -> &'static str {
        "path_prettifier"
    }

    fn process(&mut self, input: &[Diagnostic]) -> Result<Vec<Diagnostic>, LintError> {
        Ok(input
            .iter()
            .map(|diagnostic| {
                let mut diagnostic = diagnostic.clone();
                diagnostic.position.path = self.prettify(&diagnostic.position.path);
                diagnostic
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Finding, Position};

    fn run(paths: &[&str]) -> Vec<PathBuf> {
        let input: Vec<_> = paths
            .iter()
            .map(|p| Finding::new("m", Position::line_only(*p, 1)).attribute("x"))
            .collect();
        PathPrettifier::new("/work/project")
            .process(&input)
            .unwrap()
            .into_iter()
            .map(|d| d.position.path)
            .collect()
    }

    #[test]
    fn test_relativizes_paths_under_working_dir() {
        assert_eq!(
            run(&["/work/project/pkg/a.go", "/work/other/b.go", "./cmd/./main.go"]),
            vec![
                PathBuf::from("pkg/a.go"),
                PathBuf::from("/work/other/b.go"),
                PathBuf::from("cmd/main.go"),
            ]
        );
    }

    #[test]
    fn test_keeps_linter_attribution() {
        let input = vec![Finding::new("m", Position::line_only("/work/project/a.go", 1)).attribute("gofmt")];
        let output = PathPrettifier::new("/work/project").process(&input).unwrap();
        assert_eq!(output[0].linter(), "gofmt");
    }
}
