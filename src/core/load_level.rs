use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum program-analysis depth a linter needs.
///
/// Levels are totally ordered; a result set loaded at a higher level
/// satisfies every lower requirement.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LoadLevel {
    /// File list only
    #[default]
    None,
    /// Parsed syntax trees
    Syntax,
    /// Type information for the analyzed packages
    Types,
    /// Type information for the whole program, dependencies included
    WholeProgram,
}

impl LoadLevel {
    /// Highest level among `levels`, `None` for an empty iterator.
    pub fn max_of(levels: impl IntoIterator<Item = LoadLevel>) -> LoadLevel {
        levels.into_iter().max().unwrap_or_default()
    }

    pub fn satisfies(self, required: LoadLevel) -> bool {
        self >= required
    }
}

impl fmt::Display for LoadLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Syntax => write!(f, "syntax"),
            Self::Types => write!(f, "types"),
            Self::WholeProgram => write!(f, "whole_program"),
        }
    }
}
