//! The stages of the standard diagnostic pipeline, one per module.
//!
//! Listed in the order [`build_pipeline`](super::build_pipeline) runs them.

mod path_normalizer;
mod path_prettifier;
mod skip_files;
mod skip_dirs;
mod autogenerated_exclude;
mod identifier_marker;
mod exclude;
mod exclude_rules;
mod nolint;
mod uniq_by_line;
pub mod diff;
mod max_per_file_from_linter;
mod max_same_issues;
mod max_from_linter;
mod source_code;
mod path_shortener;

pub use autogenerated_exclude::AutogeneratedExclude;
pub use diff::{ChangedLines, Diff, DiffScope};
pub use exclude::Exclude;
pub use exclude_rules::ExcludeRules;
pub use identifier_marker::IdentifierMarker;
pub use max_from_linter::MaxFromLinter;
pub use max_per_file_from_linter::MaxPerFileFromLinter;
pub use max_same_issues::MaxSameIssues;
pub use nolint::Nolint;
pub use path_normalizer::PathNormalizer;
pub use path_prettifier::PathPrettifier;
pub use path_shortener::PathShortener;
pub use skip_dirs::SkipDirs;
pub use skip_files::SkipFiles;
pub use source_code::SourceCode;
pub use uniq_by_line::UniqByLine;
