//! Core data types shared by the runner and the pipeline.

pub mod diagnostic;
pub mod load_level;

pub use diagnostic::{Diagnostic, Finding, Position, Replacement, TextEdit};
pub use load_level::LoadLevel;
