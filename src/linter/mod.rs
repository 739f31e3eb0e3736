//! Linter capability interface, registration metadata and the registry.

pub mod config;
pub mod registry;
pub mod task;

pub use config::{LinterConfig, LinterKind, Preset};
pub use registry::LinterRegistry;
pub use task::{AnalyzerTask, FnTask};
