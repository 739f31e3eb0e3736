//! Access to source text for pipeline stages.

pub mod line_cache;

pub use line_cache::LineCache;
