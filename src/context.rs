//! Shared, read-only input of every analyzer task.
//!
//! The caller owns the [`AnalysisContext`]; the runner and the meta-linter
//! only ever hand out shared references to it. Loaded program data is
//! opaque here: the loader stores whatever it produced and analyzers
//! downcast it with [`AnalysisContext::program`].

use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation signal.
///
/// Cloning shares the flag. Once cancelled the runner dispatches no new
/// tasks; running tasks are expected to poll [`is_cancelled`](Self::is_cancelled).
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
pub struct AnalysisContext {
    root: PathBuf,
    files: Vec<PathBuf>,
    program: Option<Arc<dyn Any + Send + Sync>>,
    cancellation: CancellationToken,
}

impl AnalysisContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: Vec::new(),
            program: None,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_files(mut self, files: Vec<PathBuf>) -> Self {
        self.files = files;
        self
    }

    /// Attach the loaded program data produced by the external loader.
    pub fn with_program<T: Any + Send + Sync>(mut self, program: T) -> Self {
        self.program = Some(Arc::new(program));
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Loaded program data, if the loader produced a value of type `T`.
    pub fn program<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.program.as_ref()?.downcast_ref::<T>()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

impl std::fmt::Debug for AnalysisContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisContext")
            .field("root", &self.root)
            .field("files", &self.files.len())
            .field("has_program", &self.program.is_some())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
