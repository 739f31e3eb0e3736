//! The single place where panics become values.
//!
//! Every linter, prerequisite and issue reporter runs through
//! [`run_guarded`]. Callers upstream only ever see
//! `Result<T, LintError>`: an ordinary error becomes
//! [`LintError::Task`], a panic becomes [`LintError::Fault`] carrying the
//! captured stack trace.

use crate::errors::LintError;
use crate::observability::fault_hook::{self, FaultReport};
use crate::observability::{install_fault_hook, set_current_linter};
use std::panic::{self, AssertUnwindSafe};

/// Run `f` on behalf of `unit`, containing both errors and panics.
///
/// Unwind safety is asserted: the closure only borrows the read-only
/// analysis context, and whatever state it was building is discarded on a
/// fault.
pub fn run_guarded<T>(
    unit: &str,
    f: impl FnOnce() -> anyhow::Result<T>,
) -> Result<T, LintError> {
    install_fault_hook();
    let _linter = set_current_linter(unit);

    let scope = fault_hook::enter_guard();
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    let recorded = fault_hook::take_fault();
    drop(scope);

    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(LintError::from_anyhow(unit, &err)),
        Err(payload) => {
            let report = recorded.unwrap_or_else(|| FaultReport::from_payload(payload.as_ref()));
            log::warn!(
                "Panic: {}: {}{}: {}",
                unit,
                report.message,
                report
                    .location
                    .as_deref()
                    .map(|l| format!(" at {}", l))
                    .unwrap_or_default(),
                report.backtrace
            );
            Err(LintError::Fault {
                linter: unit.to_string(),
                message: report.message,
                location: report.location,
                backtrace: report.backtrace,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_passes_through() {
        let result = run_guarded("ok", || Ok(3));
        assert_eq!(result, Ok(3));
    }

    #[test]
    fn test_error_becomes_task_error() {
        let result: Result<(), _> = run_guarded("bad", || anyhow::bail!("malformed input"));
        assert_eq!(result, Err(LintError::task("bad", "malformed input")));
    }

    #[test]
    fn test_panic_becomes_fault_with_trace() {
        let result: Result<(), _> = run_guarded("crashy", || panic!("nil map write"));
        match result {
            Err(LintError::Fault {
                linter,
                message,
                location,
                backtrace,
            }) => {
                assert_eq!(linter, "crashy");
                assert_eq!(message, "nil map write");
                assert!(location.is_some());
                assert!(!backtrace.is_empty());
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_guards_attribute_to_innermost_unit() {
        let outer = run_guarded("batch", || {
            let inner: Result<(), _> = run_guarded("analyzer", || panic!("inner boom"));
            Ok(inner)
        });
        let inner = outer.expect("outer unit must survive the inner fault");
        assert!(matches!(inner, Err(LintError::Fault { ref linter, .. }) if linter == "analyzer"));
    }
}
