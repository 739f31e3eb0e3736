//! Panic hook that turns panics inside guarded units into fault reports.
//!
//! `catch_unwind` hands back only the panic payload; the location and the
//! stack trace are only observable from inside the panic hook. The hook
//! installed here stores them in a thread-local slot while the current
//! thread is inside a guarded scope and stays silent, so the guard can
//! log one structured warning instead of the default stderr dump. Panics
//! outside guarded scopes go to the previously installed hook unchanged.

use super::context::{get_current_context, LintPhase};
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::PanicHookInfo;
use std::sync::Once;

static INSTALL: Once = Once::new();

thread_local! {
    static GUARD_DEPTH: Cell<usize> = const { Cell::new(0) };
    static LAST_FAULT: RefCell<Option<FaultReport>> = const { RefCell::new(None) };
}

/// Everything known about a contained panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultReport {
    pub message: String,
    pub location: Option<String>,
    pub backtrace: String,
    pub linter: Option<String>,
    pub phase: Option<LintPhase>,
}

impl FaultReport {
    /// Fallback when the hook did not see the panic (another hook replaced ours).
    pub(crate) fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let context = get_current_context();
        Self {
            message: payload_message(payload),
            location: None,
            backtrace: Backtrace::force_capture().to_string(),
            linter: context.current_linter,
            phase: context.phase,
        }
    }
}

/// Install the fault hook. Idempotent; the runner calls it before every run.
pub fn install_fault_hook() {
    INSTALL.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if is_guarded() {
                record_fault(info);
            } else {
                previous(info);
            }
        }));
    });
}

/// Marks the current thread as running a guarded unit until dropped.
pub(crate) struct GuardScope {
    _private: (),
}

impl Drop for GuardScope {
    fn drop(&mut self) {
        GUARD_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

pub(crate) fn enter_guard() -> GuardScope {
    GUARD_DEPTH.with(|depth| depth.set(depth.get() + 1));
    LAST_FAULT.with(|slot| slot.borrow_mut().take());
    GuardScope { _private: () }
}

/// Take the report recorded by the hook for the most recent panic on this thread.
pub(crate) fn take_fault() -> Option<FaultReport> {
    LAST_FAULT.with(|slot| slot.borrow_mut().take())
}

fn is_guarded() -> bool {
    GUARD_DEPTH.with(|depth| depth.get() > 0)
}

fn record_fault(info: &PanicHookInfo<'_>) {
    let context = get_current_context();
    let report = FaultReport {
        message: payload_message(info.payload()),
        location: info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column())),
        backtrace: Backtrace::force_capture().to_string(),
        linter: context.current_linter,
        phase: context.phase,
    };
    LAST_FAULT.with(|slot| *slot.borrow_mut() = Some(report));
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_message_variants() {
        let boxed: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(payload_message(boxed.as_ref()), "static str");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(payload_message(boxed.as_ref()), "owned");

        let boxed: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(payload_message(boxed.as_ref()), "Unknown panic");
    }

    #[test]
    fn test_hook_records_guarded_panic() {
        install_fault_hook();
        let scope = enter_guard();
        let result = std::panic::catch_unwind(|| panic!("index out of range"));
        let fault = take_fault();
        drop(scope);

        assert!(result.is_err());
        let fault = fault.expect("hook should record guarded panics");
        assert_eq!(fault.message, "index out of range");
        assert!(fault.location.unwrap().contains("fault_hook.rs"));
        assert!(!is_guarded());
    }
}
