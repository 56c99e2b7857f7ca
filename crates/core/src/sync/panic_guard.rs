// Panic isolation for consumer callbacks
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::error;

/// Result of a panic-guarded call
#[derive(Debug)]
pub enum GuardOutcome<T> {
    /// Call returned normally
    Completed(T),
    /// Call panicked; carries the panic message
    Panicked(String),
}

/// Run a consumer callback, converting a panic into [`GuardOutcome::Panicked`].
///
/// A panicking subscriber is a caller bug. Catching it here keeps the
/// remaining subscribers of the same outcome reachable.
pub fn run_guarded<F, T>(label: &str, f: F) -> GuardOutcome<T>
where
    F: FnOnce() -> T,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => GuardOutcome::Completed(value),
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };

            error!(callback = %label, panic_msg = %panic_msg, "Consumer callback panicked");
            GuardOutcome::Panicked(panic_msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_value() {
        match run_guarded("value", || 42) {
            GuardOutcome::Completed(v) => assert_eq!(v, 42),
            GuardOutcome::Panicked(msg) => panic!("unexpected panic: {}", msg),
        }
    }

    #[test]
    fn test_captures_panic_message() {
        let outcome: GuardOutcome<()> = run_guarded("boom", || panic!("subscriber blew up"));
        match outcome {
            GuardOutcome::Panicked(msg) => assert_eq!(msg, "subscriber blew up"),
            GuardOutcome::Completed(_) => panic!("panic was not caught"),
        }
    }
}
