// Clock Port (for measuring execution time)

use std::sync::atomic::{AtomicI64, Ordering};

/// Wall clock used by engines to stamp `duration_ms`
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since epoch
    fn now_millis(&self) -> i64;
}

/// System clock (production)
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock advancing by a fixed step on every read (tests)
pub struct SteppingClock {
    now: AtomicI64,
    step_ms: i64,
}

impl SteppingClock {
    pub fn new(start_ms: i64, step_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
            step_ms,
        }
    }
}

impl Clock for SteppingClock {
    fn now_millis(&self) -> i64 {
        self.now.fetch_add(self.step_ms, Ordering::SeqCst)
    }
}
