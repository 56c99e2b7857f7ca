// Execution ID Port (for deterministic tracing fields in tests)

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of per-submission execution IDs
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> String;
}

/// UUID v4 source (production)
pub struct UuidSource;

impl IdSource for UuidSource {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Sequential `exec-N` IDs (tests)
#[derive(Default)]
pub struct SequentialIds {
    counter: AtomicU64,
}

impl IdSource for SequentialIds {
    fn next_id(&self) -> String {
        format!("exec-{}", self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
