// Port Layer - Contracts consumed from execution engines

pub mod clock; // For deterministic durations in tests
pub mod id_source;
pub mod job;
pub mod shell;

// Re-exports
pub use clock::Clock;
pub use id_source::IdSource;
pub use job::{Job, NotExecutedJob, ResultCallback};
pub use shell::{Shell, ShellCallback, ShellProvider};
