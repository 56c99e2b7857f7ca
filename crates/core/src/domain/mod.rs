// Domain Layer - Values exchanged between engines and consumers

pub mod channel;
pub mod result;
pub mod shell_status;

// Re-exports
pub use channel::OutputChannel;
pub use result::{ExecutionStatus, ShellResult, JOB_NOT_EXECUTED};
pub use shell_status::ShellStatus;
