// Terminal outcome of one job execution

use serde::{Deserialize, Serialize};

/// Code reported when a job never produced an exit status
pub const JOB_NOT_EXECUTED: i32 = -1;

/// Completion status of a job execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// Exited with code 0
    Success,
    /// Exited with a non-zero code
    Failed,
    /// Terminated abnormally (signal, session died mid-job)
    Killed,
    /// The engine could not run the job at all
    NotExecuted,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Success => write!(f, "SUCCESS"),
            ExecutionStatus::Failed => write!(f, "FAILED"),
            ExecutionStatus::Killed => write!(f, "KILLED"),
            ExecutionStatus::NotExecuted => write!(f, "NOT_EXECUTED"),
        }
    }
}

/// Result of one job execution.
///
/// Produced exactly once per submission and never mutated afterwards; every
/// field is private and only readable through accessors. Channels that were
/// streamed live through a [`Collector`](crate::sync::Collector) are empty here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellResult {
    status: ExecutionStatus,
    exit_code: Option<i32>,
    duration_ms: i64,
    out: Vec<String>,
    err: Vec<String>,
}

impl ShellResult {
    /// Build a result from a process exit code
    pub fn from_exit_code(code: i32, out: Vec<String>, err: Vec<String>) -> Self {
        let status = if code == 0 {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failed
        };
        Self {
            status,
            exit_code: Some(code),
            duration_ms: 0,
            out,
            err,
        }
    }

    /// Result for a job terminated without an exit code
    pub fn killed(out: Vec<String>, err: Vec<String>) -> Self {
        Self {
            status: ExecutionStatus::Killed,
            exit_code: None,
            duration_ms: 0,
            out,
            err,
        }
    }

    /// Result for a job the engine could not run (no shell, spawn failure, dropped callback)
    pub fn not_executed() -> Self {
        Self {
            status: ExecutionStatus::NotExecuted,
            exit_code: None,
            duration_ms: 0,
            out: Vec::new(),
            err: Vec::new(),
        }
    }

    /// Attach the measured wall time
    pub fn with_duration_ms(mut self, duration_ms: i64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Exit code, or [`JOB_NOT_EXECUTED`] when the job has none
    pub fn code(&self) -> i32 {
        self.exit_code.unwrap_or(JOB_NOT_EXECUTED)
    }

    pub fn is_success(&self) -> bool {
        self.code() == 0
    }

    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
    }

    pub fn out(&self) -> &[String] {
        &self.out
    }

    pub fn err(&self) -> &[String] {
        &self.err
    }

    /// Serialize for machine-readable output
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
