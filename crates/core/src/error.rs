// Central Error Type for the core

use thiserror::Error;

/// Errors raised while *setting up* a consumption.
///
/// Execution outcomes never travel through this type: a failed command is a
/// [`ShellResult`](crate::domain::ShellResult) with a failure status.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("No shell available: {0}")]
    NoShell(String),

    #[error("Job was already submitted; output channels can no longer be attached")]
    AlreadySubmitted,

    #[error("Continuation abandoned: callback dropped without being invoked")]
    Abandoned,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using ShellError
pub type Result<T> = std::result::Result<T, ShellError>;
