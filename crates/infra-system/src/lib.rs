// rootshell Infrastructure - Process Engine
// Implements: ShellProvider, Shell, Job on top of tokio::process

pub mod config;
pub mod constants;
pub mod process_job;
pub mod process_shell;

pub use config::ShellConfig;
pub use process_job::ProcessJob;
pub use process_shell::{ProcessShell, ProcessShellProvider};
