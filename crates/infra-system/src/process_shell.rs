// Process-backed shell sessions and their provider
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use rootshell_core::port::clock::SystemClock;
use rootshell_core::port::id_source::UuidSource;
use rootshell_core::port::{Clock, IdSource};
use rootshell_core::{
    Collector, Job, Result, Shell, ShellCallback, ShellError, ShellProvider, ShellStatus,
};

use crate::config::ShellConfig;
use crate::constants::{ROOT_PROBE_COMMAND, ROOT_UID};
use crate::process_job::{run_commands, JobContext, ProcessJob};

/// A probed shell configuration whose jobs each run in a fresh process
pub struct ProcessShell {
    context: Arc<JobContext>,
    status: ShellStatus,
    alive: AtomicBool,
}

impl ProcessShell {
    pub fn new(config: ShellConfig, status: ShellStatus, runtime: Handle) -> Self {
        Self::with_sources(
            config,
            status,
            runtime,
            Arc::new(SystemClock),
            Arc::new(UuidSource),
        )
    }

    pub fn with_sources(
        config: ShellConfig,
        status: ShellStatus,
        runtime: Handle,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdSource>,
    ) -> Self {
        Self {
            context: Arc::new(JobContext {
                config,
                runtime,
                clock,
                ids,
            }),
            status,
            alive: AtomicBool::new(true),
        }
    }

    /// Concrete job, for callers that want [`ProcessJob`] itself
    pub fn job(&self) -> ProcessJob {
        ProcessJob::new(Arc::clone(&self.context))
    }

    /// Mark the shell dead; providers stop handing it out.
    /// Jobs already created keep working.
    pub fn close(&self) {
        if self.alive.swap(false, Ordering::SeqCst) {
            debug!(shell = %self.context.config.shell, "Shell closed");
        }
    }
}

impl Shell for ProcessShell {
    fn status(&self) -> ShellStatus {
        self.status
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn new_job(&self) -> Box<dyn Job> {
        Box::new(self.job())
    }
}

/// Provider that probes the configured shell once and caches the result
pub struct ProcessShellProvider {
    config: ShellConfig,
    runtime: Handle,
    cached: Arc<Mutex<Option<Arc<ProcessShell>>>>,
}

impl ProcessShellProvider {
    pub fn new(config: ShellConfig, runtime: Handle) -> Self {
        Self {
            config,
            runtime,
            cached: Arc::new(Mutex::new(None)),
        }
    }

    /// Drop the cached shell; the next `get_shell` probes again
    pub fn invalidate(&self) {
        if let Some(shell) = lock(&self.cached).take() {
            shell.close();
        }
    }

    /// The cached shell, if one is alive
    pub fn cached(&self) -> Option<Arc<ProcessShell>> {
        lock(&self.cached)
            .as_ref()
            .filter(|shell| shell.is_alive())
            .cloned()
    }
}

impl ShellProvider for ProcessShellProvider {
    fn get_shell(&self, callback: ShellCallback) {
        if let Some(shell) = self.cached() {
            callback(Ok(shell as Arc<dyn Shell>));
            return;
        }

        let config = self.config.clone();
        let runtime = self.runtime.clone();
        let cached = Arc::clone(&self.cached);
        self.runtime.spawn(async move {
            let outcome = probe(&config).await.map(|status| {
                info!(shell = %config.shell, status = %status, "Shell ready");
                let shell = Arc::new(ProcessShell::new(config, status, runtime));
                *lock(&cached) = Some(Arc::clone(&shell));
                shell as Arc<dyn Shell>
            });
            if let Err(e) = &outcome {
                warn!(error = %e, "Shell could not be started");
            }
            callback(outcome);
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Start the configured shell once and ask it for its effective UID
async fn probe(config: &ShellConfig) -> Result<ShellStatus> {
    let out = Collector::retaining();
    let err = Collector::retaining();
    let status = run_commands(config, &[ROOT_PROBE_COMMAND.to_string()], &out, &err)
        .await
        .map_err(|e| match e {
            no_shell @ ShellError::NoShell(_) => no_shell,
            other => ShellError::NoShell(format!("probe of '{}' failed: {}", config.shell, other)),
        })?;

    let uid = out.snapshot();
    debug!(exit_code = ?status.code(), uid = ?uid, "Root probe finished");
    let is_root = status.success() && uid.first().map(|s| s.trim()) == Some(ROOT_UID);
    Ok(if is_root {
        ShellStatus::Root
    } else {
        ShellStatus::NonRoot
    })
}
