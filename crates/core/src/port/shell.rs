// Shell Port - ready sessions and how to obtain them

use crate::domain::ShellStatus;
use crate::error::Result;
use crate::port::job::NotExecutedJob;
use crate::port::Job;
use std::sync::Arc;

/// Callback receiving a ready shell, or the reason none could be obtained
pub type ShellCallback = Box<dyn FnOnce(Result<Arc<dyn Shell>>) + Send + 'static>;

/// A ready shell session managed by an engine
pub trait Shell: Send + Sync {
    fn status(&self) -> ShellStatus;

    fn is_root(&self) -> bool {
        self.status().is_root()
    }

    /// Whether the session can still run jobs
    fn is_alive(&self) -> bool;

    /// Fresh, unsubmitted job bound to this session
    fn new_job(&self) -> Box<dyn Job>;

    /// Fresh job that only runs if this shell has root; otherwise it
    /// delivers `NOT_EXECUTED` without running anything
    fn new_su_job(&self) -> Box<dyn Job> {
        if self.is_root() {
            self.new_job()
        } else {
            Box::new(NotExecutedJob::default())
        }
    }
}

/// Hands out shells, possibly after starting one.
///
/// `get_shell` must invoke `callback` exactly once, either synchronously
/// (a shell is already cached) or later from another thread.
pub trait ShellProvider: Send + Sync {
    fn get_shell(&self, callback: ShellCallback);
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::ShellError;
    use crate::port::job::mocks::{Script, ScriptedJob, SubmitCounter};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    /// Shell whose jobs replay one script
    pub struct StaticShell {
        status: ShellStatus,
        script: Script,
        counter: SubmitCounter,
        alive: AtomicBool,
    }

    impl StaticShell {
        pub fn new(status: ShellStatus, script: Script) -> Self {
            Self {
                status,
                script,
                counter: SubmitCounter::default(),
                alive: AtomicBool::new(true),
            }
        }

        pub fn submissions(&self) -> usize {
            self.counter.get()
        }

        pub fn kill(&self) {
            self.alive.store(false, Ordering::SeqCst);
        }
    }

    impl Shell for StaticShell {
        fn status(&self) -> ShellStatus {
            self.status
        }

        fn is_alive(&self) -> bool {
            self.alive.load(Ordering::SeqCst)
        }

        fn new_job(&self) -> Box<dyn Job> {
            ScriptedJob::with_counter(self.script.clone(), self.counter.clone()).boxed()
        }
    }

    /// How the mock provider answers
    pub enum ProviderBehavior {
        /// Answer synchronously with the shell
        Cached(Arc<dyn Shell>),
        /// Answer from a spawned thread
        Deferred(Arc<dyn Shell>),
        /// Report that no shell could be started
        Unavailable,
        /// Drop the callback without answering
        Silent,
    }

    pub struct MockShellProvider {
        behavior: ProviderBehavior,
    }

    impl MockShellProvider {
        pub fn new(behavior: ProviderBehavior) -> Self {
            Self { behavior }
        }
    }

    impl ShellProvider for MockShellProvider {
        fn get_shell(&self, callback: ShellCallback) {
            match &self.behavior {
                ProviderBehavior::Cached(shell) => callback(Ok(Arc::clone(shell))),
                ProviderBehavior::Deferred(shell) => {
                    let shell = Arc::clone(shell);
                    thread::spawn(move || callback(Ok(shell)));
                }
                ProviderBehavior::Unavailable => {
                    callback(Err(ShellError::NoShell("mock provider has no shell".to_string())))
                }
                ProviderBehavior::Silent => drop(callback),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::StaticShell;
    use super::*;
    use crate::domain::{ExecutionStatus, OutputChannel, ShellResult};
    use crate::port::job::mocks::Script;
    use crate::port::ResultCallback;
    use crate::sync::{Collector, OneShot};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_su_job_on_non_root_shell_is_not_executed_once() {
        let shell = StaticShell::new(ShellStatus::NonRoot, Script::success(&["secret"]));
        let calls = Arc::new(AtomicUsize::new(0));
        let outcome = Arc::new(OneShot::new());
        let (calls_in, completer) = (Arc::clone(&calls), Arc::clone(&outcome));

        let collector = Collector::retaining();
        let mut job = shell.new_su_job();
        job.add("id");
        job.to(OutputChannel::Stdout, collector.clone());
        job.submit(ResultCallback::new(move |r: ShellResult| {
            calls_in.fetch_add(1, Ordering::SeqCst);
            completer.complete(r);
        }));

        assert_eq!(outcome.peek().map(|r| r.status()), Some(ExecutionStatus::NotExecuted));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(collector.is_closed());
        assert!(collector.is_empty());
        assert_eq!(shell.submissions(), 0);
    }

    #[test]
    fn test_su_job_on_root_shell_runs() {
        let shell = StaticShell::new(ShellStatus::Root, Script::success(&["ok"]));
        let result = shell.new_su_job().exec();
        assert!(result.is_success());
        assert_eq!(shell.submissions(), 1);
    }

    #[test]
    fn test_unknown_status_is_not_root() {
        let shell = StaticShell::new(ShellStatus::Unknown, Script::success(&[]));
        assert_eq!(shell.new_su_job().exec().status(), ExecutionStatus::NotExecuted);
        assert_eq!(shell.submissions(), 0);
    }
}
