// Job Port - one pending unit of externally executed work

use crate::domain::{OutputChannel, ShellResult};
use crate::sync::{run_guarded, Collector, OneShot};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

type DeliverFn = Box<dyn FnOnce(ShellResult) + Send + 'static>;

/// One-shot outcome delivery handed to [`Job::submit`].
///
/// `deliver` consumes the callback, so it cannot run twice. Dropping it
/// without delivering (engine bug, panic while executing) delivers
/// [`ShellResult::not_executed`] instead, so consumers are never left waiting.
pub struct ResultCallback {
    inner: Option<DeliverFn>,
}

impl ResultCallback {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(ShellResult) + Send + 'static,
    {
        Self {
            inner: Some(Box::new(f)),
        }
    }

    /// Callback for fire-and-forget submissions
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// Deliver the terminal result
    pub fn deliver(mut self, result: ShellResult) {
        if let Some(f) = self.inner.take() {
            run_guarded("result_callback", move || f(result));
        }
    }
}

impl Drop for ResultCallback {
    fn drop(&mut self) {
        if let Some(f) = self.inner.take() {
            warn!("ResultCallback dropped without delivery; delivering NOT_EXECUTED");
            run_guarded("result_callback", move || f(ShellResult::not_executed()));
        }
    }
}

impl std::fmt::Debug for ResultCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCallback")
            .field("pending", &self.inner.is_some())
            .finish()
    }
}

/// Job contract implemented by execution engines.
///
/// A job is a builder until it is submitted. `submit` and `exec` take the job
/// by value, so a job executes at most once and nothing can be attached to it
/// afterwards; a fresh execution needs a fresh job from
/// [`Shell::new_job`](crate::port::Shell::new_job).
///
/// ```compile_fail
/// use rootshell_core::{Job, ResultCallback};
///
/// fn submit_twice(job: Box<dyn Job>) {
///     job.submit(ResultCallback::noop());
///     job.submit(ResultCallback::noop());
/// }
/// ```
pub trait Job: Send {
    /// Queue a command to run when the job is submitted
    fn add(&mut self, command: &str);

    /// Stream `channel` into `collector` instead of capturing it in the result.
    /// A later call for the same channel replaces the earlier collector.
    fn to(&mut self, channel: OutputChannel, collector: Collector<String>);

    /// Detach and return the collector currently attached to `channel`
    fn take_collector(&mut self, channel: OutputChannel) -> Option<Collector<String>>;

    /// Schedule execution and return immediately.
    ///
    /// The engine must deliver `callback` exactly once, after execution has
    /// fully terminated and every attached collector has received its last
    /// element. Delivery may happen on any thread, including synchronously
    /// inside this call.
    fn submit(self: Box<Self>, callback: ResultCallback);

    /// Execute and block until the result is available.
    ///
    /// Equivalent to `submit` followed by waiting on the callback. Do not call
    /// this from a thread the engine needs to make progress.
    fn exec(self: Box<Self>) -> ShellResult {
        let outcome = Arc::new(OneShot::new());
        let completer = Arc::clone(&outcome);
        self.submit(ResultCallback::new(move |result| {
            completer.complete(result);
        }));
        outcome.wait()
    }
}

/// Job that never runs anything.
///
/// Handed out for root-only work on a shell without root: `submit` closes any
/// attached collectors and delivers [`ShellResult::not_executed`] inline.
#[derive(Default)]
pub struct NotExecutedJob {
    collectors: HashMap<OutputChannel, Collector<String>>,
}

impl Job for NotExecutedJob {
    fn add(&mut self, _command: &str) {}

    fn to(&mut self, channel: OutputChannel, collector: Collector<String>) {
        self.collectors.insert(channel, collector);
    }

    fn take_collector(&mut self, channel: OutputChannel) -> Option<Collector<String>> {
        self.collectors.remove(&channel)
    }

    fn submit(self: Box<Self>, callback: ResultCallback) {
        debug!("Root-only job on a non-root shell; not executed");
        for collector in self.collectors.values() {
            collector.close();
        }
        callback.deliver(ShellResult::not_executed());
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    /// How a scripted job hands back its result
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Delivery {
        /// Run on a spawned thread (the normal engine shape)
        Background,
        /// Run synchronously inside `submit`
        Inline,
        /// Drop the callback without running (engine bug)
        DropCallback,
        /// Panic on the worker thread before delivering
        Panic,
    }

    /// Scripted execution: lines to emit and how the job terminates
    #[derive(Debug, Clone)]
    pub struct Script {
        pub out: Vec<String>,
        pub err: Vec<String>,
        /// `None` means the job is killed without an exit code
        pub exit_code: Option<i32>,
        pub delivery: Delivery,
        /// Pause between emitted lines
        pub line_delay: Duration,
    }

    impl Script {
        pub fn success(out: &[&str]) -> Self {
            Self {
                out: out.iter().map(|s| s.to_string()).collect(),
                err: Vec::new(),
                exit_code: Some(0),
                delivery: Delivery::Background,
                line_delay: Duration::ZERO,
            }
        }

        pub fn failure(code: i32) -> Self {
            Self {
                exit_code: Some(code),
                ..Self::success(&[])
            }
        }

        pub fn killed() -> Self {
            Self {
                exit_code: None,
                ..Self::success(&[])
            }
        }

        pub fn with_err(mut self, err: &[&str]) -> Self {
            self.err = err.iter().map(|s| s.to_string()).collect();
            self
        }

        pub fn delivered(mut self, delivery: Delivery) -> Self {
            self.delivery = delivery;
            self
        }

        pub fn with_line_delay(mut self, delay: Duration) -> Self {
            self.line_delay = delay;
            self
        }

        /// Result an equivalent job produces when nothing is streamed
        pub fn expected_result(&self) -> ShellResult {
            build_result(self.exit_code, self.out.clone(), self.err.clone())
        }
    }

    fn build_result(exit_code: Option<i32>, out: Vec<String>, err: Vec<String>) -> ShellResult {
        match exit_code {
            Some(code) => ShellResult::from_exit_code(code, out, err),
            None => ShellResult::killed(out, err),
        }
    }

    /// Counts how many times jobs sharing it were submitted
    #[derive(Debug, Clone, Default)]
    pub struct SubmitCounter(Arc<AtomicUsize>);

    impl SubmitCounter {
        pub fn get(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    /// Mock engine job replaying a [`Script`]
    pub struct ScriptedJob {
        script: Script,
        commands: Vec<String>,
        collectors: HashMap<OutputChannel, Collector<String>>,
        counter: SubmitCounter,
    }

    impl ScriptedJob {
        pub fn new(script: Script) -> Self {
            Self::with_counter(script, SubmitCounter::default())
        }

        pub fn with_counter(script: Script, counter: SubmitCounter) -> Self {
            Self {
                script,
                commands: Vec::new(),
                collectors: HashMap::new(),
                counter,
            }
        }

        pub fn commands(&self) -> &[String] {
            &self.commands
        }

        pub fn boxed(self) -> Box<dyn Job> {
            Box::new(self)
        }

        fn run(script: &Script, collectors: &HashMap<OutputChannel, Collector<String>>) -> ShellResult {
            let mut out = Vec::new();
            let mut err = Vec::new();
            let streams = [
                (OutputChannel::Stdout, &script.out, &mut out),
                (OutputChannel::Stderr, &script.err, &mut err),
            ];
            for (channel, lines, captured) in streams {
                for line in lines {
                    if !script.line_delay.is_zero() {
                        thread::sleep(script.line_delay);
                    }
                    match collectors.get(&channel) {
                        Some(collector) => collector.append(line.clone()),
                        None => captured.push(line.clone()),
                    }
                }
            }
            for collector in collectors.values() {
                collector.close();
            }
            build_result(script.exit_code, out, err)
        }
    }

    impl Job for ScriptedJob {
        fn add(&mut self, command: &str) {
            self.commands.push(command.to_string());
        }

        fn to(&mut self, channel: OutputChannel, collector: Collector<String>) {
            self.collectors.insert(channel, collector);
        }

        fn take_collector(&mut self, channel: OutputChannel) -> Option<Collector<String>> {
            self.collectors.remove(&channel)
        }

        fn submit(self: Box<Self>, callback: ResultCallback) {
            self.counter.0.fetch_add(1, Ordering::SeqCst);
            let ScriptedJob {
                script, collectors, ..
            } = *self;

            match script.delivery {
                Delivery::Inline => {
                    let result = Self::run(&script, &collectors);
                    callback.deliver(result);
                }
                Delivery::Background => {
                    thread::spawn(move || {
                        let result = Self::run(&script, &collectors);
                        callback.deliver(result);
                    });
                }
                Delivery::DropCallback => drop(callback),
                Delivery::Panic => {
                    thread::spawn(move || {
                        let _callback = callback;
                        panic!("scripted engine crashed");
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::{Delivery, Script, ScriptedJob, SubmitCounter};
    use super::*;
    use crate::domain::ExecutionStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn counting_callback() -> (ResultCallback, Arc<AtomicUsize>, Arc<OneShot<ShellResult>>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let outcome = Arc::new(OneShot::new());
        let (calls_in, outcome_in) = (Arc::clone(&calls), Arc::clone(&outcome));
        let callback = ResultCallback::new(move |r| {
            calls_in.fetch_add(1, Ordering::SeqCst);
            outcome_in.complete(r);
        });
        (callback, calls, outcome)
    }

    #[test]
    fn test_callback_fires_once_per_submission() {
        let counter = SubmitCounter::default();
        for _ in 0..20 {
            let (callback, calls, outcome) = counting_callback();
            ScriptedJob::with_counter(Script::success(&["x"]), counter.clone())
                .boxed()
                .submit(callback);
            outcome.wait();
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
        assert_eq!(counter.get(), 20);
    }

    #[test]
    fn test_dropped_callback_delivers_not_executed() {
        let (callback, calls, outcome) = counting_callback();
        ScriptedJob::new(Script::success(&["never"]).delivered(Delivery::DropCallback))
            .boxed()
            .submit(callback);
        assert_eq!(outcome.wait().status(), ExecutionStatus::NotExecuted);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_engine_panic_still_delivers() {
        let (callback, calls, outcome) = counting_callback();
        ScriptedJob::new(Script::success(&[]).delivered(Delivery::Panic))
            .boxed()
            .submit(callback);
        assert_eq!(outcome.wait().status(), ExecutionStatus::NotExecuted);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_exec_matches_submitted_result() {
        let script = Script::failure(3).with_err(&["denied"]);
        let blocking = ScriptedJob::new(script.clone()).boxed().exec();

        let (callback, _, outcome) = counting_callback();
        ScriptedJob::new(script.clone()).boxed().submit(callback);

        assert_eq!(blocking, outcome.wait());
        assert_eq!(blocking, script.expected_result());
    }

    #[test]
    fn test_added_commands_are_kept_in_order() {
        let mut job = ScriptedJob::new(Script::success(&[]));
        job.add("echo one");
        job.add("echo two");
        assert_eq!(job.commands(), ["echo one".to_string(), "echo two".to_string()]);
    }

    #[test]
    fn test_exec_with_inline_delivery() {
        let result = ScriptedJob::new(Script::success(&["now"]).delivered(Delivery::Inline))
            .boxed()
            .exec();
        assert!(result.is_success());
        assert_eq!(result.out(), ["now".to_string()]);
    }

    #[test]
    fn test_attached_collector_receives_lines_before_delivery() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_sink = Arc::clone(&seen);
        let collector = Collector::new(move |line: String| seen_in_sink.lock().unwrap().push(line));

        let mut job = ScriptedJob::new(Script::success(&["a", "b"])).boxed();
        job.to(OutputChannel::Stdout, collector.clone());

        let seen_at_delivery = Arc::clone(&seen);
        let outcome = Arc::new(OneShot::new());
        let completer = Arc::clone(&outcome);
        job.submit(ResultCallback::new(move |r| {
            let snapshot = seen_at_delivery.lock().unwrap().clone();
            completer.complete((r, snapshot));
        }));

        let (result, lines_at_delivery) = outcome.wait();
        assert_eq!(lines_at_delivery, vec!["a", "b"]);
        // Streamed channels are not captured again
        assert!(result.out().is_empty());
        assert!(collector.is_closed());
    }

    #[test]
    fn test_taken_collector_is_no_longer_fed() {
        let mut job = ScriptedJob::new(Script::success(&["a"]).delivered(Delivery::Inline));
        let attached = Collector::retaining();
        job.to(OutputChannel::Stdout, attached.clone());

        assert!(job.take_collector(OutputChannel::Stdout).is_some());
        assert!(job.take_collector(OutputChannel::Stdout).is_none());

        let result = job.boxed().exec();
        assert!(attached.is_empty());
        assert_eq!(result.out(), ["a".to_string()]);
    }
}
