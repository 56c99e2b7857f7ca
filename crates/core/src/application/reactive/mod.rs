// Reactive adapter: completion-only, multi-value and single-value shapes

mod completable;
mod observable;
mod relay;
mod single;

pub use completable::Completable;
pub use observable::ElementStream;
pub use single::SingleResult;

use std::sync::Arc;

use crate::domain::OutputChannel;
use crate::error::Result;
use crate::port::Job;
use relay::Relay;

/// Fan-out over one submission of a job.
///
/// Every shape created from the same `ReactiveJob` observes the same single
/// execution. The job is submitted when the first shape is polled (or on
/// [`submit`](ReactiveJob::submit)); output channels can only be tapped
/// before that.
///
/// ```no_run
/// # use rootshell_core::{Job, ReactiveJob};
/// # use futures::StreamExt;
/// # async fn run(job: Box<dyn Job>) -> rootshell_core::Result<()> {
/// let reactive = ReactiveJob::new(job);
/// let lines = reactive.observable()?;
/// let result = reactive.single();
///
/// let (lines, result) = futures::join!(lines.collect::<Vec<_>>(), result);
/// println!("{} lines, exit code {}", lines.len(), result.code());
/// # Ok(())
/// # }
/// ```
pub struct ReactiveJob {
    relay: Arc<Relay>,
}

impl ReactiveJob {
    pub fn new(job: Box<dyn Job>) -> Self {
        Self {
            relay: Relay::new(job),
        }
    }

    pub fn completable(&self) -> Completable {
        Completable::attach(Arc::clone(&self.relay))
    }

    pub fn single(&self) -> SingleResult {
        SingleResult::attach(Arc::clone(&self.relay))
    }

    /// Stream of stdout lines
    pub fn observable(&self) -> Result<ElementStream> {
        self.observable_on(OutputChannel::Stdout)
    }

    /// Stream of the lines written to `channel`.
    ///
    /// A collector attached to `channel` before wrapping keeps receiving every
    /// line and is closed before the outcome is delivered.
    ///
    /// Fails with [`ShellError::AlreadySubmitted`](crate::ShellError::AlreadySubmitted)
    /// once the job has been submitted.
    pub fn observable_on(&self, channel: OutputChannel) -> Result<ElementStream> {
        let events = self.relay.tap(channel)?;
        Ok(ElementStream::new(Arc::clone(&self.relay), events))
    }

    /// Submit now instead of on first poll
    pub fn submit(&self) {
        self.relay.ensure_submitted();
    }

    pub fn is_submitted(&self) -> bool {
        self.relay.is_submitted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExecutionStatus;
    use crate::error::ShellError;
    use crate::port::job::mocks::{Delivery, Script, ScriptedJob, SubmitCounter};
    use futures::future::FusedFuture;
    use futures::stream::FusedStream;
    use futures::StreamExt;
    use tokio_test::{assert_pending, assert_ready, assert_ready_eq, task};

    fn job(script: Script) -> Box<dyn Job> {
        ScriptedJob::new(script).boxed()
    }

    #[test]
    fn test_nothing_submitted_before_first_poll() {
        let counter = SubmitCounter::default();
        let reactive = ReactiveJob::new(
            ScriptedJob::with_counter(Script::success(&[]).delivered(Delivery::Inline), counter.clone())
                .boxed(),
        );
        let single = reactive.single();
        assert_eq!(counter.get(), 0);

        let mut single = task::spawn(single);
        let result = assert_ready!(single.poll());
        assert!(result.is_success());
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn test_stream_yields_elements_then_ends() {
        let reactive = ReactiveJob::new(job(
            Script::success(&["a", "b", "c"]).delivered(Delivery::Inline),
        ));
        let mut stream = task::spawn(reactive.observable().unwrap());

        assert_ready_eq!(stream.poll_next(), Some("a".to_string()));
        assert_ready_eq!(stream.poll_next(), Some("b".to_string()));
        assert_ready_eq!(stream.poll_next(), Some("c".to_string()));
        assert_ready_eq!(stream.poll_next(), None);
        assert!(stream.is_terminated());
        // Fused: no second terminal event, no resurrected elements
        assert_ready_eq!(stream.poll_next(), None);
    }

    #[test]
    fn test_completable_waits_for_background_job() {
        let reactive = ReactiveJob::new(job(Script::failure(9)));
        let mut completable = task::spawn(reactive.completable());
        let first = completable.poll();
        if first.is_pending() {
            while !completable.is_woken() {
                std::thread::sleep(std::time::Duration::from_millis(1));
            }
            assert_ready!(completable.poll());
        }
        assert!(completable.is_terminated());
        assert_pending!(completable.poll());
    }

    #[tokio::test]
    async fn test_failure_is_a_value_not_an_error() {
        let reactive = ReactiveJob::new(job(Script::failure(127)));
        let result = reactive.single().await;
        assert_eq!(result.status(), ExecutionStatus::Failed);
        assert_eq!(result.code(), 127);
    }

    #[tokio::test]
    async fn test_stream_and_single_share_one_submission() {
        let counter = SubmitCounter::default();
        let reactive = ReactiveJob::new(
            ScriptedJob::with_counter(Script::success(&["one", "two"]), counter.clone()).boxed(),
        );
        let lines = reactive.observable().unwrap();
        let errors = reactive.observable_on(OutputChannel::Stderr).unwrap();
        let single = reactive.single();
        let done = reactive.completable();

        let (lines, errors, result, ()) =
            futures::join!(lines.collect::<Vec<_>>(), errors.collect::<Vec<_>>(), single, done);

        assert_eq!(lines, vec!["one", "two"]);
        assert!(errors.is_empty());
        // Streamed lines are not duplicated into the result
        assert!(result.out().is_empty());
        assert!(result.is_success());
        assert_eq!(counter.get(), 1);
    }

    #[tokio::test]
    async fn test_tap_after_submit_fails() {
        let reactive = ReactiveJob::new(job(Script::success(&[])));
        reactive.submit();
        assert!(reactive.is_submitted());
        assert!(matches!(
            reactive.observable(),
            Err(ShellError::AlreadySubmitted)
        ));
        // Terminal shapes can still join late
        assert!(reactive.single().await.is_success());
        reactive.completable().await;
    }

    #[tokio::test]
    async fn test_dropped_stream_does_not_cancel_job() {
        let counter = SubmitCounter::default();
        let reactive = ReactiveJob::new(
            ScriptedJob::with_counter(
                Script::success(&["1", "2", "3"]).with_line_delay(std::time::Duration::from_millis(5)),
                counter.clone(),
            )
            .boxed(),
        );
        let mut lines = reactive.observable().unwrap();
        let single = reactive.single();

        assert_eq!(lines.next().await.as_deref(), Some("1"));
        drop(lines);

        let result = single.await;
        assert!(result.is_success());
        assert_eq!(counter.get(), 1);
    }

    #[tokio::test]
    async fn test_engine_fault_still_terminates_every_shape() {
        let reactive = ReactiveJob::new(job(
            Script::success(&["lost"]).delivered(Delivery::DropCallback),
        ));
        let lines = reactive.observable().unwrap();
        let single = reactive.single();
        let done = reactive.completable();

        let (lines, result, ()) = futures::join!(lines.collect::<Vec<_>>(), single, done);
        assert!(lines.is_empty());
        assert_eq!(result.status(), ExecutionStatus::NotExecuted);
    }
}
