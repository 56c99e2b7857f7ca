// Consumption idioms as methods on a job
use futures::future::BoxFuture;

use super::continuation;
use super::reactive::{Completable, ElementStream, ReactiveJob, SingleResult};
use crate::domain::{OutputChannel, ShellResult};
use crate::port::Job;

/// Single-consumer conveniences over a boxed [`Job`].
///
/// Each method consumes the job; use [`ReactiveJob`] to share one
/// submission between several shapes.
pub trait JobExt {
    /// Completes when the job finishes
    fn as_completable(self) -> Completable;

    /// Stdout lines, ending when the job finishes
    fn as_observable(self) -> ElementStream;

    /// The job's result as a single value
    fn as_single(self) -> SingleResult;

    /// Submit and suspend until the result arrives
    fn await_result(self) -> BoxFuture<'static, ShellResult>;
}

impl JobExt for Box<dyn Job> {
    fn as_completable(self) -> Completable {
        ReactiveJob::new(self).completable()
    }

    fn as_observable(self) -> ElementStream {
        ElementStream::from_job(self, OutputChannel::Stdout)
    }

    fn as_single(self) -> SingleResult {
        ReactiveJob::new(self).single()
    }

    fn await_result(self) -> BoxFuture<'static, ShellResult> {
        Box::pin(continuation::await_result(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExecutionStatus;
    use crate::port::job::mocks::{Script, ScriptedJob};
    use futures::StreamExt;

    #[tokio::test]
    async fn test_each_idiom_sees_the_same_outcome() {
        let script = Script::failure(2).with_err(&["bad"]);

        let awaited = ScriptedJob::new(script.clone()).boxed().await_result().await;
        let single = ScriptedJob::new(script.clone()).boxed().as_single().await;
        ScriptedJob::new(script.clone()).boxed().as_completable().await;

        assert_eq!(awaited, single);
        assert_eq!(awaited, script.expected_result());
        assert_eq!(awaited.status(), ExecutionStatus::Failed);
    }

    #[tokio::test]
    async fn test_as_observable_streams_stdout() {
        let lines: Vec<String> = ScriptedJob::new(Script::success(&["a", "b", "c"]).with_err(&["e"]))
            .boxed()
            .as_observable()
            .collect()
            .await;
        assert_eq!(lines, vec!["a", "b", "c"]);
    }
}
