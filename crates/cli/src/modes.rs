// One runner per consumption idiom
use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use futures::StreamExt;
use tokio::sync::oneshot;

use rootshell_core::{
    await_result, Collector, Job, JobExt, OutputChannel, ReactiveJob, ResultCallback, ShellResult,
};

/// How `run` consumes the job's outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// `exec()` on a blocking thread
    Blocking,
    /// `submit()` with a result callback, output streamed through collectors
    Callback,
    /// Continuation: `await_result`
    Await,
    /// Element stream of output lines plus a single result
    Stream,
    /// Single result
    Single,
    /// Completion only
    Completable,
}

/// What a run produced
pub enum Outcome {
    Result(ShellResult),
    Completed,
}

pub async fn run(mode: Mode, job: Box<dyn Job>, redirect_stderr: bool) -> Result<Outcome> {
    let outcome = match mode {
        Mode::Blocking => {
            let result = tokio::task::spawn_blocking(move || job.exec())
                .await
                .context("Blocking execution thread failed")?;
            Outcome::Result(result)
        }
        Mode::Callback => Outcome::Result(run_with_callback(job).await),
        Mode::Await => Outcome::Result(await_result(job).await),
        Mode::Stream => Outcome::Result(run_streaming(job, redirect_stderr).await?),
        Mode::Single => Outcome::Result(job.as_single().await),
        Mode::Completable => {
            job.as_completable().await;
            Outcome::Completed
        }
    };
    Ok(outcome)
}

async fn run_with_callback(mut job: Box<dyn Job>) -> ShellResult {
    job.to(
        OutputChannel::Stdout,
        Collector::new(|line: String| println!("{}", line)),
    );
    job.to(
        OutputChannel::Stderr,
        Collector::new(|line: String| eprintln!("{}", line.red())),
    );

    let (tx, rx) = oneshot::channel();
    job.submit(ResultCallback::new(move |result| {
        let _ = tx.send(result);
    }));
    rx.await.unwrap_or_else(|_| ShellResult::not_executed())
}

async fn run_streaming(job: Box<dyn Job>, redirect_stderr: bool) -> Result<ShellResult> {
    let reactive = ReactiveJob::new(job);
    let lines = reactive.observable()?;
    let result = reactive.single();

    let print_out = lines.for_each(|line| async move { println!("{}", line) });
    if redirect_stderr {
        let ((), result) = futures::join!(print_out, result);
        return Ok(result);
    }

    let errors = reactive.observable_on(OutputChannel::Stderr)?;
    let print_err = errors.for_each(|line| async move { eprintln!("{}", line.red()) });
    let ((), (), result) = futures::join!(print_out, print_err, result);
    Ok(result)
}
