// Process-backed job: commands piped into a fresh shell process
use std::collections::HashMap;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, Command};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use rootshell_core::port::{Clock, IdSource};
use rootshell_core::{
    Collector, Job, OutputChannel, Result, ResultCallback, ShellError, ShellResult,
};

use crate::config::ShellConfig;

/// Everything a job needs from the shell that created it
pub(crate) struct JobContext {
    pub(crate) config: ShellConfig,
    pub(crate) runtime: Handle,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) ids: Arc<dyn IdSource>,
}

/// Job executed by spawning the configured shell and writing its commands
/// to the shell's stdin.
///
/// Lines are read as the process produces them. Channels with an attached
/// collector are streamed there and left out of the result; the others are
/// captured into [`ShellResult::out`] / [`ShellResult::err`].
pub struct ProcessJob {
    commands: Vec<String>,
    collectors: HashMap<OutputChannel, Collector<String>>,
    context: Arc<JobContext>,
}

impl ProcessJob {
    pub(crate) fn new(context: Arc<JobContext>) -> Self {
        Self {
            commands: Vec::new(),
            collectors: HashMap::new(),
            context,
        }
    }
}

impl Job for ProcessJob {
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
        let ProcessJob {
            commands,
            collectors,
            context,
        } = *self;
        let execution_id = context.ids.next_id();
        debug!(
            execution_id = %execution_id,
            commands = commands.len(),
            streamed = collectors.len(),
            "Submitting shell job"
        );

        // A runtime that is shutting down drops the task, and with it the
        // callback, which then delivers NOT_EXECUTED.
        let runtime = context.runtime.clone();
        runtime.spawn(async move {
            let result = execute(&context, &execution_id, &commands, &collectors).await;
            callback.deliver(result);
        });
    }
}

/// Run one submission to completion; never fails, failures are results
async fn execute(
    context: &JobContext,
    execution_id: &str,
    commands: &[String],
    collectors: &HashMap<OutputChannel, Collector<String>>,
) -> ShellResult {
    let config = &context.config;
    let start_time = context.clock.now_millis();

    info!(
        execution_id = %execution_id,
        shell = %config.shell,
        commands = commands.len(),
        redirect_stderr = config.redirect_stderr,
        "Starting shell job"
    );

    let out_capture = Collector::retaining();
    let err_capture = Collector::retaining();
    let out_target = collectors
        .get(&OutputChannel::Stdout)
        .cloned()
        .unwrap_or_else(|| out_capture.clone());
    let err_target = if config.redirect_stderr {
        out_target.clone()
    } else {
        collectors
            .get(&OutputChannel::Stderr)
            .cloned()
            .unwrap_or_else(|| err_capture.clone())
    };

    let outcome = run_commands(config, commands, &out_target, &err_target).await;

    // Every element is in place before the terminal result leaves the job
    for collector in collectors.values() {
        collector.close();
    }

    let duration_ms = context.clock.now_millis() - start_time;
    let result = match outcome {
        Ok(status) => build_result(status, out_capture.snapshot(), err_capture.snapshot()),
        Err(e) => {
            warn!(execution_id = %execution_id, error = %e, "Shell job could not run");
            ShellResult::not_executed()
        }
    }
    .with_duration_ms(duration_ms);

    info!(
        execution_id = %execution_id,
        duration_ms = %duration_ms,
        exit_code = ?result.exit_code(),
        status = ?result.status(),
        "Shell job completed"
    );

    result
}

/// Map the process exit status onto a result
fn build_result(status: ExitStatus, out: Vec<String>, err: Vec<String>) -> ShellResult {
    match status.code() {
        Some(code) => ShellResult::from_exit_code(code, out, err),
        // Terminated by a signal
        None => ShellResult::killed(out, err),
    }
}

/// Spawn the shell, feed it `commands` and pump both output streams into
/// their targets until the process exits.
pub(crate) async fn run_commands(
    config: &ShellConfig,
    commands: &[String],
    out_target: &Collector<String>,
    err_target: &Collector<String>,
) -> Result<ExitStatus> {
    let mut command = Command::new(&config.shell);
    command
        .args(&config.args)
        .env_clear()
        .envs(config.filtered_env())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &config.working_dir {
        command.current_dir(dir);
    }

    let mut child = command
        .spawn()
        .map_err(|e| ShellError::NoShell(format!("failed to spawn '{}': {}", config.shell, e)))?;

    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| ShellError::Internal("shell stdin is not piped".to_string()))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| ShellError::Internal("shell stdout is not piped".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| ShellError::Internal("shell stderr is not piped".to_string()))?;

    let (written, out_read, err_read, status) = tokio::join!(
        write_commands(stdin, commands),
        pump_lines(stdout, out_target),
        pump_lines(stderr, err_target),
        child.wait(),
    );

    if let Err(e) = written {
        // The shell may exit before reading everything (`exit` mid-script)
        debug!(error = %e, "Shell stopped reading commands early");
    }
    out_read?;
    err_read?;
    Ok(status?)
}

async fn write_commands(mut stdin: ChildStdin, commands: &[String]) -> io::Result<()> {
    for command in commands {
        stdin.write_all(command.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
    }
    stdin.flush().await?;
    // Dropping stdin sends EOF, which ends the shell once the commands ran
    Ok(())
}

async fn pump_lines<R>(reader: R, target: &Collector<String>) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        target.append(String::from_utf8_lossy(&buf).into_owned());
    }
}
