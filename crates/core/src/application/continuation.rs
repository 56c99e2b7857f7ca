// Continuation adapter: one-shot callbacks as `async fn`s
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

use crate::domain::ShellResult;
use crate::error::{Result, ShellError};
use crate::port::{Job, ResultCallback, Shell, ShellProvider};

/// Resumption handle passed to the registering closure of [`suspend`]
pub type Resume<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// Park the calling task until `register`'s callback fires.
///
/// `register` runs on the first poll and receives the only resumption
/// handle; the task resumes exactly once, with the value passed to it.
/// Fails with [`ShellError::Abandoned`] if the handle is dropped unused.
/// Dropping the returned future stops waiting but does not undo whatever
/// `register` started.
pub async fn suspend<T, R>(register: R) -> Result<T>
where
    T: Send + 'static,
    R: FnOnce(Resume<T>),
{
    let (tx, rx) = oneshot::channel();
    register(Box::new(move |value| {
        if tx.send(value).is_err() {
            debug!("Continuation dropped before resumption; value discarded");
        }
    }));
    rx.await.map_err(|_| ShellError::Abandoned)
}

/// Submit `job` and resume with its result
pub async fn await_result(job: Box<dyn Job>) -> ShellResult {
    let resumed =
        suspend::<ShellResult, _>(move |resume| job.submit(ResultCallback::new(resume))).await;
    // ResultCallback delivers NOT_EXECUTED when dropped, so this only
    // triggers if the engine leaked the callback's delivery entirely.
    resumed.unwrap_or_else(|_| ShellResult::not_executed())
}

/// Resume with a ready shell from `provider`
pub async fn retrieve_shell<P>(provider: &P) -> Result<Arc<dyn Shell>>
where
    P: ShellProvider + ?Sized,
{
    suspend::<Result<Arc<dyn Shell>>, _>(move |resume| provider.get_shell(resume))
        .await
        .map_err(|_| ShellError::NoShell("shell provider dropped the callback".to_string()))?
}
