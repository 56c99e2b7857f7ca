// rootshell Core - Outcome Delivery, Collectors & Consumption Adapters
// NO process or transport code: engines implement the ports.

pub mod application;
pub mod domain;
pub mod error;
pub mod port;
pub mod sync;

pub use application::{
    await_result, retrieve_shell, suspend, Completable, ElementStream, JobExt, ReactiveJob,
    SingleResult,
};
pub use domain::{ExecutionStatus, OutputChannel, ShellResult, ShellStatus, JOB_NOT_EXECUTED};
pub use error::{Result, ShellError};
pub use port::{Job, NotExecutedJob, ResultCallback, Shell, ShellCallback, ShellProvider};
pub use sync::{Collector, ElementSink, OneShot};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
