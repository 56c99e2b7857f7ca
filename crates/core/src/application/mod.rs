// Application Layer - Consumption adapters over the outcome delivery contract

pub mod continuation;
pub mod ext;
pub mod reactive;

// Re-exports
pub use continuation::{await_result, retrieve_shell, suspend, Resume};
pub use ext::JobExt;
pub use reactive::{Completable, ElementStream, ReactiveJob, SingleResult};
