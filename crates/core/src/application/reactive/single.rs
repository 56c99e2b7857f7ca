// Single-value shape
use futures::future::FusedFuture;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

use super::relay::Relay;
use crate::domain::ShellResult;

/// Resolves with the job's [`ShellResult`].
///
/// A failed command is still an ordinary value here; there is no error
/// output. Submits the job on first poll.
#[must_use = "a SingleResult does nothing unless polled"]
pub struct SingleResult {
    relay: Arc<Relay>,
    value: Option<oneshot::Receiver<ShellResult>>,
}

impl SingleResult {
    pub(crate) fn attach(relay: Arc<Relay>) -> Self {
        let (tx, rx) = oneshot::channel();
        relay.subscribe(move |result| {
            let _ = tx.send(result);
        });
        Self {
            relay,
            value: Some(rx),
        }
    }
}

impl Future for SingleResult {
    type Output = ShellResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<ShellResult> {
        self.relay.ensure_submitted();
        let Some(value) = self.value.as_mut() else {
            return Poll::Pending;
        };
        match Pin::new(value).poll(cx) {
            Poll::Ready(received) => {
                self.value = None;
                Poll::Ready(received.unwrap_or_else(|_| ShellResult::not_executed()))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl FusedFuture for SingleResult {
    fn is_terminated(&self) -> bool {
        self.value.is_none()
    }
}
