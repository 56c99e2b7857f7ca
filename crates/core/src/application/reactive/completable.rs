// Completion-only shape
use futures::future::FusedFuture;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

use super::relay::Relay;

/// Resolves with `()` once the job finishes, whatever its status.
///
/// Submits the job on first poll. Dropping it before completion only stops
/// this consumer from being notified.
#[must_use = "a Completable does nothing unless polled"]
pub struct Completable {
    relay: Arc<Relay>,
    done: Option<oneshot::Receiver<()>>,
}

impl Completable {
    pub(crate) fn attach(relay: Arc<Relay>) -> Self {
        let (tx, rx) = oneshot::channel();
        relay.subscribe(move |_| {
            let _ = tx.send(());
        });
        Self {
            relay,
            done: Some(rx),
        }
    }
}

impl Future for Completable {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        self.relay.ensure_submitted();
        let Some(done) = self.done.as_mut() else {
            // Already completed; there is no second terminal event
            return Poll::Pending;
        };
        match Pin::new(done).poll(cx) {
            Poll::Ready(_) => {
                self.done = None;
                Poll::Ready(())
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl FusedFuture for Completable {
    fn is_terminated(&self) -> bool {
        self.done.is_none()
    }
}
