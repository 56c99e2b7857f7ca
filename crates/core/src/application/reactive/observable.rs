// Multi-value shape
use futures::stream::{FusedStream, Stream};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

use super::relay::{Relay, StreamEvent};
use crate::domain::OutputChannel;
use crate::port::Job;

/// Stream of the lines a job writes to one output channel, ending when the
/// job finishes. The final [`ShellResult`](crate::domain::ShellResult) is not
/// exposed.
///
/// Submits the job on first poll. Dropping the stream stops delivery to it;
/// the job keeps running.
#[must_use = "an ElementStream does nothing unless polled"]
pub struct ElementStream {
    relay: Arc<Relay>,
    events: mpsc::UnboundedReceiver<StreamEvent>,
    finished: bool,
}

impl ElementStream {
    pub(crate) fn new(relay: Arc<Relay>, events: mpsc::UnboundedReceiver<StreamEvent>) -> Self {
        Self {
            relay,
            events,
            finished: false,
        }
    }

    /// Stream `channel` of a job no other consumer shares
    pub fn from_job(job: Box<dyn Job>, channel: OutputChannel) -> Self {
        let (relay, events) = Relay::with_tap(job, channel);
        Self::new(relay, events)
    }
}

impl Stream for ElementStream {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<String>> {
        if self.finished {
            return Poll::Ready(None);
        }
        self.relay.ensure_submitted();
        match self.events.poll_recv(cx) {
            Poll::Ready(Some(StreamEvent::Element(line))) => Poll::Ready(Some(line)),
            Poll::Ready(Some(StreamEvent::Completed)) | Poll::Ready(None) => {
                self.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl FusedStream for ElementStream {
    fn is_terminated(&self) -> bool {
        self.finished
    }
}
