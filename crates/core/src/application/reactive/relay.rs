// Shared submission + terminal-event relay behind every reactive shape
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::{OutputChannel, ShellResult};
use crate::error::{Result, ShellError};
use crate::port::{Job, ResultCallback};
use crate::sync::{Collector, OneShot};

/// Event carried by a tapped output channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StreamEvent {
    Element(String),
    Completed,
}

struct Tap {
    channel: OutputChannel,
    tx: mpsc::UnboundedSender<StreamEvent>,
}

enum Stage {
    Pending { job: Box<dyn Job>, taps: Vec<Tap> },
    Submitted,
}

/// Owns a job until the first consumer polls, then submits it once and
/// fans the single outcome out to every subscribed shape.
pub(crate) struct Relay {
    stage: Mutex<Stage>,
    submitted: AtomicBool,
    outcome: Arc<OneShot<ShellResult>>,
}

impl Relay {
    pub(crate) fn new(job: Box<dyn Job>) -> Arc<Self> {
        Arc::new(Self {
            stage: Mutex::new(Stage::Pending {
                job,
                taps: Vec::new(),
            }),
            submitted: AtomicBool::new(false),
            outcome: Arc::new(OneShot::new()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Stage> {
        self.stage.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a terminal listener; runs immediately if already delivered
    pub(crate) fn subscribe<F>(&self, listener: F)
    where
        F: FnOnce(ShellResult) + Send + 'static,
    {
        self.outcome.subscribe(listener);
    }

    /// Relay whose job streams `channel` from the start
    pub(crate) fn with_tap(
        job: Box<dyn Job>,
        channel: OutputChannel,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<StreamEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let relay = Arc::new(Self {
            stage: Mutex::new(Stage::Pending {
                job,
                taps: vec![Tap {
                    channel,
                    tx: tx.clone(),
                }],
            }),
            submitted: AtomicBool::new(false),
            outcome: Arc::new(OneShot::new()),
        });
        relay.forward_completion(tx);
        (relay, rx)
    }

    /// Route `channel` into a new event queue terminated by `Completed`.
    ///
    /// Only possible before submission: the collector has to be attached to
    /// the job before it starts producing.
    pub(crate) fn tap(
        &self,
        channel: OutputChannel,
    ) -> Result<mpsc::UnboundedReceiver<StreamEvent>> {
        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut stage = self.lock();
            match &mut *stage {
                Stage::Pending { taps, .. } => taps.push(Tap {
                    channel,
                    tx: tx.clone(),
                }),
                Stage::Submitted => return Err(ShellError::AlreadySubmitted),
            }
        }
        self.forward_completion(tx);
        Ok(rx)
    }

    // Elements are appended before the outcome fires, so `Completed` always
    // lands behind the last element in the queue.
    fn forward_completion(&self, tx: mpsc::UnboundedSender<StreamEvent>) {
        self.subscribe(move |_| {
            let _ = tx.send(StreamEvent::Completed);
        });
    }

    pub(crate) fn is_submitted(&self) -> bool {
        self.submitted.load(Ordering::Acquire)
    }

    /// Submit the job if no consumer has done so yet
    pub(crate) fn ensure_submitted(&self) {
        if self.is_submitted() {
            return;
        }
        let (mut job, taps) = {
            let mut stage = self.lock();
            match std::mem::replace(&mut *stage, Stage::Submitted) {
                Stage::Pending { job, taps } => (job, taps),
                Stage::Submitted => return,
            }
        };
        self.submitted.store(true, Ordering::Release);

        let mut by_channel: HashMap<OutputChannel, Vec<mpsc::UnboundedSender<StreamEvent>>> =
            HashMap::new();
        for tap in taps {
            by_channel.entry(tap.channel).or_default().push(tap.tx);
        }
        let tapped = by_channel.len();
        let mut chained = Vec::new();
        for (channel, senders) in by_channel {
            // A collector the caller attached earlier keeps receiving the channel
            let previous = job.take_collector(channel);
            if let Some(previous) = &previous {
                chained.push(previous.clone());
            }
            job.to(
                channel,
                Collector::new(move |line: String| {
                    if let Some(previous) = &previous {
                        previous.append(line.clone());
                    }
                    for tx in &senders {
                        // A dropped stream only stops its own delivery
                        let _ = tx.send(StreamEvent::Element(line.clone()));
                    }
                }),
            );
        }

        debug!(
            tapped_channels = tapped,
            chained_collectors = chained.len(),
            "Submitting job for reactive consumers"
        );
        let outcome = Arc::clone(&self.outcome);
        job.submit(ResultCallback::new(move |result| {
            for collector in &chained {
                collector.close();
            }
            outcome.complete(result);
        }));
    }
}
