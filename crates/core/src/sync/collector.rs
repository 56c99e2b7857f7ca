// Incremental output sink
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

/// Observer notified once per appended element
pub trait ElementSink<E>: Send {
    fn on_element(&mut self, element: E);
}

impl<E, F> ElementSink<E> for F
where
    F: FnMut(E) + Send,
{
    fn on_element(&mut self, element: E) {
        self(element)
    }
}

struct CollectorState<E> {
    sink: Option<Box<dyn ElementSink<E>>>,
    retained: Option<Vec<E>>,
    appended: usize,
    closed: bool,
}

/// Thread-safe ordered append target shared between an engine and one observer.
///
/// `append` notifies the sink synchronously while holding the collector's
/// lock, so sink invocations never overlap and follow `append` order.
/// Cloning a `Collector` yields another handle to the same sink.
pub struct Collector<E> {
    state: Arc<Mutex<CollectorState<E>>>,
}

impl<E> Clone for Collector<E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<E: Clone + Send + 'static> Collector<E> {
    /// Collector forwarding every element to `sink`
    pub fn new(sink: impl ElementSink<E> + 'static) -> Self {
        Self::with_parts(Some(Box::new(sink)), None)
    }

    /// Collector without observer; appends are accepted and discarded
    pub fn noop() -> Self {
        Self::with_parts(None, None)
    }

    /// Collector keeping the full ordered sequence for [`snapshot`](Collector::snapshot)
    pub fn retaining() -> Self {
        Self::with_parts(None, Some(Vec::new()))
    }

    /// Collector that both forwards to `sink` and retains the sequence
    pub fn retaining_with(sink: impl ElementSink<E> + 'static) -> Self {
        Self::with_parts(Some(Box::new(sink)), Some(Vec::new()))
    }

    fn with_parts(sink: Option<Box<dyn ElementSink<E>>>, retained: Option<Vec<E>>) -> Self {
        Self {
            state: Arc::new(Mutex::new(CollectorState {
                sink,
                retained,
                appended: 0,
                closed: false,
            })),
        }
    }

    // A panicking sink poisons the mutex. The state is still valid, and the
    // next append must go through.
    fn lock(&self) -> MutexGuard<'_, CollectorState<E>> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append one element and notify the sink before returning
    pub fn append(&self, element: E) {
        let mut state = self.lock();
        if state.closed {
            warn!("Append after collector was closed; element dropped");
            return;
        }
        state.appended += 1;
        if let Some(retained) = state.retained.as_mut() {
            retained.push(element.clone());
        }
        if let Some(sink) = state.sink.as_mut() {
            sink.on_element(element);
        }
    }

    /// Mark the collector closed; further appends are dropped
    pub fn close(&self) {
        self.lock().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of accepted appends
    pub fn len(&self) -> usize {
        self.lock().appended
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retained elements, or an empty vector for non-retaining collectors
    pub fn snapshot(&self) -> Vec<E> {
        self.lock().retained.clone().unwrap_or_default()
    }
}
