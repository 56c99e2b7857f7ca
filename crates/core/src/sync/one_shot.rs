// Single-fire promise
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;
use tracing::warn;

use super::panic_guard::run_guarded;

type Listener<T> = Box<dyn FnOnce(T) + Send + 'static>;

enum Slot<T> {
    Waiting(Vec<Listener<T>>),
    Fired(T),
}

/// Value that is completed exactly once and observed by any number of parties.
///
/// Listeners registered before [`complete`](OneShot::complete) run on the
/// completing thread, in registration order. Listeners registered after it
/// run immediately on the registering thread. [`wait`](OneShot::wait) blocks
/// the calling thread until the value is available.
pub struct OneShot<T> {
    slot: Mutex<Slot<T>>,
    fired: Condvar,
}

impl<T: Clone + Send + 'static> OneShot<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot::Waiting(Vec::new())),
            fired: Condvar::new(),
        }
    }

    // A listener panicking while we hold the guard would poison the mutex;
    // the slot itself is always left consistent, so recover it.
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fire the value. Returns `false` (and drops `value`) if already fired.
    pub fn complete(&self, value: T) -> bool {
        let listeners = {
            let mut slot = self.lock();
            if matches!(*slot, Slot::Fired(_)) {
                warn!("OneShot completed twice; ignoring the second value");
                return false;
            }
            match std::mem::replace(&mut *slot, Slot::Fired(value.clone())) {
                Slot::Waiting(listeners) => listeners,
                Slot::Fired(_) => Vec::new(),
            }
        };
        self.fired.notify_all();

        for listener in listeners {
            let value = value.clone();
            run_guarded("one_shot_listener", move || listener(value));
        }
        true
    }

    /// Register a listener; runs immediately if the value already fired.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: FnOnce(T) + Send + 'static,
    {
        let ready = {
            let mut slot = self.lock();
            match &mut *slot {
                Slot::Waiting(listeners) => {
                    listeners.push(Box::new(listener));
                    return;
                }
                Slot::Fired(value) => value.clone(),
            }
        };
        run_guarded("one_shot_listener", move || listener(ready));
    }

    pub fn is_fired(&self) -> bool {
        matches!(*self.lock(), Slot::Fired(_))
    }

    /// Current value, if fired
    pub fn peek(&self) -> Option<T> {
        match &*self.lock() {
            Slot::Fired(value) => Some(value.clone()),
            Slot::Waiting(_) => None,
        }
    }

    /// Block until the value fires.
    ///
    /// Must not be called on a thread that the completing side needs in order
    /// to make progress.
    pub fn wait(&self) -> T {
        let mut slot = self.lock();
        loop {
            if let Slot::Fired(value) = &*slot {
                return value.clone();
            }
            slot = self
                .fired
                .wait(slot)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Block for at most `timeout`; `None` if the value did not fire in time
    pub fn wait_timeout(&self, timeout: Duration) -> Option<T> {
        let slot = self.lock();
        let (slot, _) = self
            .fired
            .wait_timeout_while(slot, timeout, |slot| matches!(slot, Slot::Waiting(_)))
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match &*slot {
            Slot::Fired(value) => Some(value.clone()),
            Slot::Waiting(_) => None,
        }
    }
}

impl<T: Clone + Send + 'static> Default for OneShot<T> {
    fn default() -> Self {
        Self::new()
    }
}
