//! Mock abort monitor for tests.
//!
//! Each `MockAbortMonitor` owns its own flag instead of the process-wide one,
//! so tests running in parallel never abort each other.  A test can trip the
//! flag up front, after a number of polls, or from another thread.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::application::ports::{AbortGuard, AbortMonitor};

/// [`AbortMonitor`] with an instance-local flag and install/remove counters.
#[derive(Debug, Default)]
pub struct MockAbortMonitor {
    shared: Arc<Shared>,
}

#[derive(Debug, Default)]
struct Shared {
    requested: AtomicBool,
    /// Polls answered "no" before the flag trips on its own; 0 = never.
    trip_after_polls: AtomicUsize,
    polls: AtomicUsize,
    installs: AtomicUsize,
    removals: AtomicUsize,
}

impl MockAbortMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trips the abort flag on the `(n + 1)`-th poll of a run.
    pub fn abort_after_polls(n: usize) -> Self {
        let monitor = Self::default();
        monitor.shared.trip_after_polls.store(n + 1, Ordering::SeqCst);
        monitor
    }

    /// Raises the flag, as if the user had pressed Escape.
    pub fn press_escape(&self) {
        self.shared.requested.store(true, Ordering::SeqCst);
    }

    pub fn installs(&self) -> usize {
        self.shared.installs.load(Ordering::SeqCst)
    }

    pub fn removals(&self) -> usize {
        self.shared.removals.load(Ordering::SeqCst)
    }

    pub fn polls(&self) -> usize {
        self.shared.polls.load(Ordering::SeqCst)
    }

    /// True while a guard is alive.
    pub fn is_installed(&self) -> bool {
        self.installs() > self.removals()
    }
}

impl AbortMonitor for MockAbortMonitor {
    fn install(&self) -> Box<dyn AbortGuard> {
        self.shared.requested.store(false, Ordering::SeqCst);
        self.shared.polls.store(0, Ordering::SeqCst);
        self.shared.installs.fetch_add(1, Ordering::SeqCst);
        Box::new(MockAbortGuard { shared: Arc::clone(&self.shared) })
    }
}

struct MockAbortGuard {
    shared: Arc<Shared>,
}

impl AbortGuard for MockAbortGuard {
    fn is_requested(&self) -> bool {
        let polls = self.shared.polls.fetch_add(1, Ordering::SeqCst) + 1;
        let trip = self.shared.trip_after_polls.load(Ordering::SeqCst);
        if trip != 0 && polls >= trip {
            self.shared.requested.store(true, Ordering::SeqCst);
        }
        self.shared.requested.load(Ordering::SeqCst)
    }
}

impl Drop for MockAbortGuard {
    fn drop(&mut self) {
        self.shared.requested.store(false, Ordering::SeqCst);
        self.shared.removals.fetch_add(1, Ordering::SeqCst);
    }
}
