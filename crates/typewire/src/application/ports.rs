//! Ports: the traits the injection pipeline needs from the outside world.
//!
//! Each port has a Windows implementation in the infrastructure layer and an
//! in-memory implementation for tests.  The pipeline only ever sees the
//! traits, so every code path (rejection, abort, focus change) can be
//! exercised without a desktop.

use std::sync::Arc;
use std::time::Duration;

use typewire_core::{KeyInput, KeyboardLayout, RemoteClientInfo};

/// Submits keyboard events to the OS input queue.
pub trait InputSink: Send + Sync {
    /// Submits `events` in order and returns how many leading events the OS
    /// accepted.  Zero means the whole submission was rejected.
    fn submit(&self, events: &[KeyInput]) -> usize;
}

/// Blocking delays and the scoped timer-resolution request.
pub trait Pacer: Send + Sync {
    /// Blocks the calling thread for `duration`.
    fn pause(&self, duration: Duration);

    /// Yields repeatedly so the target can work through queued input.
    fn drain_input_queue(&self);

    /// Requests millisecond timer resolution.  Paired with
    /// [`end_precise_timing`](Pacer::end_precise_timing).
    fn begin_precise_timing(&self);

    /// Releases the request made by `begin_precise_timing`.
    fn end_precise_timing(&self);
}

/// Inspects the window that currently holds keyboard focus.
#[cfg_attr(test, mockall::automock)]
pub trait TargetProbe: Send + Sync {
    /// Classifies the focused window.  Returns [`RemoteClientInfo::no_focus`]
    /// when nothing has focus.
    fn classify(&self) -> RemoteClientInfo;

    /// Class name of the focused window right now, `None` if nothing has focus.
    fn foreground_class(&self) -> Option<String>;

    /// Layout used to resolve virtual keys for the classified target.
    fn keyboard_layout(&self, target: &RemoteClientInfo) -> Arc<dyn KeyboardLayout>;
}

/// Installs the system-wide abort observer for the duration of one run.
pub trait AbortMonitor: Send + Sync {
    /// Clears the abort flag and starts observing.  Dropping the returned
    /// guard stops observing and clears the flag again.
    fn install(&self) -> Box<dyn AbortGuard>;
}

/// Live view of the abort flag while the observer is installed.
pub trait AbortGuard: Send {
    fn is_requested(&self) -> bool;
}

/// The full set of ports one pipeline runs against.
#[derive(Clone)]
pub struct InjectionPorts {
    pub sink: Arc<dyn InputSink>,
    pub pacer: Arc<dyn Pacer>,
    pub probe: Arc<dyn TargetProbe>,
    pub abort: Arc<dyn AbortMonitor>,
}
