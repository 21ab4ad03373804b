//! Abort monitor adapters: watch for Escape while a run is in progress.
//!
//! # How abort works (for beginners)
//!
//! The pipeline is a tight loop on a blocking thread; it never reads the
//! keyboard itself.  Instead a system-wide observer sets a process-wide flag
//! when the user presses Escape, and the pipeline polls that flag between
//! batches.  The flag is an atomic so the observer (on its own thread) and
//! the pipeline never need a lock.
//!
//! The same flag can be raised from elsewhere through [`request_abort`]; the
//! CLI does so on Ctrl+C.
//!
//! Installing the observer clears the flag, and so does removing it, so one
//! run's Escape never leaks into the next.

use std::sync::atomic::{AtomicBool, Ordering};

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Process-wide abort flag shared by the OS observer and the pipeline.
static ABORT_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Raises the abort flag.  Safe to call from any thread or a signal task.
pub fn request_abort() {
    ABORT_REQUESTED.store(true, Ordering::SeqCst);
}

pub fn is_abort_requested() -> bool {
    ABORT_REQUESTED.load(Ordering::SeqCst)
}

pub fn reset_abort_flag() {
    ABORT_REQUESTED.store(false, Ordering::SeqCst);
}
