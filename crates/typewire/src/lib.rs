//! typewire library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does typewire do? (for beginners)
//!
//! Some windows refuse a normal paste: remote-desktop sessions with clipboard
//! redirection disabled, browser-based terminals, locked-down legacy apps.
//! Typewire gets text into them anyway by *typing* it: every character becomes
//! synthetic key presses submitted to the OS input queue, as if someone were
//! typing very fast and very accurately.
//!
//! One run goes like this:
//!
//! 1. Normalize typographic punctuation to ASCII.
//! 2. Look at the focused window and decide whether it is a remote client.
//! 3. Pick an encoding (Unicode code units, scancodes, or a hybrid) and a
//!    pacing strategy (burst for local windows, per-character for remote).
//! 4. Walk the text, encode each character, submit batches with bounded
//!    retry, pause between batches, and stop early if the user presses Escape.
//! 5. Return how many characters were delivered, plus an optional report.

/// Application layer: the injection pipeline and the ports it depends on.
pub mod application;

/// Infrastructure layer: OS adapters, mocks, storage, and text sources.
pub mod infrastructure;
