//! Target probe adapters: who has keyboard focus, and is it a remote client?
//!
//! `windows` asks the OS for the foreground window, its class name, owning
//! thread and keyboard layout.  `mock` replays a scripted target for tests.

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;
