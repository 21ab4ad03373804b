//! Input injection adapters: [`InputSink`] and [`Pacer`] implementations.
//!
//! The Windows implementation is selected at compile time via
//! `#[cfg(target_os = "windows")]`.  The mock module is always compiled so
//! integration tests can run on any host.
//!
//! [`InputSink`]: crate::application::InputSink
//! [`Pacer`]: crate::application::Pacer

use std::time::Duration;

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Marker written into `dwExtraInfo` of every event this process injects.
///
/// ASCII "TYPW".  Lets a hook or a debugging tool tell our events apart.
pub const INJECTION_TAG: usize = 0x5459_5057;

/// Yield rounds performed by `drain_input_queue`.
pub const DRAIN_ROUNDS: u32 = 5;

/// Sleep after each yield round.
pub const DRAIN_ROUND_PAUSE: Duration = Duration::from_millis(2);

/// Timer resolution requested for the duration of a run, in milliseconds.
pub const TIMER_RESOLUTION_MS: u32 = 1;
