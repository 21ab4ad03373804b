//! # typewire-core
//!
//! Shared library for Typewire containing the domain types, keyboard tables,
//! pacing policy, text helpers and the diagnostic recorder.
//!
//! This crate has zero dependencies on OS APIs.  Everything that touches the
//! live desktop (window focus, `SendInput`, keyboard hooks) lives in the
//! `typewire` crate's infrastructure layer and talks to this crate through
//! plain values.
//!
//! # Architecture overview (for beginners)
//!
//! Typewire "types" a block of text into whatever window has keyboard focus,
//! one synthetic key press at a time.  That sounds trivial, but remote-desktop
//! clients (RDP, Citrix, VNC, browser viewers) add latency, coalesce events,
//! and re-derive keys from scancodes using the *remote* keyboard layout.
//!
//! - **`domain`** – What a run is made of: the requested [`InjectionMode`],
//!   the [`PacingConfig`] chosen for the target, the [`RemoteClientInfo`]
//!   describing the focused window, and the [`KeyInput`] records that are
//!   eventually submitted to the OS.
//!
//! - **`keymap`** – The [`KeyboardLayout`] abstraction that resolves a
//!   character to a virtual key plus Shift state, and a built-in US-QWERTY
//!   table used by tests, benchmarks and non-Windows builds.
//!
//! - **`text`** – Typographic normalization (curly quotes, dashes, ellipsis)
//!   and byte decoding with BOM sniffing for file sources.
//!
//! - **`diagnostics`** – The optional per-run recorder and its text report.

pub mod diagnostics;
pub mod domain;
pub mod keymap;
pub mod text;

// Re-export the most-used types at the crate root so callers can write
// `typewire_core::PacingConfig` instead of the full module path.
pub use diagnostics::{DiagnosticReport, DiagnosticState, ReportStyle};
pub use domain::event::KeyInput;
pub use domain::mode::{EncodingMode, InjectionMode, ParseModeError};
pub use domain::pacing::{PacingConfig, PacingStrategy};
pub use domain::target::{KeyboardLayoutId, RemoteClientInfo};
pub use keymap::{KeyboardLayout, VkMapping};
