//! Application layer: the injection pipeline.
//!
//! # What lives here?
//!
//! - **`ports`** – Traits for everything the pipeline needs from the OS:
//!   submitting events, sleeping, inspecting the focused window, and watching
//!   for the abort key.  Implementations are injected at construction time.
//!
//! - **`encode`** – Turns one character into key events under the chosen
//!   encoding mode and target layout.
//!
//! - **`flush`** – Submits a buffer of events with bounded retry, burst or
//!   paced.
//!
//! - **`inject_text`** – The `send_text` use case that drives the other three
//!   and reports how far it got.
//!
//! **Dependency rule**: nothing in this module imports `infrastructure`.

pub mod encode;
pub mod flush;
pub mod inject_text;
pub mod ports;

pub use inject_text::{InjectTextUseCase, InjectionOutcome, InjectionRequest, RunState};
pub use ports::{AbortGuard, AbortMonitor, InjectionPorts, InputSink, Pacer, TargetProbe};
