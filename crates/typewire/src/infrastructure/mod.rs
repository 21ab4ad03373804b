//! Infrastructure layer.
//!
//! Contains OS-facing adapters for the application ports, their in-memory
//! mocks, settings and log storage, and the text sources.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `typewire_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`input_injection`** – `SendInput` sink, Windows keyboard layout and the
//!   thread pacer; recording mocks for tests.
//! - **`target_probe`** – foreground-window classification.
//! - **`abort_monitor`** – the Escape hook and the process-wide abort flag.
//! - **`storage`** – `config.toml` and the diagnostic log.
//! - **`text_source`** – file and clipboard text.

use thiserror::Error;

use crate::application::InjectionPorts;

pub mod abort_monitor;
pub mod input_injection;
pub mod storage;
pub mod target_probe;
pub mod text_source;

/// Error type for platform adapter setup.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Keystroke injection needs a Windows desktop session.
    #[error("keystroke injection is only supported on Windows")]
    UnsupportedPlatform,

    /// The low-level keyboard hook could not be installed.
    #[error("keyboard hook installation failed: {0}")]
    HookInstall(String),
}

/// Builds the real OS ports for this platform.
///
/// # Errors
///
/// Returns [`PlatformError::UnsupportedPlatform`] on anything but Windows.
pub fn platform_ports() -> Result<InjectionPorts, PlatformError> {
    #[cfg(target_os = "windows")]
    {
        use std::sync::Arc;

        Ok(InjectionPorts {
            sink: Arc::new(input_injection::windows::SendInputSink::new()),
            pacer: Arc::new(input_injection::windows::ThreadPacer::new()),
            probe: Arc::new(target_probe::windows::ForegroundWindowProbe::new()),
            abort: Arc::new(abort_monitor::windows::EscapeHookMonitor::new()),
        })
    }

    #[cfg(not(target_os = "windows"))]
    {
        Err(PlatformError::UnsupportedPlatform)
    }
}
