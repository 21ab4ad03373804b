//! Clipboard text source.
//!
//! On Windows the clipboard is opened, `CF_UNICODETEXT` is required, and the
//! NUL-terminated UTF-16 text is copied out under `GlobalLock`.  The clipboard
//! is closed by a guard on every path.  Other platforms report
//! [`SourceError::Unsupported`].

use super::{SourceError, TextSource};

/// Reads the current clipboard text.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClipboardSource;

impl ClipboardSource {
    pub fn new() -> Self {
        Self
    }
}

impl TextSource for ClipboardSource {
    fn describe(&self) -> String {
        "clipboard".to_string()
    }

    fn read_text(&self) -> Result<String, SourceError> {
        let text = platform::read_unicode_text()?;
        if text.is_empty() {
            return Err(SourceError::ClipboardEmpty);
        }
        super::check_length(text)
    }
}

#[cfg(target_os = "windows")]
mod platform {
    use std::time::Duration;

    use tracing::debug;
    use windows::Win32::Foundation::HGLOBAL;
    use windows::Win32::System::DataExchange::{
        CloseClipboard, GetClipboardData, IsClipboardFormatAvailable, OpenClipboard,
    };
    use windows::Win32::System::Memory::{GlobalLock, GlobalSize, GlobalUnlock};
    use windows::Win32::System::Ole::CF_UNICODETEXT;

    use super::SourceError;

    /// Another process may hold the clipboard for a moment.
    const OPEN_ATTEMPTS: u32 = 5;
    const OPEN_RETRY_PAUSE: Duration = Duration::from_millis(20);

    /// Closes the clipboard when dropped.
    struct OpenClipboardGuard;

    impl OpenClipboardGuard {
        fn open() -> Result<Self, SourceError> {
            let mut last_error = String::new();
            for attempt in 1..=OPEN_ATTEMPTS {
                // SAFETY: no owner window is needed for reading.
                match unsafe { OpenClipboard(None) } {
                    Ok(()) => return Ok(Self),
                    Err(err) => {
                        debug!(attempt, error = %err, "clipboard busy");
                        last_error = err.to_string();
                        std::thread::sleep(OPEN_RETRY_PAUSE);
                    }
                }
            }
            Err(SourceError::ClipboardUnavailable(last_error))
        }
    }

    impl Drop for OpenClipboardGuard {
        fn drop(&mut self) {
            // SAFETY: only constructed after OpenClipboard succeeded.
            let _ = unsafe { CloseClipboard() };
        }
    }

    pub(super) fn read_unicode_text() -> Result<String, SourceError> {
        let format = u32::from(CF_UNICODETEXT.0);
        let _clipboard = OpenClipboardGuard::open()?;

        // SAFETY: the clipboard is open for the lifetime of `_clipboard`.
        if unsafe { IsClipboardFormatAvailable(format) }.is_err() {
            return Err(SourceError::ClipboardNotText);
        }
        // SAFETY: as above; the handle stays owned by the clipboard.
        let handle = unsafe { GetClipboardData(format) }
            .map_err(|e| SourceError::ClipboardUnavailable(e.to_string()))?;
        let hglobal = HGLOBAL(handle.0);

        // SAFETY: hglobal is a clipboard memory object; it stays valid while
        // the clipboard is open and is unlocked before we return.
        unsafe {
            let ptr = GlobalLock(hglobal) as *const u16;
            if ptr.is_null() {
                return Err(SourceError::ClipboardUnavailable("GlobalLock failed".to_string()));
            }
            let capacity = GlobalSize(hglobal) / std::mem::size_of::<u16>();
            let units = std::slice::from_raw_parts(ptr, capacity);
            let len = units.iter().position(|&u| u == 0).unwrap_or(capacity);
            let text = String::from_utf16_lossy(&units[..len]);
            let _ = GlobalUnlock(hglobal);
            Ok(text)
        }
    }
}

#[cfg(not(target_os = "windows"))]
mod platform {
    use super::SourceError;

    pub(super) fn read_unicode_text() -> Result<String, SourceError> {
        Err(SourceError::Unsupported)
    }
}
