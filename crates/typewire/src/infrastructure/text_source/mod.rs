//! Text sources: where the characters to type come from.
//!
//! - **`file`** – reads a text file of at most 500 KiB and decodes it
//!   (BOM-detected UTF-8/UTF-16, otherwise UTF-8 with a Windows-1252
//!   fallback).
//! - **`clipboard`** – reads Unicode text from the Windows clipboard.
//!
//! Whatever the source, [`check_length`] rejects text at or above the
//! 45,000-character ceiling before the pipeline ever sees it.

use std::path::PathBuf;

use thiserror::Error;
use typewire_core::text::{MAX_FILE_BYTES, MAX_TEXT_CHARS};

pub mod clipboard;
pub mod file;

pub use clipboard::ClipboardSource;
pub use file::FileSource;

/// Error type for reading input text.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("clipboard is unavailable: {0}")]
    ClipboardUnavailable(String),

    #[error("clipboard does not contain text")]
    ClipboardNotText,

    #[error("clipboard text is empty")]
    ClipboardEmpty,

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is empty", .0.display())]
    FileEmpty(PathBuf),

    #[error("{path} is {size} bytes; the limit is {max} bytes", max = MAX_FILE_BYTES)]
    FileTooLarge { path: PathBuf, size: u64 },

    #[error("text is {chars} characters; it must be under {max}", max = MAX_TEXT_CHARS)]
    TextTooLong { chars: usize },

    #[error("reading the clipboard is not supported on this platform")]
    Unsupported,
}

/// Produces the text for one run.
pub trait TextSource {
    /// Human-readable origin for log lines (`"clipboard"`, a file path).
    fn describe(&self) -> String;

    /// Reads the text.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] describing why no text could be produced.
    fn read_text(&self) -> Result<String, SourceError>;
}

/// Rejects text at or above the character ceiling.
///
/// # Errors
///
/// Returns [`SourceError::TextTooLong`] when `text` has
/// [`MAX_TEXT_CHARS`] characters or more.
pub fn check_length(text: String) -> Result<String, SourceError> {
    let chars = text.chars().count();
    if chars >= MAX_TEXT_CHARS {
        return Err(SourceError::TextTooLong { chars });
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_length_accepts_text_below_ceiling() {
        let text = "a".repeat(MAX_TEXT_CHARS - 1);
        assert!(check_length(text).is_ok());
    }

    #[test]
    fn test_check_length_rejects_text_at_ceiling() {
        let text = "a".repeat(MAX_TEXT_CHARS);
        let err = check_length(text).unwrap_err();
        assert!(matches!(err, SourceError::TextTooLong { chars } if chars == MAX_TEXT_CHARS));
    }

    #[test]
    fn test_check_length_counts_characters_not_bytes() {
        // 3 bytes per char in UTF-8, well under the ceiling in characters.
        let text = "€".repeat(20_000);
        assert!(check_length(text).is_ok());
    }
}
