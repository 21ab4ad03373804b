//! File text source.

use std::path::{Path, PathBuf};

use tracing::debug;
use typewire_core::text::{decode_text, detect_encoding, MAX_FILE_BYTES};

use super::{check_length, SourceError, TextSource};

/// Reads and decodes a text file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SourceError {
        SourceError::Io { path: self.path.clone(), source }
    }
}

impl TextSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_text(&self) -> Result<String, SourceError> {
        let size = std::fs::metadata(&self.path).map_err(|e| self.io_error(e))?.len();
        if size == 0 {
            return Err(SourceError::FileEmpty(self.path.clone()));
        }
        if size > MAX_FILE_BYTES {
            return Err(SourceError::FileTooLarge { path: self.path.clone(), size });
        }

        let bytes = std::fs::read(&self.path).map_err(|e| self.io_error(e))?;
        debug!(
            path = %self.path.display(),
            bytes = bytes.len(),
            encoding = ?detect_encoding(&bytes),
            "read text file"
        );
        check_length(decode_text(&bytes))
    }
}
