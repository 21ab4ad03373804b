//! Append-only diagnostic log.
//!
//! Each run with diagnostics enabled appends its log-style report, UTF-8
//! encoded, followed by a separator line.  The file is never truncated or
//! rotated; it is small text and users delete it by hand.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use typewire_core::{DiagnosticReport, ReportStyle};

/// Written after every report.  Plain ASCII so any viewer shows it intact.
pub const REPORT_SEPARATOR: &str = "\r\n========================================\r\n\r\n";

#[derive(Debug, Error)]
#[error("could not append to diagnostic log {path}: {source}")]
pub struct DiagnosticLogError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Handle to the log file.  Opens the file per append so nothing stays locked
/// between runs.
#[derive(Debug, Clone)]
pub struct DiagnosticLog {
    path: PathBuf,
}

impl DiagnosticLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `report` in [`ReportStyle::Log`] plus [`REPORT_SEPARATOR`].
    ///
    /// # Errors
    ///
    /// Returns [`DiagnosticLogError`] if the directory or file cannot be
    /// created or written.
    pub fn append(&self, report: &DiagnosticReport) -> Result<(), DiagnosticLogError> {
        let io_err = |source| DiagnosticLogError { path: self.path.clone(), source };

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;

        let mut entry = report.render(ReportStyle::Log);
        entry.push_str(REPORT_SEPARATOR);
        file.write_all(entry.as_bytes()).map_err(io_err)?;

        debug!(path = %self.path.display(), run_id = %report.run_id(), "diagnostic report appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typewire_core::{DiagnosticState, RemoteClientInfo};
    use uuid::Uuid;

    fn sample_report(chars_sent: usize) -> DiagnosticReport {
        let target = RemoteClientInfo::classify("TscShellContainerClass", 1, 2, Default::default());
        let mut state = DiagnosticState::begin(Uuid::new_v4(), "Hybrid", &target, 10);
        state.record_events(20, 20);
        state.finish(chars_sent)
    }

    #[test]
    fn test_append_creates_file_and_writes_separator() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("typewire_test_{}", Uuid::new_v4()));
        let log = DiagnosticLog::new(dir.join("typewire-diag.log"));
        let report = sample_report(10);

        // Act
        log.append(&report).expect("append");

        // Assert
        let content = std::fs::read_to_string(log.path()).unwrap();
        assert!(content.contains("Typewire Injection Report"));
        assert!(content.contains(&report.run_id().to_string()));
        assert!(content.ends_with(REPORT_SEPARATOR));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_append_keeps_earlier_reports() {
        let dir = std::env::temp_dir().join(format!("typewire_test_{}", Uuid::new_v4()));
        let log = DiagnosticLog::new(dir.join("typewire-diag.log"));

        log.append(&sample_report(10)).unwrap();
        log.append(&sample_report(4)).unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.matches("Typewire Injection Report").count(), 2);
        assert!(content.contains("Incomplete: 4 of 10"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
