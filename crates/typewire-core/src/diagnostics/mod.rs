//! Optional per-run diagnostic recorder.
//!
//! When diagnostics are enabled the pipeline creates one [`DiagnosticState`] at
//! run start, feeds it counters, focus samples and error strings while typing,
//! and finalizes it into a read-only [`DiagnosticReport`] when the run ends.
//! The recorder only observes; nothing in it changes what gets typed.

mod report;

pub use report::ReportStyle;

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use uuid::Uuid;

use crate::domain::target::RemoteClientInfo;

/// One observed change of the focused window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusSample {
    /// Time since the run started.
    pub at: Duration,
    /// Class of the window that held focus at that moment (may be empty).
    pub window_class: String,
}

/// Mutable recorder for an in-progress run.
#[derive(Debug, Clone)]
pub struct DiagnosticState {
    run_id: Uuid,
    mode_name: String,
    target_class: String,
    target_is_remote: bool,
    chars_requested: usize,
    events_attempted: usize,
    events_sent: usize,
    focus_changes: Vec<FocusSample>,
    errors: Vec<String>,
    last_focus_class: String,
    started_at: DateTime<Local>,
    started: Instant,
}

impl DiagnosticState {
    /// Starts recording a run against `target`.
    pub fn begin(
        run_id: Uuid,
        mode_name: impl Into<String>,
        target: &RemoteClientInfo,
        chars_requested: usize,
    ) -> Self {
        Self {
            run_id,
            mode_name: mode_name.into(),
            target_class: target.display_class().to_string(),
            target_is_remote: target.is_remote,
            chars_requested,
            events_attempted: 0,
            events_sent: 0,
            focus_changes: Vec::new(),
            errors: Vec::new(),
            last_focus_class: target.window_class.clone(),
            started_at: Local::now(),
            started: Instant::now(),
        }
    }

    /// Adds the outcome of one flush.
    pub fn record_events(&mut self, attempted: usize, sent: usize) {
        self.events_attempted += attempted;
        self.events_sent += sent;
    }

    /// Records a focus sample if the class differs from the last one seen.
    pub fn observe_focus(&mut self, window_class: &str) {
        if window_class == self.last_focus_class {
            return;
        }
        self.last_focus_class = window_class.to_string();
        self.focus_changes.push(FocusSample {
            at: self.started.elapsed(),
            window_class: window_class.to_string(),
        });
    }

    /// Records an abnormal condition.
    pub fn record_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Stops the clock and freezes the recorder into a report.
    ///
    /// A short count is recorded as a partial-completion issue.
    pub fn finish(mut self, chars_sent: usize) -> DiagnosticReport {
        if chars_sent < self.chars_requested {
            self.errors.push(format!(
                "Incomplete: {chars_sent} of {} characters delivered",
                self.chars_requested
            ));
        }
        DiagnosticReport {
            run_id: self.run_id,
            mode_name: self.mode_name,
            target_class: self.target_class,
            target_is_remote: self.target_is_remote,
            chars_sent,
            chars_requested: self.chars_requested,
            events_attempted: self.events_attempted,
            events_sent: self.events_sent,
            focus_changes: self.focus_changes,
            errors: self.errors,
            started_at: self.started_at,
            duration: self.started.elapsed(),
        }
    }
}

/// Finalized, read-only record of one run.
#[derive(Debug, Clone)]
pub struct DiagnosticReport {
    pub(crate) run_id: Uuid,
    pub(crate) mode_name: String,
    pub(crate) target_class: String,
    pub(crate) target_is_remote: bool,
    pub(crate) chars_sent: usize,
    pub(crate) chars_requested: usize,
    pub(crate) events_attempted: usize,
    pub(crate) events_sent: usize,
    pub(crate) focus_changes: Vec<FocusSample>,
    pub(crate) errors: Vec<String>,
    pub(crate) started_at: DateTime<Local>,
    pub(crate) duration: Duration,
}

impl DiagnosticReport {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn chars_sent(&self) -> usize {
        self.chars_sent
    }

    pub fn chars_requested(&self) -> usize {
        self.chars_requested
    }

    pub fn events_attempted(&self) -> usize {
        self.events_attempted
    }

    pub fn events_sent(&self) -> usize {
        self.events_sent
    }

    /// Events handed to the OS but never accepted.
    pub fn events_failed(&self) -> usize {
        self.events_attempted.saturating_sub(self.events_sent)
    }

    pub fn focus_changes(&self) -> &[FocusSample] {
        &self.focus_changes
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_complete(&self) -> bool {
        self.chars_sent == self.chars_requested
    }

    /// Throughput in characters per second, when measurable.
    pub fn chars_per_sec(&self) -> Option<f64> {
        let millis = self.duration.as_millis();
        if millis == 0 || self.chars_sent == 0 {
            return None;
        }
        Some(self.chars_sent as f64 * 1000.0 / millis as f64)
    }
}
