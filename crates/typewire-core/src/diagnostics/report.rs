//! Human-readable rendering of a [`DiagnosticReport`].

use std::fmt::Write as _;

use super::DiagnosticReport;

/// Where the rendered report is going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStyle {
    /// Appended to the log file: timestamp and run id header, CRLF endings.
    Log,
    /// Shown to the user: no header, LF endings.
    Dialog,
}

impl ReportStyle {
    fn newline(self) -> &'static str {
        match self {
            ReportStyle::Log => "\r\n",
            ReportStyle::Dialog => "\n",
        }
    }
}

impl DiagnosticReport {
    /// Renders the report as text.
    pub fn render(&self, style: ReportStyle) -> String {
        let nl = style.newline();
        let mut out = String::new();

        // `write!` into a String cannot fail.
        if style == ReportStyle::Log {
            let _ = write!(out, "[{}]{nl}", self.started_at.format("%Y-%m-%d %H:%M:%S"));
            let _ = write!(out, "Run: {}{nl}", self.run_id);
        }

        let _ = write!(out, "Typewire Injection Report{nl}");
        let _ = write!(out, "─────────────────────────────{nl}");

        let _ = write!(out, "Target: {}", self.target_class);
        if self.target_is_remote {
            out.push_str(" (Remote)");
        }
        out.push_str(nl);
        let _ = write!(out, "Mode: {}{nl}{nl}", self.mode_name);

        let _ = write!(out, "Characters: {} / {}", self.chars_sent, self.chars_requested);
        out.push_str(if self.is_complete() { " ✓" } else { " (incomplete)" });
        out.push_str(nl);

        let _ = write!(
            out,
            "Events: {} / {} sent{nl}",
            self.events_sent, self.events_attempted
        );

        let _ = write!(out, "Duration: {} ms", self.duration.as_millis());
        if let Some(cps) = self.chars_per_sec() {
            let _ = write!(out, " ({cps:.1} chars/sec)");
        }
        out.push_str(nl);

        if !self.focus_changes.is_empty() || !self.errors.is_empty() {
            let _ = write!(out, "{nl}Issues:{nl}");
            if !self.focus_changes.is_empty() {
                let _ = write!(
                    out,
                    "  • Focus changed {} time(s) during injection{nl}",
                    self.focus_changes.len()
                );
                for sample in &self.focus_changes {
                    let class = if sample.window_class.is_empty() {
                        "(none)"
                    } else {
                        &sample.window_class
                    };
                    let _ = write!(out, "      +{} ms → {class}{nl}", sample.at.as_millis());
                }
            }
            for error in &self.errors {
                let _ = write!(out, "  • {error}{nl}");
            }
        }

        out
    }
}
