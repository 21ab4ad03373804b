//! InjectText use case: type a block of text into the focused window.
//!
//! This is the pipeline that ties the other pieces together:
//!
//! 1. Normalize typography and count logical characters (CRLF counts once).
//! 2. Classify the focused window and pick an encoding mode and pacing config.
//! 3. Enter the run scope: precise timing on, modifiers released, abort
//!    observer installed.
//! 4. Walk the text.  Buffer encoded events, flush at chunk boundaries, send
//!    a hardware Enter for each line break, pause as the pacing config says.
//!    Check for abort whenever the buffer is empty.
//! 5. Leave the run scope (modifiers released again, observer removed, timer
//!    restored) and finalize diagnostics.
//!
//! Step 5 happens in [`RunScope`]'s `Drop`, so it runs on every exit path:
//! completion, abort, submission failure, and panic.
//!
//! # Run states (for beginners)
//!
//! ```text
//!            send_text
//!   Idle ───────────────▶ Running ──┬──▶ Completed   every character delivered
//!                                   ├──▶ Aborted     Escape pressed
//!                                   └──▶ Failed      input queue kept rejecting
//! ```
//!
//! The character count in [`InjectionOutcome`] is always the number actually
//! delivered, so a caller can tell "typed 812 of 1000" apart from "done".

use tracing::{debug, info, info_span, warn};
use typewire_core::text::normalize_typography;
use typewire_core::{
    DiagnosticReport, DiagnosticState, InjectionMode, KeyInput, PacingConfig, PacingStrategy,
    RemoteClientInfo,
};
use uuid::Uuid;

use super::encode::CharacterEncoder;
use super::flush::{EventFlusher, FlushError};
use super::ports::{AbortGuard, InjectionPorts, InputSink, Pacer, TargetProbe};

// ── Request / outcome ─────────────────────────────────────────────────────────

/// One request to type `text` into whatever window has focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionRequest {
    pub text: String,
    pub mode: InjectionMode,
    /// User baseline added to every pause, clamped to 0..=100 ms.
    pub base_delay_ms: u32,
    /// Record a [`DiagnosticReport`] for this run.
    pub diagnostics: bool,
    /// Force a pacing strategy instead of choosing one from the target.
    pub pacing: Option<PacingStrategy>,
}

impl InjectionRequest {
    pub fn new(text: impl Into<String>, mode: InjectionMode) -> Self {
        Self {
            text: text.into(),
            mode,
            base_delay_ms: 0,
            diagnostics: false,
            pacing: None,
        }
    }

    pub fn with_base_delay(mut self, base_delay_ms: u32) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    pub fn with_pacing(mut self, strategy: PacingStrategy) -> Self {
        self.pacing = Some(strategy);
        self
    }
}

/// Lifecycle of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Aborted,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Completed | RunState::Aborted | RunState::Failed)
    }
}

/// What one `send_text` call achieved.
#[derive(Debug, Clone)]
pub struct InjectionOutcome {
    pub state: RunState,
    /// Logical characters delivered, each line break counting as one.
    pub chars_sent: usize,
    /// Logical characters after normalization and CRLF collapse.
    pub chars_requested: usize,
    /// Flushes that submitted events, Enter keys included.
    pub flushes: usize,
    pub target: RemoteClientInfo,
    pub pacing: PacingConfig,
    /// Present when the request asked for diagnostics.
    pub report: Option<DiagnosticReport>,
}

// ── Use case ──────────────────────────────────────────────────────────────────

/// Types text through the injected ports.
pub struct InjectTextUseCase {
    ports: InjectionPorts,
    state: RunState,
}

impl InjectTextUseCase {
    pub fn new(ports: InjectionPorts) -> Self {
        Self { ports, state: RunState::Idle }
    }

    /// State after the most recent run, `Idle` if none has happened.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Types `request.text` into the focused window.
    ///
    /// Blocks for the duration of the run.  `progress` is called with
    /// `(chars_sent, chars_requested)` after every flush and every Enter.
    pub fn send_text(
        &mut self,
        request: &InjectionRequest,
        progress: &mut dyn FnMut(usize, usize),
    ) -> InjectionOutcome {
        let run_id = Uuid::new_v4();
        let text = normalize_typography(&request.text);
        let chars_requested = logical_char_count(&text);

        let target = self.ports.probe.classify();
        let encoding = request.mode.resolve();
        let pacing = match request.pacing {
            Some(strategy) => PacingConfig::with_strategy(strategy, request.base_delay_ms),
            None => PacingConfig::for_target(target.is_remote, request.base_delay_ms),
        };
        let mode_name = request.mode.report_name();

        let span = info_span!(
            "inject",
            %run_id,
            mode = %mode_name,
            remote = target.is_remote
        );
        let _enter = span.enter();

        if target.window_class.is_empty() {
            debug!("no focused window; treating target as local");
        }
        info!(
            target_class = %target.display_class(),
            strategy = ?pacing.strategy,
            base_delay_ms = pacing.base_keystroke_delay_ms,
            chars = chars_requested,
            "injection started"
        );

        self.state = RunState::Running;
        let diagnostics = request
            .diagnostics
            .then(|| DiagnosticState::begin(run_id, mode_name, &target, chars_requested));
        let layout = self.ports.probe.keyboard_layout(&target);

        let (state, chars_sent, flushes, diagnostics) = {
            let scope = RunScope::enter(&self.ports);
            let mut run = Run {
                encoder: CharacterEncoder::new(encoding, layout.as_ref()),
                flusher: EventFlusher::new(self.ports.sink.as_ref(), self.ports.pacer.as_ref(), pacing),
                pacer: self.ports.pacer.as_ref(),
                probe: self.ports.probe.as_ref(),
                scope: &scope,
                config: pacing,
                diagnostics,
                buffer: Vec::with_capacity(16),
                chars_requested,
                chars_sent: 0,
                chars_in_buffer: 0,
                chars_since_newline: 0,
                flushes: 0,
            };
            let state = run.type_text(&text, progress);
            (state, run.chars_sent, run.flushes, run.diagnostics.take())
        };

        self.state = state;
        let report = diagnostics.map(|diag| diag.finish(chars_sent));

        match state {
            RunState::Completed => info!(chars_sent, flushes, "injection completed"),
            RunState::Aborted => info!(chars_sent, chars_requested, "injection aborted by user"),
            _ => warn!(chars_sent, chars_requested, "injection failed"),
        }

        InjectionOutcome {
            state,
            chars_sent,
            chars_requested,
            flushes,
            target,
            pacing,
            report,
        }
    }
}

/// Characters the pipeline will count: CRLF collapses to one line break.
pub fn logical_char_count(text: &str) -> usize {
    let mut count = 0;
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' && chars.peek() == Some(&'\n') {
            continue;
        }
        count += 1;
    }
    count
}

// ── Run scope ─────────────────────────────────────────────────────────────────

/// Holds the per-run resources.  Released in `Drop`, in this order: modifier
/// reset, timer resolution, then the abort observer (field drop).
struct RunScope<'a> {
    sink: &'a dyn InputSink,
    pacer: &'a dyn Pacer,
    abort: Box<dyn AbortGuard>,
}

impl<'a> RunScope<'a> {
    fn enter(ports: &'a InjectionPorts) -> Self {
        ports.pacer.begin_precise_timing();
        release_modifiers(ports.sink.as_ref());
        let abort = ports.abort.install();
        Self {
            sink: ports.sink.as_ref(),
            pacer: ports.pacer.as_ref(),
            abort,
        }
    }

    fn abort_requested(&self) -> bool {
        self.abort.is_requested()
    }
}

impl Drop for RunScope<'_> {
    fn drop(&mut self) {
        release_modifiers(self.sink);
        self.pacer.end_precise_timing();
    }
}

/// Sends key-up for both Shift, Ctrl and Alt keys in one submission.
fn release_modifiers(sink: &dyn InputSink) {
    let events = KeyInput::modifier_reset();
    let accepted = sink.submit(&events);
    if accepted < events.len() {
        debug!(accepted, "modifier reset only partially accepted");
    }
}

// ── Main loop ─────────────────────────────────────────────────────────────────

struct Run<'a> {
    encoder: CharacterEncoder<'a>,
    flusher: EventFlusher<'a>,
    pacer: &'a dyn Pacer,
    probe: &'a dyn TargetProbe,
    scope: &'a RunScope<'a>,
    config: PacingConfig,
    diagnostics: Option<DiagnosticState>,
    buffer: Vec<KeyInput>,
    chars_requested: usize,
    chars_sent: usize,
    chars_in_buffer: usize,
    chars_since_newline: usize,
    flushes: usize,
}

impl Run<'_> {
    fn type_text(&mut self, text: &str, progress: &mut dyn FnMut(usize, usize)) -> RunState {
        let mut chars = text.chars().peekable();

        while let Some(ch) = chars.next() {
            if self.buffer.is_empty() && self.scope.abort_requested() {
                self.record_error("User cancelled with Escape");
                return RunState::Aborted;
            }

            if ch == '\r' && chars.peek() == Some(&'\n') {
                continue;
            }

            if ch == '\n' || ch == '\r' {
                if let Err(err) = self.type_line_break(progress) {
                    self.record_error(err);
                    return RunState::Failed;
                }
                continue;
            }

            self.encoder.encode(ch, &mut self.buffer);
            self.chars_in_buffer += 1;
            self.chars_since_newline += 1;

            if self.chars_in_buffer >= self.config.chunk_size() {
                if let Err(err) = self.flush_chars(progress) {
                    self.record_error(format!("Event submission failed: {err}"));
                    return RunState::Failed;
                }
                self.pacer.pause(self.config.pause_after_flush(self.chars_since_newline));
                if self.config.drains_after_chunk() {
                    self.pacer.drain_input_queue();
                }
            }
        }

        if let Err(err) = self.flush_chars(progress) {
            self.record_error(format!("Event submission failed at end of text: {err}"));
            return RunState::Failed;
        }

        RunState::Completed
    }

    /// Flushes pending characters, then types a hardware Enter with a settle
    /// pause on either side.
    fn type_line_break(&mut self, progress: &mut dyn FnMut(usize, usize)) -> Result<(), String> {
        self.flush_chars(progress)
            .map_err(|err| format!("Event submission failed before line break: {err}"))?;

        self.pacer.drain_input_queue();
        self.pacer.pause(self.config.newline_settle());

        self.buffer.extend(KeyInput::enter_pair());
        self.submit_buffer()
            .map_err(|err| format!("Enter key rejected: {err}"))?;
        self.chars_sent += 1;
        self.chars_since_newline = 0;
        progress(self.chars_sent, self.chars_requested);

        self.pacer.pause(self.config.newline_settle());
        self.pacer.drain_input_queue();
        Ok(())
    }

    /// Submits buffered characters and credits them on success.
    fn flush_chars(&mut self, progress: &mut dyn FnMut(usize, usize)) -> Result<(), FlushError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.submit_buffer()?;
        self.chars_sent += self.chars_in_buffer;
        self.chars_in_buffer = 0;
        progress(self.chars_sent, self.chars_requested);
        Ok(())
    }

    /// One flush of whatever is buffered, with diagnostics bookkeeping.
    fn submit_buffer(&mut self) -> Result<usize, FlushError> {
        let attempted = self.buffer.len();
        let result = self.flusher.flush(&mut self.buffer);
        self.flushes += 1;

        if let Some(diag) = self.diagnostics.as_mut() {
            let sent = match &result {
                Ok(sent) => *sent,
                Err(err) => err.accepted,
            };
            diag.record_events(attempted, sent);
            let class = self.probe.foreground_class().unwrap_or_default();
            diag.observe_focus(&class);
        }
        result
    }

    fn record_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(%message, chars_sent = self.chars_sent, "run stopped early");
        if let Some(diag) = self.diagnostics.as_mut() {
            diag.record_error(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::application::ports::{AbortMonitor, MockTargetProbe};
    use typewire_core::domain::event::MODIFIER_KEYS;
    use typewire_core::keymap::UsQwertyLayout;
    use typewire_core::KeyboardLayout;

    // ── Test doubles ──────────────────────────────────────────────────────────

    /// Accepts everything until `reject_after` submissions, then nothing.
    struct CountingSink {
        submissions: Mutex<Vec<Vec<KeyInput>>>,
        reject_after: Option<usize>,
    }

    impl CountingSink {
        fn accepting() -> Self {
            Self { submissions: Mutex::default(), reject_after: None }
        }

        fn rejecting_after(n: usize) -> Self {
            Self { submissions: Mutex::default(), reject_after: Some(n) }
        }

        fn all(&self) -> Vec<Vec<KeyInput>> {
            self.submissions.lock().unwrap().clone()
        }
    }

    impl InputSink for CountingSink {
        fn submit(&self, events: &[KeyInput]) -> usize {
            let mut subs = self.submissions.lock().unwrap();
            subs.push(events.to_vec());
            match self.reject_after {
                Some(limit) if subs.len() > limit => 0,
                _ => events.len(),
            }
        }
    }

    #[derive(Default)]
    struct NullPacer {
        timing_depth: AtomicUsize,
    }

    impl Pacer for NullPacer {
        fn pause(&self, _duration: Duration) {}
        fn drain_input_queue(&self) {}
        fn begin_precise_timing(&self) {
            self.timing_depth.fetch_add(1, Ordering::SeqCst);
        }
        fn end_precise_timing(&self) {
            self.timing_depth.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Abort flag the test can flip after N checks.
    struct AbortAfter {
        checks_before_abort: usize,
        checks: Arc<AtomicUsize>,
        installed: Arc<AtomicBool>,
    }

    struct AbortAfterGuard {
        checks_before_abort: usize,
        checks: Arc<AtomicUsize>,
        installed: Arc<AtomicBool>,
    }

    impl AbortMonitor for AbortAfter {
        fn install(&self) -> Box<dyn AbortGuard> {
            self.installed.store(true, Ordering::SeqCst);
            Box::new(AbortAfterGuard {
                checks_before_abort: self.checks_before_abort,
                checks: Arc::clone(&self.checks),
                installed: Arc::clone(&self.installed),
            })
        }
    }

    impl AbortGuard for AbortAfterGuard {
        fn is_requested(&self) -> bool {
            self.checks.fetch_add(1, Ordering::SeqCst) >= self.checks_before_abort
        }
    }

    impl Drop for AbortAfterGuard {
        fn drop(&mut self) {
            self.installed.store(false, Ordering::SeqCst);
        }
    }

    fn never_abort() -> Arc<AbortAfter> {
        Arc::new(AbortAfter {
            checks_before_abort: usize::MAX,
            checks: Arc::default(),
            installed: Arc::default(),
        })
    }

    fn probe_for(class: &'static str) -> MockTargetProbe {
        let mut probe = MockTargetProbe::new();
        probe
            .expect_classify()
            .returning(move || RemoteClientInfo::classify(class, 1, 2, Default::default()));
        probe
            .expect_foreground_class()
            .returning(move || Some(class.to_string()));
        probe
            .expect_keyboard_layout()
            .returning(|_| Arc::new(UsQwertyLayout) as Arc<dyn KeyboardLayout>);
        probe
    }

    fn ports(sink: Arc<CountingSink>, probe: MockTargetProbe, abort: Arc<AbortAfter>) -> InjectionPorts {
        InjectionPorts {
            sink,
            pacer: Arc::new(NullPacer::default()),
            probe: Arc::new(probe),
            abort,
        }
    }

    fn is_modifier_reset(events: &[KeyInput]) -> bool {
        events.len() == MODIFIER_KEYS.len()
            && events
                .iter()
                .zip(MODIFIER_KEYS)
                .all(|(e, vk)| *e == KeyInput::Virtual { vk, key_up: true })
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_logical_char_count_collapses_crlf_only() {
        assert_eq!(logical_char_count("a\r\nb"), 3);
        assert_eq!(logical_char_count("a\rb"), 3);
        assert_eq!(logical_char_count("a\n\rb"), 4);
        assert_eq!(logical_char_count(""), 0);
    }

    #[test]
    fn test_run_is_bracketed_by_modifier_resets() {
        // Arrange
        let sink = Arc::new(CountingSink::accepting());
        let mut use_case = InjectTextUseCase::new(ports(Arc::clone(&sink), probe_for("Notepad"), never_abort()));

        // Act
        let outcome = use_case.send_text(&InjectionRequest::new("hi", InjectionMode::Unicode), &mut |_, _| {});

        // Assert
        let subs = sink.all();
        assert!(is_modifier_reset(subs.first().unwrap()));
        assert!(is_modifier_reset(subs.last().unwrap()));
        assert_eq!(outcome.state, RunState::Completed);
        assert_eq!(use_case.state(), RunState::Completed);
    }

    #[test]
    fn test_use_case_starts_idle() {
        let sink = Arc::new(CountingSink::accepting());
        let use_case = InjectTextUseCase::new(ports(sink, probe_for("Notepad"), never_abort()));
        assert_eq!(use_case.state(), RunState::Idle);
    }

    #[test]
    fn test_local_target_uses_burst_and_remote_uses_per_character() {
        for (class, expected) in [
            ("Notepad", PacingStrategy::Burst),
            ("TscShellContainerClass", PacingStrategy::PerCharacter),
        ] {
            let sink = Arc::new(CountingSink::accepting());
            let mut use_case = InjectTextUseCase::new(ports(sink, probe_for(class), never_abort()));

            let outcome = use_case.send_text(&InjectionRequest::new("x", InjectionMode::Auto), &mut |_, _| {});

            assert_eq!(outcome.pacing.strategy, expected, "{class}");
        }
    }

    #[test]
    fn test_explicit_pacing_overrides_target_choice() {
        let sink = Arc::new(CountingSink::accepting());
        let mut use_case = InjectTextUseCase::new(ports(sink, probe_for("Notepad"), never_abort()));
        let request = InjectionRequest::new("x", InjectionMode::Auto).with_pacing(PacingStrategy::PerEvent);

        let outcome = use_case.send_text(&request, &mut |_, _| {});

        assert_eq!(outcome.pacing.strategy, PacingStrategy::PerEvent);
    }

    #[test]
    fn test_progress_is_monotonic_and_ends_at_total() {
        let sink = Arc::new(CountingSink::accepting());
        let mut use_case = InjectTextUseCase::new(ports(sink, probe_for("Notepad"), never_abort()));
        let mut seen = Vec::new();

        use_case.send_text(
            &InjectionRequest::new("abc\r\ndefg", InjectionMode::Unicode),
            &mut |sent, total| seen.push((sent, total)),
        );

        assert!(seen.windows(2).all(|w| w[0].0 <= w[1].0));
        assert_eq!(seen.last(), Some(&(8, 8)));
    }

    #[test]
    fn test_abort_before_first_character_sends_nothing() {
        // Arrange
        let sink = Arc::new(CountingSink::accepting());
        let abort = Arc::new(AbortAfter {
            checks_before_abort: 0,
            checks: Arc::default(),
            installed: Arc::default(),
        });
        let installed = Arc::clone(&abort.installed);
        let mut use_case = InjectTextUseCase::new(ports(Arc::clone(&sink), probe_for("Notepad"), abort));
        let request = InjectionRequest::new("hello", InjectionMode::Unicode).with_diagnostics(true);

        // Act
        let outcome = use_case.send_text(&request, &mut |_, _| {});

        // Assert
        assert_eq!(outcome.state, RunState::Aborted);
        assert_eq!(outcome.chars_sent, 0);
        assert_eq!(sink.all().len(), 2, "only the two modifier resets");
        assert!(!installed.load(Ordering::SeqCst), "observer removed after run");
        let report = outcome.report.unwrap();
        assert!(report.errors().iter().any(|e| e.contains("Escape")));
    }

    #[test]
    fn test_rejecting_queue_fails_with_partial_count() {
        // Modifier reset + first burst chunk accepted, then nothing.
        let sink = Arc::new(CountingSink::rejecting_after(2));
        let mut use_case = InjectTextUseCase::new(ports(sink, probe_for("Notepad"), never_abort()));
        let request = InjectionRequest::new("abcdef", InjectionMode::Unicode).with_diagnostics(true);

        let outcome = use_case.send_text(&request, &mut |_, _| {});

        assert_eq!(outcome.state, RunState::Failed);
        assert_eq!(outcome.chars_sent, 2);
        let report = outcome.report.unwrap();
        assert!(!report.is_complete());
        assert!(report.errors().iter().any(|e| e.contains("Event submission failed")));
    }

    #[test]
    fn test_precise_timing_is_released_after_run() {
        let sink = Arc::new(CountingSink::rejecting_after(1));
        let pacer = Arc::new(NullPacer::default());
        let mut use_case = InjectTextUseCase::new(InjectionPorts {
            sink,
            pacer: Arc::clone(&pacer) as Arc<dyn Pacer>,
            probe: Arc::new(probe_for("Notepad")),
            abort: never_abort(),
        });

        use_case.send_text(&InjectionRequest::new("abc", InjectionMode::Unicode), &mut |_, _| {});

        assert_eq!(pacer.timing_depth.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_focus_change_is_recorded_in_report() {
        // Arrange: focus moves to another window after the first flush.
        let mut probe = MockTargetProbe::new();
        probe
            .expect_classify()
            .returning(|| RemoteClientInfo::classify("Notepad", 1, 2, Default::default()));
        probe
            .expect_keyboard_layout()
            .returning(|_| Arc::new(UsQwertyLayout) as Arc<dyn KeyboardLayout>);
        let mut calls = 0;
        probe.expect_foreground_class().returning(move || {
            calls += 1;
            Some(if calls == 1 { "Notepad" } else { "Chrome_WidgetWin_1" }.to_string())
        });
        let sink = Arc::new(CountingSink::accepting());
        let mut use_case = InjectTextUseCase::new(ports(sink, probe, never_abort()));
        let request = InjectionRequest::new("abcd", InjectionMode::Unicode).with_diagnostics(true);

        // Act
        let outcome = use_case.send_text(&request, &mut |_, _| {});

        // Assert
        let report = outcome.report.unwrap();
        assert_eq!(report.focus_changes().len(), 1);
        assert_eq!(report.focus_changes()[0].window_class, "Chrome_WidgetWin_1");
    }

    #[test]
    fn test_no_report_without_diagnostics() {
        let sink = Arc::new(CountingSink::accepting());
        let mut use_case = InjectTextUseCase::new(ports(sink, probe_for("Notepad"), never_abort()));

        let outcome = use_case.send_text(&InjectionRequest::new("ok", InjectionMode::Hybrid), &mut |_, _| {});

        assert!(outcome.report.is_none());
    }

    #[test]
    fn test_empty_text_completes_with_zero_characters() {
        let sink = Arc::new(CountingSink::accepting());
        let mut use_case = InjectTextUseCase::new(ports(Arc::clone(&sink), probe_for("Notepad"), never_abort()));

        let outcome = use_case.send_text(&InjectionRequest::new("", InjectionMode::Auto), &mut |_, _| {});

        assert_eq!(outcome.state, RunState::Completed);
        assert_eq!((outcome.chars_sent, outcome.chars_requested, outcome.flushes), (0, 0, 0));
        assert_eq!(sink.all().len(), 2);
    }
}
