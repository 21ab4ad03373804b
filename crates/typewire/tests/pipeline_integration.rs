//! Integration tests for the injection pipeline.
//!
//! These tests wire `InjectTextUseCase` to the in-memory adapters from
//! `infrastructure::*::mock` and check end-to-end behaviour: which events
//! reach the sink, how pacing is chosen, and how abort and rejection end a
//! run.  Nothing here touches the OS or sleeps.

use std::sync::Arc;
use std::time::Duration;

use typewire::application::{InjectTextUseCase, InjectionOutcome, InjectionPorts, InjectionRequest, RunState};
use typewire::infrastructure::abort_monitor::mock::MockAbortMonitor;
use typewire::infrastructure::input_injection::mock::{RecordingPacer, RecordingSink, SinkBehaviour};
use typewire::infrastructure::target_probe::mock::ScriptedTargetProbe;
use typewire_core::domain::event::MODIFIER_KEYS;
use typewire_core::{InjectionMode, KeyInput, PacingStrategy};

// ── Harness ───────────────────────────────────────────────────────────────────

const LOCAL: &str = "Notepad";
const REMOTE: &str = "TscShellContainerClass";

struct Harness {
    sink: Arc<RecordingSink>,
    pacer: Arc<RecordingPacer>,
    probe: Arc<ScriptedTargetProbe>,
    abort: Arc<MockAbortMonitor>,
}

impl Harness {
    fn new(window_class: &str) -> Self {
        Self::with(
            RecordingSink::new(),
            ScriptedTargetProbe::focused(window_class),
            MockAbortMonitor::new(),
        )
    }

    fn with(sink: RecordingSink, probe: ScriptedTargetProbe, abort: MockAbortMonitor) -> Self {
        Self {
            sink: Arc::new(sink),
            pacer: Arc::new(RecordingPacer::new()),
            probe: Arc::new(probe),
            abort: Arc::new(abort),
        }
    }

    fn ports(&self) -> InjectionPorts {
        InjectionPorts {
            sink: Arc::clone(&self.sink) as _,
            pacer: Arc::clone(&self.pacer) as _,
            probe: Arc::clone(&self.probe) as _,
            abort: Arc::clone(&self.abort) as _,
        }
    }

    fn run(&self, request: InjectionRequest) -> InjectionOutcome {
        InjectTextUseCase::new(self.ports()).send_text(&request, &mut |_, _| {})
    }

    /// Accepted events with the bracketing modifier resets stripped off.
    fn typed_events(&self) -> Vec<KeyInput> {
        let events = self.sink.accepted_events();
        let reset = MODIFIER_KEYS.len();
        assert!(events.len() >= 2 * reset, "both modifier resets must be accepted");
        events[reset..events.len() - reset].to_vec()
    }
}

fn is_modifier_reset(events: &[KeyInput]) -> bool {
    events == KeyInput::modifier_reset()
}

// ── Encoding end to end ───────────────────────────────────────────────────────

#[test]
fn test_unicode_mode_emits_two_events_per_character() {
    // Arrange
    let h = Harness::new(REMOTE);

    // Act
    let outcome = h.run(InjectionRequest::new("héllo", InjectionMode::Unicode));

    // Assert
    assert_eq!(outcome.state, RunState::Completed);
    let typed = h.typed_events();
    assert_eq!(typed.len(), 10);
    assert!(typed.iter().all(|e| matches!(e, KeyInput::Unicode { .. })));
}

#[test]
fn test_vk_mode_leaves_no_modifier_held() {
    let h = Harness::new(REMOTE);

    let outcome = h.run(InjectionRequest::new("Hello, World! (100%)", InjectionMode::VkScancode));

    assert_eq!(outcome.state, RunState::Completed);
    assert!(h.sink.held_keys().is_empty(), "held: {:?}", h.sink.held_keys());
    let typed = h.typed_events();
    assert!(typed.iter().all(|e| matches!(e, KeyInput::Scancode { .. })));
}

#[test]
fn test_hybrid_types_unmappable_symbol_as_unicode_pair() {
    let h = Harness::new(REMOTE);

    h.run(InjectionRequest::new("€", InjectionMode::Hybrid));

    assert_eq!(h.typed_events(), KeyInput::unicode_pair(0x20AC).to_vec());
}

#[test]
fn test_supplementary_character_is_two_unicode_pairs_in_vk_mode() {
    let h = Harness::new(LOCAL);

    let outcome = h.run(InjectionRequest::new("🦀", InjectionMode::VkScancode));

    assert_eq!(outcome.chars_sent, 1);
    let typed = h.typed_events();
    assert_eq!(typed.len(), 4);
    assert!(typed.iter().all(|e| matches!(e, KeyInput::Unicode { .. })));
}

#[test]
fn test_typographic_quotes_are_typed_as_ascii() {
    let h = Harness::new(LOCAL);

    h.run(InjectionRequest::new("\u{201C}ok\u{201D}", InjectionMode::Unicode));

    let units: Vec<u16> = h
        .typed_events()
        .iter()
        .filter_map(|e| match *e {
            KeyInput::Unicode { unit, key_up: false } => Some(unit),
            _ => None,
        })
        .collect();
    assert_eq!(String::from_utf16_lossy(&units), "\"ok\"");
}

// ── Line breaks ───────────────────────────────────────────────────────────────

#[test]
fn test_two_lines_count_eleven_characters() {
    // Arrange
    let h = Harness::new(LOCAL);

    // Act
    let outcome = h.run(InjectionRequest::new("line1\nline2", InjectionMode::Unicode));

    // Assert
    assert_eq!(outcome.state, RunState::Completed);
    assert_eq!((outcome.chars_sent, outcome.chars_requested), (11, 11));
    let unicode = |s: &str| -> Vec<KeyInput> {
        s.chars().flat_map(|c| KeyInput::unicode_pair(c as u16)).collect()
    };
    let mut expected = unicode("line1");
    expected.extend(KeyInput::enter_pair());
    expected.extend(unicode("line2"));
    assert_eq!(h.typed_events(), expected);
}

#[test]
fn test_crlf_and_lf_produce_identical_events() {
    let crlf = Harness::new(LOCAL);
    let lf = Harness::new(LOCAL);

    let a = crlf.run(InjectionRequest::new("ab\r\ncd\r\n", InjectionMode::Hybrid));
    let b = lf.run(InjectionRequest::new("ab\ncd\n", InjectionMode::Hybrid));

    assert_eq!(crlf.sink.accepted_events(), lf.sink.accepted_events());
    assert_eq!(a.chars_requested, 6);
    assert_eq!(a.chars_sent, b.chars_sent);
}

#[test]
fn test_lone_carriage_return_is_a_line_break() {
    let h = Harness::new(LOCAL);

    let outcome = h.run(InjectionRequest::new("a\rb", InjectionMode::Unicode));

    assert_eq!(outcome.chars_sent, 3);
    assert!(h.typed_events().windows(2).any(|w| w == KeyInput::enter_pair()));
}

#[test]
fn test_remote_hybrid_flushes_once_per_character_plus_enter() {
    let h = Harness::new(REMOTE);

    let outcome = h.run(InjectionRequest::new("line1\nline2", InjectionMode::Hybrid));

    assert_eq!(outcome.pacing.strategy, PacingStrategy::PerCharacter);
    assert_eq!(outcome.flushes, 11);
}

// ── Pacing ────────────────────────────────────────────────────────────────────

#[test]
fn test_pacing_follows_target_classification() {
    let local = Harness::new(LOCAL).run(InjectionRequest::new("x", InjectionMode::Auto));
    let remote = Harness::new("ICAClientClass").run(InjectionRequest::new("x", InjectionMode::Auto));
    let unfocused = Harness::with(
        RecordingSink::new(),
        ScriptedTargetProbe::unfocused(),
        MockAbortMonitor::new(),
    )
    .run(InjectionRequest::new("x", InjectionMode::Auto));

    assert_eq!(local.pacing.strategy, PacingStrategy::Burst);
    assert_eq!(remote.pacing.strategy, PacingStrategy::PerCharacter);
    assert_eq!(unfocused.pacing.strategy, PacingStrategy::Burst);
    assert_eq!(unfocused.state, RunState::Completed);
}

#[test]
fn test_remote_pauses_include_base_delay_and_line_start_guard() {
    // Arrange
    let h = Harness::new(REMOTE);

    // Act
    h.run(InjectionRequest::new("ab", InjectionMode::Unicode).with_base_delay(3));

    // Assert: 3 base + 5 per-character + 10 line-start guard, twice.
    assert_eq!(h.pacer.pauses(), vec![Duration::from_millis(18); 2]);
}

#[test]
fn test_base_delay_is_clamped_to_one_hundred_ms() {
    let h = Harness::new(LOCAL);

    let outcome = h.run(InjectionRequest::new("a", InjectionMode::Unicode).with_base_delay(5_000));

    assert_eq!(outcome.pacing.base_keystroke_delay_ms, 100);
}

#[test]
fn test_burst_drains_queue_after_each_chunk() {
    let h = Harness::new(LOCAL);

    h.run(InjectionRequest::new("abcdef", InjectionMode::Unicode));

    assert_eq!(h.pacer.drains(), 3);
}

#[test]
fn test_precise_timing_is_balanced() {
    let h = Harness::with(
        RecordingSink::with_behaviour(SinkBehaviour::RejectAll),
        ScriptedTargetProbe::focused(LOCAL),
        MockAbortMonitor::new(),
    );

    h.run(InjectionRequest::new("abc", InjectionMode::Unicode));

    assert_eq!(h.pacer.timing_requests(), 1);
    assert_eq!(h.pacer.timing_depth(), 0);
}

// ── Abort ─────────────────────────────────────────────────────────────────────

#[test]
fn test_abort_stops_at_chunk_boundary_and_releases_modifiers() {
    // Arrange: polls happen before 'a', 'c' and 'e'; the third one aborts.
    let h = Harness::with(
        RecordingSink::new(),
        ScriptedTargetProbe::focused(LOCAL),
        MockAbortMonitor::abort_after_polls(2),
    );

    // Act
    let outcome = h.run(InjectionRequest::new("abcdefgh", InjectionMode::Hybrid).with_diagnostics(true));

    // Assert
    assert_eq!(outcome.state, RunState::Aborted);
    assert_eq!(outcome.chars_sent, 4);
    let submissions = h.sink.submissions();
    assert!(is_modifier_reset(submissions.last().unwrap()));
    assert!(h.sink.held_keys().is_empty());
    assert_eq!((h.abort.installs(), h.abort.removals()), (1, 1));
    let report = outcome.report.unwrap();
    assert!(!report.is_complete());
    assert!(report.errors().iter().any(|e| e.contains("Escape")));
}

#[test]
fn test_each_run_installs_a_fresh_abort_observer() {
    let h = Harness::new(LOCAL);
    let mut use_case = InjectTextUseCase::new(h.ports());

    use_case.send_text(&InjectionRequest::new("a", InjectionMode::Auto), &mut |_, _| {});
    use_case.send_text(&InjectionRequest::new("b", InjectionMode::Auto), &mut |_, _| {});

    assert_eq!((h.abort.installs(), h.abort.removals()), (2, 2));
    assert!(!h.abort.is_installed());
}

// ── Rejection ─────────────────────────────────────────────────────────────────

#[test]
fn test_rejecting_queue_fails_after_exactly_three_attempts() {
    // Arrange
    let h = Harness::with(
        RecordingSink::with_behaviour(SinkBehaviour::RejectAll),
        ScriptedTargetProbe::focused(LOCAL),
        MockAbortMonitor::new(),
    );

    // Act
    let outcome = h.run(InjectionRequest::new("abc", InjectionMode::Unicode).with_diagnostics(true));

    // Assert
    assert_eq!(outcome.state, RunState::Failed);
    assert_eq!(outcome.chars_sent, 0);
    let chunk_attempts = h
        .sink
        .submissions()
        .iter()
        .filter(|s| !is_modifier_reset(s))
        .count();
    assert_eq!(chunk_attempts, 3);
    let report = outcome.report.unwrap();
    assert_eq!(report.events_sent(), 0);
    assert_eq!(report.events_failed(), 4);
}

#[test]
fn test_partial_acceptance_still_completes() {
    let h = Harness::with(
        RecordingSink::with_behaviour(SinkBehaviour::AcceptAtMost(1)),
        ScriptedTargetProbe::focused(LOCAL),
        MockAbortMonitor::new(),
    );

    let outcome = h.run(InjectionRequest::new("abcd", InjectionMode::Unicode));

    assert_eq!(outcome.state, RunState::Completed);
    assert_eq!(outcome.chars_sent, 4);
}

#[test]
fn test_queue_rejecting_midway_reports_partial_progress() {
    // Reset + two paced events accepted, then the queue closes.
    let h = Harness::with(
        RecordingSink::with_behaviour(SinkBehaviour::RejectAfter(3)),
        ScriptedTargetProbe::focused(REMOTE),
        MockAbortMonitor::new(),
    );

    let outcome = h.run(InjectionRequest::new("abc", InjectionMode::Unicode));

    assert_eq!(outcome.state, RunState::Failed);
    assert_eq!(outcome.chars_sent, 1);
    assert!(outcome.chars_sent < outcome.chars_requested);
}

// ── Diagnostics ───────────────────────────────────────────────────────────────

#[test]
fn test_report_counts_every_attempted_event() {
    let h = Harness::new(REMOTE);

    let outcome = h.run(InjectionRequest::new("ab\nc", InjectionMode::Unicode).with_diagnostics(true));

    let report = outcome.report.unwrap();
    assert!(report.is_complete());
    // Three characters and one Enter, two events each.
    assert_eq!(report.events_attempted(), 8);
    assert_eq!(report.events_sent(), 8);
    assert!(report.errors().is_empty());
}

#[test]
fn test_focus_changes_are_recorded_in_order() {
    let probe = ScriptedTargetProbe::focused(LOCAL).with_focus_sequence([LOCAL, "Chrome_WidgetWin_1", LOCAL]);
    let h = Harness::with(RecordingSink::new(), probe, MockAbortMonitor::new());

    let outcome = h.run(InjectionRequest::new("abcdef", InjectionMode::Unicode).with_diagnostics(true));

    let report = outcome.report.unwrap();
    let classes: Vec<&str> = report.focus_changes().iter().map(|f| f.window_class.as_str()).collect();
    assert_eq!(classes, vec!["Chrome_WidgetWin_1", LOCAL]);
    assert_eq!(h.probe.focus_queries(), 3);
}

#[test]
fn test_dialog_report_names_auto_mode_resolution() {
    let h = Harness::new(REMOTE);

    let outcome = h.run(InjectionRequest::new("hi", InjectionMode::Auto).with_diagnostics(true));

    let text = outcome.report.unwrap().render(typewire_core::ReportStyle::Dialog);
    assert!(text.contains("Auto → Hybrid"));
    assert!(text.contains(REMOTE));
}

#[test]
fn test_progress_reaches_total_on_completion() {
    let h = Harness::new(LOCAL);
    let mut last = (0, 0);

    let outcome = InjectTextUseCase::new(h.ports()).send_text(
        &InjectionRequest::new("one\ntwo", InjectionMode::Unicode),
        &mut |sent, total| last = (sent, total),
    );

    assert_eq!(last, (7, 7));
    assert_eq!(outcome.chars_sent, outcome.chars_requested);
}
