//! Mock sink and pacer for tests.
//!
//! # Why mocks?
//!
//! The real adapters press keys on the test machine and sleep for real.  The
//! mocks record every submission and every pause in memory instead, so a test
//! can type a whole document in microseconds and then assert exactly which
//! events reached the "OS" and in what order.
//!
//! [`RecordingSink`] also tracks which keys are currently held down, so a test
//! can check that a run never leaves Shift or another modifier stuck.
//!
//! # Usage in tests
//!
//! ```ignore
//! let sink = Arc::new(RecordingSink::new());
//! let pacer = Arc::new(RecordingPacer::new());
//! // ... build InjectionPorts and run send_text ...
//! assert!(sink.held_keys().is_empty());
//! assert_eq!(pacer.timing_depth(), 0);
//! ```

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use typewire_core::domain::event::{VK_LSHIFT, VK_RSHIFT, VK_SHIFT};
use typewire_core::KeyInput;

use crate::application::ports::{InputSink, Pacer};

// ── Sink ──────────────────────────────────────────────────────────────────────

/// How a [`RecordingSink`] answers submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkBehaviour {
    /// Accept every event.
    #[default]
    AcceptAll,
    /// Accept nothing, ever.
    RejectAll,
    /// Accept the first `n` submissions in full, then reject everything.
    RejectAfter(usize),
    /// Accept at most `n` events per submission.
    AcceptAtMost(usize),
}

/// [`InputSink`] that records submissions without touching the OS.
#[derive(Debug, Default)]
pub struct RecordingSink {
    behaviour: SinkBehaviour,
    /// Every call to `submit`, accepted or not, in order.
    submissions: Mutex<Vec<Vec<KeyInput>>>,
    /// Events the sink accepted, flattened, in order.
    accepted: Mutex<Vec<KeyInput>>,
    /// Virtual-key codes currently held down.
    held: Mutex<BTreeSet<u16>>,
}

impl RecordingSink {
    /// A sink that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behaviour(behaviour: SinkBehaviour) -> Self {
        Self { behaviour, ..Self::default() }
    }

    pub fn submissions(&self) -> Vec<Vec<KeyInput>> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn submit_calls(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    pub fn accepted_events(&self) -> Vec<KeyInput> {
        self.accepted.lock().unwrap().clone()
    }

    /// Keys pressed and not yet released, as virtual-key codes.
    ///
    /// Unicode events are not tracked: they do not change modifier state.
    pub fn held_keys(&self) -> Vec<u16> {
        self.held.lock().unwrap().iter().copied().collect()
    }

    fn answer(&self, call_index: usize, len: usize) -> usize {
        match self.behaviour {
            SinkBehaviour::AcceptAll => len,
            SinkBehaviour::RejectAll => 0,
            SinkBehaviour::RejectAfter(n) if call_index < n => len,
            SinkBehaviour::RejectAfter(_) => 0,
            SinkBehaviour::AcceptAtMost(n) => len.min(n),
        }
    }

    fn track(&self, events: &[KeyInput]) {
        let mut held = self.held.lock().unwrap();
        for event in events {
            let vk = match *event {
                KeyInput::Scancode { vk, .. } | KeyInput::Virtual { vk, .. } => vk,
                KeyInput::Unicode { .. } => continue,
            };
            if event.is_key_up() {
                held.remove(&vk);
                // Releasing either side also releases the generic Shift.
                if vk == VK_LSHIFT || vk == VK_RSHIFT {
                    held.remove(&VK_SHIFT);
                }
            } else {
                held.insert(vk);
            }
        }
    }
}

impl InputSink for RecordingSink {
    fn submit(&self, events: &[KeyInput]) -> usize {
        let call_index = {
            let mut subs = self.submissions.lock().unwrap();
            subs.push(events.to_vec());
            subs.len() - 1
        };
        let accepted = self.answer(call_index, events.len());
        self.track(&events[..accepted]);
        self.accepted.lock().unwrap().extend_from_slice(&events[..accepted]);
        accepted
    }
}

// ── Pacer ─────────────────────────────────────────────────────────────────────

/// [`Pacer`] that records requested pauses instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingPacer {
    pauses: Mutex<Vec<Duration>>,
    drains: AtomicUsize,
    timing_depth: AtomicI32,
    timing_requests: AtomicUsize,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }

    /// Sum of every requested pause.
    pub fn total_paused(&self) -> Duration {
        self.pauses.lock().unwrap().iter().sum()
    }

    pub fn drains(&self) -> usize {
        self.drains.load(Ordering::SeqCst)
    }

    /// Outstanding precise-timing requests; 0 when balanced.
    pub fn timing_depth(&self) -> i32 {
        self.timing_depth.load(Ordering::SeqCst)
    }

    pub fn timing_requests(&self) -> usize {
        self.timing_requests.load(Ordering::SeqCst)
    }
}

impl Pacer for RecordingPacer {
    fn pause(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }

    fn drain_input_queue(&self) {
        self.drains.fetch_add(1, Ordering::SeqCst);
    }

    fn begin_precise_timing(&self) {
        self.timing_requests.fetch_add(1, Ordering::SeqCst);
        self.timing_depth.fetch_add(1, Ordering::SeqCst);
    }

    fn end_precise_timing(&self) {
        self.timing_depth.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_tracks_shift_press_and_release() {
        let sink = RecordingSink::new();

        sink.submit(&[KeyInput::Scancode { vk: VK_SHIFT, scan: 0x2A, key_up: false }]);
        assert_eq!(sink.held_keys(), vec![VK_SHIFT]);

        sink.submit(&KeyInput::modifier_reset());
        assert!(sink.held_keys().is_empty());
    }

    #[test]
    fn test_sink_ignores_unicode_for_held_state() {
        let sink = RecordingSink::new();
        sink.submit(&[KeyInput::Unicode { unit: 0x41, key_up: false }]);
        assert!(sink.held_keys().is_empty());
    }

    #[test]
    fn test_reject_after_accepts_first_n_submissions() {
        let sink = RecordingSink::with_behaviour(SinkBehaviour::RejectAfter(1));
        let pair = KeyInput::unicode_pair(0x41);

        assert_eq!(sink.submit(&pair), 2);
        assert_eq!(sink.submit(&pair), 0);
        assert_eq!(sink.submit_calls(), 2);
        assert_eq!(sink.accepted_events().len(), 2);
    }

    #[test]
    fn test_accept_at_most_caps_each_submission() {
        let sink = RecordingSink::with_behaviour(SinkBehaviour::AcceptAtMost(1));
        assert_eq!(sink.submit(&KeyInput::unicode_pair(0x41)), 1);
    }

    #[test]
    fn test_pacer_records_without_sleeping() {
        let pacer = RecordingPacer::new();

        pacer.begin_precise_timing();
        pacer.pause(Duration::from_secs(3600));
        pacer.drain_input_queue();
        pacer.end_precise_timing();

        assert_eq!(pacer.total_paused(), Duration::from_secs(3600));
        assert_eq!(pacer.drains(), 1);
        assert_eq!(pacer.timing_depth(), 0);
        assert_eq!(pacer.timing_requests(), 1);
    }
}
