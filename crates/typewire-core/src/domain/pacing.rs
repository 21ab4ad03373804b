//! Pacing policy: how fast to feed events to the target.
//!
//! # Why pacing matters (for beginners)
//!
//! `SendInput` happily accepts thousands of events per millisecond.  The
//! target application does not: a local editor that re-highlights a line on
//! every keystroke, or an RDP client that forwards each event over the
//! network, will drop or reorder characters when flooded.
//!
//! The policy picks one [`PacingStrategy`] per run from the target
//! classification and derives every delay from it plus the user's baseline:
//!
//! | Strategy       | Chunk size | Pause after flush            | Chosen for |
//! |----------------|------------|------------------------------|------------|
//! | `Burst`        | 2 chars    | base + 25 ms, then drain     | local      |
//! | `PerCharacter` | 1 char     | base + 5 ms                  | remote     |
//! | `PerEvent`     | 1 char     | base, plus 2 ms after events | (manual)   |
//!
//! Characters shortly after a line break get an extra line-start guard.

use std::time::Duration;

/// Characters per flush under [`PacingStrategy::Burst`].
pub const BURST_CHUNK_SIZE: usize = 2;
/// Pause after each Burst chunk, on top of the baseline.
pub const INTER_CHUNK_PAUSE_MS: u32 = 25;
/// Total settle time around a line break, split evenly before and after Enter.
pub const NEWLINE_PAUSE_MS: u32 = 100;
/// Delay after every accepted event under [`PacingStrategy::PerEvent`].
pub const PER_EVENT_DELAY_MS: u32 = 2;
/// Delay after every character under [`PacingStrategy::PerCharacter`].
pub const PER_CHAR_DELAY_MS: u32 = 5;
/// Number of characters after a line break that receive the guard delay.
pub const LINE_START_GUARD_CHARS: usize = 3;
/// Guard delay added for each of those characters.
pub const LINE_START_GUARD_MS: u32 = 10;
/// Upper bound of the user-configurable keystroke baseline.
pub const MAX_BASE_DELAY_MS: u32 = 100;

/// How events are grouped and spaced during one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacingStrategy {
    /// Batch several characters per submission; pause only between batches.
    Burst,
    /// Submit every character on its own and pause after each.
    PerCharacter,
    /// Like `PerCharacter`, and additionally pause after every single event.
    PerEvent,
}

impl PacingStrategy {
    /// Whether the flusher submits events one at a time.
    pub fn is_paced(self) -> bool {
        !matches!(self, PacingStrategy::Burst)
    }
}

/// Immutable pacing parameters for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    pub strategy: PacingStrategy,
    pub per_event_delay_ms: u32,
    pub per_char_delay_ms: u32,
    pub line_start_guard_chars: usize,
    pub line_start_guard_ms: u32,
    /// User baseline, already clamped to `0..=MAX_BASE_DELAY_MS`.
    pub base_keystroke_delay_ms: u32,
}

impl PacingConfig {
    /// Builds the default config for a target.
    ///
    /// Remote clients get [`PacingStrategy::PerCharacter`], local windows get
    /// [`PacingStrategy::Burst`].
    pub fn for_target(is_remote: bool, base_keystroke_delay_ms: u32) -> Self {
        let strategy = if is_remote {
            PacingStrategy::PerCharacter
        } else {
            PacingStrategy::Burst
        };
        Self::with_strategy(strategy, base_keystroke_delay_ms)
    }

    /// Builds a config with an explicit strategy and the default constants.
    pub fn with_strategy(strategy: PacingStrategy, base_keystroke_delay_ms: u32) -> Self {
        Self {
            strategy,
            per_event_delay_ms: PER_EVENT_DELAY_MS,
            per_char_delay_ms: PER_CHAR_DELAY_MS,
            line_start_guard_chars: LINE_START_GUARD_CHARS,
            line_start_guard_ms: LINE_START_GUARD_MS,
            base_keystroke_delay_ms: base_keystroke_delay_ms.min(MAX_BASE_DELAY_MS),
        }
    }

    /// Number of buffered characters that triggers a flush.
    pub fn chunk_size(&self) -> usize {
        match self.strategy {
            PacingStrategy::Burst => BURST_CHUNK_SIZE,
            PacingStrategy::PerCharacter | PacingStrategy::PerEvent => 1,
        }
    }

    /// Delay after each accepted event during a paced flush, if any.
    pub fn per_event_delay(&self) -> Option<Duration> {
        (self.strategy == PacingStrategy::PerEvent && self.per_event_delay_ms > 0)
            .then(|| ms(self.per_event_delay_ms))
    }

    /// Pause after a character flush.
    ///
    /// `chars_since_newline` counts characters typed on the current line,
    /// including the ones just flushed.
    pub fn pause_after_flush(&self, chars_since_newline: usize) -> Duration {
        let mut pause = self.base_keystroke_delay_ms;
        pause += match self.strategy {
            PacingStrategy::Burst => INTER_CHUNK_PAUSE_MS,
            PacingStrategy::PerCharacter => self.per_char_delay_ms,
            PacingStrategy::PerEvent => 0,
        };
        if chars_since_newline <= self.line_start_guard_chars {
            pause += self.line_start_guard_ms;
        }
        ms(pause)
    }

    /// Settle time before and again after a hardware Enter.
    pub fn newline_settle(&self) -> Duration {
        ms(self.base_keystroke_delay_ms + NEWLINE_PAUSE_MS / 2)
    }

    /// Whether the input queue should be drained after each chunk pause.
    pub fn drains_after_chunk(&self) -> bool {
        self.strategy == PacingStrategy::Burst
    }
}

fn ms(value: u32) -> Duration {
    Duration::from_millis(u64::from(value))
}
