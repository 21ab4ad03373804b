//! Event flusher: submits a buffer of key events with bounded retry.
//!
//! The OS may accept only part of a submission, or none of it when the input
//! queue is full or a secure desktop is active.  The flusher keeps submitting
//! the remainder until everything is accepted or the queue has refused
//! [`MAX_CONSECUTIVE_REJECTIONS`] times in a row.
//!
//! - **Burst** submits the whole remainder in one call and advances by the
//!   accepted count.
//! - **Paced** (per-character, per-event) submits one event at a time, with
//!   an optional delay after each accepted event.
//!
//! Either way the buffer is empty when `flush` returns.

use std::time::Duration;

use thiserror::Error;
use tracing::{trace, warn};
use typewire_core::{KeyInput, PacingConfig};

use super::ports::{InputSink, Pacer};

/// Consecutive zero-accepted submissions tolerated before giving up.
pub const MAX_CONSECUTIVE_REJECTIONS: u32 = 3;

/// Yield between two rejected submissions.
pub const REJECTION_BACKOFF: Duration = Duration::from_millis(1);

/// The input queue refused the remainder of a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "input queue rejected {attempts} consecutive submissions \
     ({accepted} of {total} events accepted)"
)]
pub struct FlushError {
    /// Events accepted before the queue gave up.
    pub accepted: usize,
    /// Events that were in the buffer.
    pub total: usize,
    /// Consecutive rejected attempts at the final boundary.
    pub attempts: u32,
}

/// Submits buffers through an [`InputSink`] under one pacing config.
pub struct EventFlusher<'a> {
    sink: &'a dyn InputSink,
    pacer: &'a dyn Pacer,
    config: PacingConfig,
}

impl<'a> EventFlusher<'a> {
    pub fn new(sink: &'a dyn InputSink, pacer: &'a dyn Pacer, config: PacingConfig) -> Self {
        Self { sink, pacer, config }
    }

    /// Submits every event in `buffer`, then clears it.
    ///
    /// Returns the number of events accepted.  An empty buffer is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`FlushError`] when the queue refuses
    /// [`MAX_CONSECUTIVE_REJECTIONS`] submissions in a row.  The error carries
    /// the partial accepted count so the caller can report it.
    pub fn flush(&self, buffer: &mut Vec<KeyInput>) -> Result<usize, FlushError> {
        if buffer.is_empty() {
            return Ok(0);
        }
        let result = if self.config.strategy.is_paced() {
            self.flush_paced(buffer)
        } else {
            self.flush_burst(buffer)
        };
        buffer.clear();
        result
    }

    fn flush_burst(&self, events: &[KeyInput]) -> Result<usize, FlushError> {
        let total = events.len();
        let mut sent = 0;
        let mut rejections = 0;

        while sent < total {
            let accepted = self.sink.submit(&events[sent..]).min(total - sent);
            if accepted > 0 {
                sent += accepted;
                rejections = 0;
                if sent < total {
                    trace!(accepted, remaining = total - sent, "partial submission");
                }
                continue;
            }

            rejections += 1;
            if rejections >= MAX_CONSECUTIVE_REJECTIONS {
                warn!(sent, total, "input queue kept rejecting burst submission");
                return Err(FlushError { accepted: sent, total, attempts: rejections });
            }
            self.pacer.pause(REJECTION_BACKOFF);
        }

        Ok(sent)
    }

    fn flush_paced(&self, events: &[KeyInput]) -> Result<usize, FlushError> {
        let total = events.len();
        let per_event_delay = self.config.per_event_delay();
        let mut sent = 0;

        for event in events {
            let mut rejections = 0;
            while self.sink.submit(std::slice::from_ref(event)) == 0 {
                rejections += 1;
                if rejections >= MAX_CONSECUTIVE_REJECTIONS {
                    warn!(sent, total, "input queue kept rejecting paced submission");
                    return Err(FlushError { accepted: sent, total, attempts: rejections });
                }
                self.pacer.pause(REJECTION_BACKOFF);
            }

            sent += 1;
            if let Some(delay) = per_event_delay {
                self.pacer.pause(delay);
            }
        }

        Ok(sent)
    }
}
