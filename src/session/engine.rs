use std::time::Instant;

use crate::session::state::{Clock, MIN_ELAPSED_SECS, Session, WRONG_KEY_FLASH};

/// Record of one processed keystroke, produced for downstream logging and
/// per-key timing. The engine only creates these; it never reads them back.
#[derive(Clone, Copy, Debug)]
pub struct KeystrokeEvent {
    pub expected: char,
    pub actual: char,
    pub timestamp: Instant,
    pub correct: bool,
}

impl Session {
    /// Process one normalized token. Returns `None` when the session has
    /// already stopped; otherwise returns the keystroke record.
    ///
    /// Under block-on-error a mismatch holds the cursor until the expected
    /// character is typed; each position enters `error_positions` at most
    /// once no matter how many wrong attempts it takes.
    pub fn handle_key(&mut self, token: char, now: Instant) -> Option<KeystrokeEvent> {
        if self.is_complete() {
            return None;
        }

        match self.clock {
            Clock::NotStarted => self.clock = Clock::Running { started_at: now },
            // The idle watcher resumes before forwarding input; this is the
            // fallback for a caller that forwarded straight to the engine.
            Clock::Paused { .. } => self.resume(now),
            _ => {}
        }

        let expected = self.target[self.cursor];
        let correct = token == expected;

        let event = KeystrokeEvent {
            expected,
            actual: token,
            timestamp: now,
            correct,
        };

        if correct {
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
            self.blocking = false;
            self.wrong_key = None;
            self.cursor += 1;
            if self.cursor == self.target.len() {
                self.stop(now);
            }
        } else {
            self.streak = 0;
            self.wrong_key = Some((token, now));
            // First failure only; a retry at the same position after a block
            // must not add a second entry.
            self.error_positions.insert(self.cursor);
            if self.block_on_error {
                self.blocking = true;
            } else {
                self.cursor += 1;
                if self.cursor == self.target.len() {
                    self.stop(now);
                }
            }
        }

        Some(event)
    }

    /// Suspend the clock. No-op unless running.
    pub fn pause(&mut self, now: Instant) {
        if let Clock::Running { started_at } = self.clock {
            self.clock = Clock::Paused {
                started_at,
                paused_at: now,
            };
        }
    }

    /// Restart the clock, folding the pause into `accumulated_pause`.
    /// No-op unless paused. Never touches cursor or error positions.
    pub fn resume(&mut self, now: Instant) {
        if let Clock::Paused {
            started_at,
            paused_at,
        } = self.clock
        {
            self.accumulated_pause += now.saturating_duration_since(paused_at);
            self.clock = Clock::Running { started_at };
        }
    }

    /// Presentation housekeeping driven by the UI tick: expires the
    /// wrong-key flash. Never the source of truth for metrics.
    pub fn tick(&mut self, now: Instant) {
        if let Some((_, since)) = self.wrong_key
            && now.saturating_duration_since(since) >= WRONG_KEY_FLASH
        {
            self.wrong_key = None;
        }
    }

    fn stop(&mut self, now: Instant) {
        let elapsed_secs = self.elapsed(now).as_secs().max(MIN_ELAPSED_SECS);
        self.clock = Clock::Stopped { elapsed_secs };
        self.blocking = false;
        self.wrong_key = None;
    }
}
