use std::collections::HashSet;
use std::time::{Duration, Instant};

/// How long a rejected key stays visible before `tick` clears it.
pub const WRONG_KEY_FLASH: Duration = Duration::from_millis(500);

/// Floor for the final elapsed seconds, so rate math downstream can never
/// divide by zero on a lesson finished inside the first second.
pub const MIN_ELAPSED_SECS: u64 = 1;

/// Session clock. The start/pause instants live inside the variants so a
/// paused session without a start time is unrepresentable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Clock {
    NotStarted,
    Running { started_at: Instant },
    Paused { started_at: Instant, paused_at: Instant },
    Stopped { elapsed_secs: u64 },
}

/// Live state of one attempt at one practice text.
///
/// Mutated only through the engine methods in `session::engine` and the
/// idle watcher's pause/resume calls. Every time-dependent operation takes
/// `now` explicitly; callers pass `Instant::now()`.
pub struct Session {
    pub target: Vec<char>,
    pub cursor: usize,
    /// Positions where the first attempt was wrong. Entries are never
    /// removed until the session is replaced.
    pub error_positions: HashSet<usize>,
    pub clock: Clock,
    pub accumulated_pause: Duration,
    /// Consecutive correct keystrokes since the last mismatch.
    pub streak: u32,
    /// Longest streak reached during this session.
    pub best_streak: u32,
    /// True while block-on-error is holding the cursor on an unresolved error.
    pub blocking: bool,
    pub(crate) wrong_key: Option<(char, Instant)>,
    pub(crate) block_on_error: bool,
}

impl Session {
    pub fn new(text: &str, block_on_error: bool) -> Self {
        let target: Vec<char> = text.chars().collect();
        // An empty target is complete before any keystroke. Elapsed saturates
        // at one second so wpm/accuracy stay division-safe downstream.
        let clock = if target.is_empty() {
            Clock::Stopped {
                elapsed_secs: MIN_ELAPSED_SECS,
            }
        } else {
            Clock::NotStarted
        };
        Self {
            target,
            cursor: 0,
            error_positions: HashSet::new(),
            clock,
            accumulated_pause: Duration::ZERO,
            streak: 0,
            best_streak: 0,
            blocking: false,
            wrong_key: None,
            block_on_error,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.clock, Clock::Stopped { .. })
    }

    pub fn is_running(&self) -> bool {
        matches!(self.clock, Clock::Running { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.clock, Clock::Paused { .. })
    }

    pub fn is_started(&self) -> bool {
        !matches!(self.clock, Clock::NotStarted)
    }

    /// The character the session expects next, if any.
    pub fn expected_char(&self) -> Option<char> {
        self.target.get(self.cursor).copied()
    }

    /// The most recently rejected key, while its flash window is open.
    pub fn wrong_key(&self) -> Option<char> {
        self.wrong_key.map(|(ch, _)| ch)
    }

    /// Wall-clock time spent typing, with paused time subtracted.
    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.clock {
            Clock::NotStarted => Duration::ZERO,
            Clock::Running { started_at } => now
                .saturating_duration_since(started_at)
                .saturating_sub(self.accumulated_pause),
            Clock::Paused {
                started_at,
                paused_at,
            } => paused_at
                .saturating_duration_since(started_at)
                .saturating_sub(self.accumulated_pause),
            Clock::Stopped { elapsed_secs } => Duration::from_secs(elapsed_secs),
        }
    }

    pub fn elapsed_secs(&self, now: Instant) -> u64 {
        self.elapsed(now).as_secs()
    }

    /// Error positions the cursor has already passed. This is the count the
    /// accuracy formula uses; an unresolved error at the cursor itself is
    /// excluded until the position is cleared.
    pub fn errors_before_cursor(&self) -> usize {
        self.error_positions
            .iter()
            .filter(|&&pos| pos < self.cursor)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.error_positions.len()
    }

    pub fn progress(&self) -> f64 {
        if self.target.is_empty() {
            return 1.0;
        }
        self.cursor as f64 / self.target.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session() {
        let session = Session::new("fj fj", false);
        assert_eq!(session.target.len(), 5);
        assert_eq!(session.cursor, 0);
        assert_eq!(session.clock, Clock::NotStarted);
        assert!(!session.is_complete());
        assert_eq!(session.progress(), 0.0);
    }

    #[test]
    fn test_empty_text_is_immediately_complete() {
        let session = Session::new("", true);
        assert!(session.is_complete());
        assert_eq!(session.cursor, 0);
        assert!(session.error_positions.is_empty());
        assert_eq!(session.clock, Clock::Stopped { elapsed_secs: 1 });
        assert_eq!(session.progress(), 1.0);
    }

    #[test]
    fn test_elapsed_not_started_is_zero() {
        let session = Session::new("abc", false);
        assert_eq!(session.elapsed(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn test_errors_before_cursor_excludes_unresolved() {
        let mut session = Session::new("abc", true);
        session.cursor = 1;
        session.error_positions.insert(0);
        session.error_positions.insert(1);
        assert_eq!(session.errors_before_cursor(), 1);
        assert_eq!(session.error_count(), 2);
    }
}
