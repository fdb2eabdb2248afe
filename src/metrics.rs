//! Pure metric functions over session snapshots. Identical inputs always
//! produce identical outputs; time is passed in, never sampled here.

use std::time::{Duration, Instant};

use crate::session::engine::KeystrokeEvent;
use crate::session::state::{Clock, Session};

/// Stars awarded at this accuracy or better, best first.
const STAR_STEPS: &[(u32, u8)] = &[(95, 5), (90, 4), (85, 3), (80, 2)];

/// Words per minute at the standard five characters per word.
pub fn wpm(chars_typed: usize, elapsed_secs: u64) -> u32 {
    if elapsed_secs == 0 {
        return 0;
    }
    let words = chars_typed as f64 / 5.0;
    let minutes = elapsed_secs as f64 / 60.0;
    (words / minutes).round() as u32
}

/// Percentage of passed positions whose first attempt was correct.
/// Vacuously 100 before any input.
pub fn accuracy(cursor: usize, errors_before_cursor: usize) -> u32 {
    if cursor == 0 {
        return 100;
    }
    let correct = cursor.saturating_sub(errors_before_cursor);
    ((correct as f64 / cursor as f64) * 100.0).round().clamp(0.0, 100.0) as u32
}

/// Fixed step function; every completed attempt earns at least one star.
pub fn stars(accuracy: u32) -> u8 {
    for &(threshold, stars) in STAR_STEPS {
        if accuracy >= threshold {
            return stars;
        }
    }
    1
}

/// Deterministic score for one completion.
pub fn points(wpm: u32, accuracy: u32, stars: u8) -> u32 {
    100 + accuracy * 5 + wpm * 10 + u32::from(stars) * 50
}

/// Rolling stats recomputed for display after each accepted keystroke and
/// on each tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct LiveStats {
    pub wpm: u32,
    pub accuracy: u32,
    pub streak: u32,
    pub elapsed_secs: u64,
}

impl LiveStats {
    pub fn observe(session: &Session, now: Instant) -> Self {
        let elapsed_secs = session.elapsed_secs(now);
        Self {
            wpm: if session.is_started() {
                wpm(session.cursor, elapsed_secs)
            } else {
                0
            },
            accuracy: accuracy(session.cursor, session.errors_before_cursor()),
            streak: session.streak,
            elapsed_secs,
        }
    }
}

/// Final snapshot of a stopped session, ready for the progress store.
#[derive(Clone, Copy, Debug)]
pub struct FinalStats {
    pub wpm: u32,
    pub accuracy: u32,
    pub stars: u8,
    pub points: u32,
    pub elapsed_secs: u64,
    pub correct_chars: usize,
    pub total_chars: usize,
    pub error_count: usize,
    pub best_streak: u32,
}

impl FinalStats {
    /// `None` until the session reaches Stopped.
    pub fn from_session(session: &Session) -> Option<Self> {
        let Clock::Stopped { elapsed_secs } = session.clock else {
            return None;
        };
        let total_chars = session.target.len();
        let error_count = session.error_count();
        let wpm = wpm(total_chars, elapsed_secs);
        let accuracy = accuracy(total_chars, error_count);
        let stars = stars(accuracy);
        Some(Self {
            wpm,
            accuracy,
            stars,
            points: points(wpm, accuracy, stars),
            elapsed_secs,
            correct_chars: total_chars - error_count.min(total_chars),
            total_chars,
            error_count,
            best_streak: session.best_streak,
        })
    }
}

/// The correctly-typed key that took longest to arrive, measured from the
/// preceding keystroke. Feedback for the results screen; the first key of
/// the session has no gap to measure.
pub fn slowest_key(events: &[KeystrokeEvent]) -> Option<(char, Duration)> {
    let mut worst: Option<(char, Duration)> = None;
    for pair in events.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        if !curr.correct {
            continue;
        }
        let gap = curr.timestamp.saturating_duration_since(prev.timestamp);
        if worst.is_none_or(|(_, w)| gap > w) {
            worst = Some((curr.expected, gap));
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wpm_basic() {
        // 60 chars in 60s = 12 words/min.
        assert_eq!(wpm(60, 60), 12);
        assert_eq!(wpm(10, 60), 2);
        assert_eq!(wpm(0, 60), 0);
    }

    #[test]
    fn test_wpm_zero_elapsed_is_zero() {
        assert_eq!(wpm(50, 0), 0);
    }

    #[test]
    fn test_accuracy_vacuously_perfect_at_zero_cursor() {
        assert_eq!(accuracy(0, 0), 100);
    }

    #[test]
    fn test_accuracy_rounds() {
        assert_eq!(accuracy(3, 1), 67);
        assert_eq!(accuracy(2, 1), 50);
        assert_eq!(accuracy(8, 0), 100);
    }

    #[test]
    fn test_accuracy_saturates_in_range() {
        assert_eq!(accuracy(1, 5), 0);
    }

    #[test]
    fn test_stars_steps() {
        assert_eq!(stars(100), 5);
        assert_eq!(stars(95), 5);
        assert_eq!(stars(94), 4);
        assert_eq!(stars(90), 4);
        assert_eq!(stars(85), 3);
        assert_eq!(stars(80), 2);
        assert_eq!(stars(79), 1);
        assert_eq!(stars(0), 1);
    }

    #[test]
    fn test_stars_monotone_over_full_range() {
        let mut prev = stars(0);
        for acc in 1..=100 {
            let s = stars(acc);
            assert!(s >= prev, "stars dipped at accuracy {acc}");
            assert!((1..=5).contains(&s));
            prev = s;
        }
    }

    #[test]
    fn test_points_formula() {
        // wpm 20, accuracy 90, 4 stars: 100 + 450 + 200 + 200.
        assert_eq!(points(20, 90, 4), 950);
    }

    #[test]
    fn test_live_stats_before_start() {
        let session = Session::new("abc", false);
        let live = LiveStats::observe(&session, Instant::now());
        assert_eq!(live.wpm, 0);
        assert_eq!(live.accuracy, 100);
        assert_eq!(live.streak, 0);
    }

    #[test]
    fn test_final_stats_spec_scenario_advance_on_error() {
        // "fj", advance-on-error, f then x: one error, 50% accuracy, 1 star.
        let mut session = Session::new("fj", false);
        let t0 = Instant::now();
        session.handle_key('f', t0);
        session.handle_key('x', t0 + Duration::from_millis(200));
        let stats = FinalStats::from_session(&session).unwrap();
        assert_eq!(stats.accuracy, 50);
        assert_eq!(stats.stars, 1);
        assert_eq!(stats.error_count, 1);
        assert_eq!(stats.elapsed_secs, 1);
    }

    #[test]
    fn test_final_stats_spec_scenario_block_on_error() {
        // "ab", block-on-error, a x x b: one recorded error despite two
        // wrong attempts at position 1.
        let mut session = Session::new("ab", true);
        let t0 = Instant::now();
        for (i, ch) in ['a', 'x', 'x', 'b'].into_iter().enumerate() {
            session.handle_key(ch, t0 + Duration::from_millis(100 * i as u64));
        }
        let stats = FinalStats::from_session(&session).unwrap();
        assert_eq!(stats.error_count, 1);
        assert_eq!(stats.accuracy, 50);
        assert_eq!(stats.correct_chars, 1);
    }

    #[test]
    fn test_final_stats_empty_text() {
        let session = Session::new("", false);
        let stats = FinalStats::from_session(&session).unwrap();
        assert_eq!(stats.wpm, 0);
        assert_eq!(stats.accuracy, 100);
        assert_eq!(stats.stars, 5);
        assert_eq!(stats.total_chars, 0);
    }

    #[test]
    fn test_final_stats_none_until_stopped() {
        let mut session = Session::new("ab", false);
        assert!(FinalStats::from_session(&session).is_none());
        session.handle_key('a', Instant::now());
        assert!(FinalStats::from_session(&session).is_none());
    }

    #[test]
    fn test_slowest_key_measures_inter_key_gap() {
        let t0 = Instant::now();
        let ev = |expected: char, ms: u64, correct: bool| KeystrokeEvent {
            expected,
            actual: expected,
            timestamp: t0 + Duration::from_millis(ms),
            correct,
        };
        let events = vec![
            ev('f', 0, true),
            ev('j', 200, true),
            ev('k', 1_100, true),
            // Slow but wrong: doesn't count.
            ev('d', 3_000, false),
            ev('d', 3_100, true),
        ];
        let (key, gap) = slowest_key(&events).unwrap();
        assert_eq!(key, 'k');
        assert_eq!(gap, Duration::from_millis(900));
    }

    #[test]
    fn test_slowest_key_needs_two_events() {
        assert!(slowest_key(&[]).is_none());
        let only = KeystrokeEvent {
            expected: 'f',
            actual: 'f',
            timestamp: Instant::now(),
            correct: true,
        };
        assert!(slowest_key(&[only]).is_none());
    }

    #[test]
    fn test_final_wpm_uses_pause_adjusted_elapsed() {
        let mut session = Session::new("aaaaaaaaaa", false);
        let t0 = Instant::now();
        session.handle_key('a', t0);
        session.pause(t0 + Duration::from_secs(10));
        session.resume(t0 + Duration::from_secs(70));
        for i in 0..9 {
            session.handle_key('a', t0 + Duration::from_secs(70 + i));
        }
        let stats = FinalStats::from_session(&session).unwrap();
        // 78s wall - 60s paused = 18s typing; 10 chars = 2 words.
        assert_eq!(stats.elapsed_secs, 18);
        assert_eq!(stats.wpm, 7);
    }
}
