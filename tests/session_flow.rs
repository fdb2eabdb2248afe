use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tempfile::TempDir;

use typekid::input::normalizer::Normalizer;
use typekid::lesson::Catalog;
use typekid::lesson::unlock::is_unlocked;
use typekid::metrics::FinalStats;
use typekid::session::idle::IdleWatcher;
use typekid::session::state::Session;
use typekid::store::json_store::ProgressStore;

fn press(ch: char) -> KeyEvent {
    let code = if ch == '\n' {
        KeyCode::Enter
    } else {
        KeyCode::Char(ch)
    };
    KeyEvent::new(code, KeyModifiers::NONE)
}

/// Push raw key events through normalizer, idle watcher, and engine, one
/// every `gap`, starting at `t0`. Returns the instant after the last key.
fn type_keys(
    session: &mut Session,
    normalizer: &mut Normalizer,
    idle: &mut IdleWatcher,
    keys: &str,
    t0: Instant,
    gap: Duration,
) -> Instant {
    let mut now = t0;
    for ch in keys.chars() {
        now += gap;
        if let Some(token) = normalizer.normalize(&press(ch), now) {
            idle.on_input(session, now);
            session.handle_key(token, now);
        }
    }
    now
}

#[test]
fn full_lesson_flow_reaches_the_store() {
    let catalog = Catalog::load().unwrap();
    let lesson = catalog.get(2).unwrap();
    let text = &lesson.texts[0];

    let mut session = Session::new(text, true);
    let mut normalizer = Normalizer::new(Duration::from_millis(50));
    normalizer.set_allowed_keys(Some(&lesson.keys));
    let mut idle = IdleWatcher::new(Duration::from_secs(5));

    let t0 = Instant::now();
    type_keys(
        &mut session,
        &mut normalizer,
        &mut idle,
        text,
        t0,
        Duration::from_millis(200),
    );

    assert!(session.is_complete());
    let stats = FinalStats::from_session(&session).unwrap();
    assert_eq!(stats.accuracy, 100);
    assert_eq!(stats.stars, 5);
    assert_eq!(stats.total_chars, text.chars().count());

    let dir = TempDir::new().unwrap();
    let store = ProgressStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let mut data = store.load();
    let earned = data.record_completion(lesson.id, &stats, Utc::now());
    assert!(earned.iter().any(|badge| badge.id == "first_steps"));
    store.save(&data).unwrap();

    let reloaded = store.load();
    let record = &reloaded.lessons[&lesson.id];
    assert!(record.completed);
    assert_eq!(record.stars, 5);
    assert_eq!(reloaded.stats.lessons_completed, 1);
}

#[test]
fn star_gate_controls_unlock_progression() {
    let catalog = Catalog::load().unwrap();
    let lesson2 = catalog.get(2).unwrap();
    let lesson3 = catalog.get(3).unwrap();

    let dir = TempDir::new().unwrap();
    let store = ProgressStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let mut data = store.load();
    assert!(!is_unlocked(lesson3, &data.lessons));

    // A sloppy first run: one miss in six characters is 83%, two stars.
    let text = "fjfjfj";
    let mut session = Session::new(text, false);
    let t0 = Instant::now();
    let keys = "fjfjjj";
    for (i, ch) in keys.chars().enumerate() {
        session.handle_key(ch, t0 + Duration::from_millis(300 * (i as u64 + 1)));
    }
    let sloppy = FinalStats::from_session(&session).unwrap();
    assert_eq!(sloppy.accuracy, 83);
    assert_eq!(sloppy.stars, 2);

    data.record_completion(lesson2.id, &sloppy, Utc::now());
    assert!(!is_unlocked(lesson3, &data.lessons));

    // A clean retry crosses the three-star gate.
    let mut session = Session::new(text, false);
    for (i, ch) in text.chars().enumerate() {
        session.handle_key(ch, t0 + Duration::from_millis(300 * (i as u64 + 1)));
    }
    let clean = FinalStats::from_session(&session).unwrap();
    assert_eq!(clean.stars, 5);

    data.record_completion(lesson2.id, &clean, Utc::now());
    assert!(is_unlocked(lesson3, &data.lessons));

    store.save(&data).unwrap();
    let record = &store.load().lessons[&lesson2.id];
    assert_eq!(record.attempts, 2);
    assert_eq!(record.stars, 5);
}

#[test]
fn idle_gap_does_not_dilute_wpm() {
    // 30 characters at one per second, with a two-minute walk-away in the
    // middle caught by the idle watcher.
    let text: String = std::iter::repeat('f').take(30).collect();
    let mut session = Session::new(&text, true);
    let mut normalizer = Normalizer::new(Duration::from_millis(50));
    let mut idle = IdleWatcher::new(Duration::from_secs(5));

    let t0 = Instant::now();
    let after_first_half = type_keys(
        &mut session,
        &mut normalizer,
        &mut idle,
        &text[..15],
        t0,
        Duration::from_secs(1),
    );

    // Five quiet seconds later the watcher pauses the clock.
    idle.on_tick(&mut session, after_first_half + Duration::from_secs(5));
    assert!(session.is_paused());

    let resume_at = after_first_half + Duration::from_secs(120);
    type_keys(
        &mut session,
        &mut normalizer,
        &mut idle,
        &text[15..],
        resume_at,
        Duration::from_secs(1),
    );

    assert!(session.is_complete());
    let stats = FinalStats::from_session(&session).unwrap();
    // 149s of wall clock, 116s of it paused: the child is judged on 33s
    // at the keys, not on the walk-away.
    assert_eq!(stats.elapsed_secs, 33);
    assert_eq!(stats.wpm, 11);
    assert_eq!(stats.accuracy, 100);
}

#[test]
fn enter_key_types_a_newline_target() {
    let mut session = Session::new("a\nb", true);
    let mut normalizer = Normalizer::new(Duration::from_millis(50));
    let mut idle = IdleWatcher::new(Duration::from_secs(5));

    type_keys(
        &mut session,
        &mut normalizer,
        &mut idle,
        "a\nb",
        Instant::now(),
        Duration::from_millis(200),
    );
    assert!(session.is_complete());
    assert_eq!(session.error_count(), 0);
}

#[test]
fn release_and_modifier_events_never_reach_the_engine() {
    let mut session = Session::new("fff", true);
    let mut normalizer = Normalizer::new(Duration::from_millis(50));
    let t0 = Instant::now();

    let mut release = KeyEvent::new(KeyCode::Char('f'), KeyModifiers::NONE);
    release.kind = KeyEventKind::Release;
    assert!(normalizer.normalize(&release, t0).is_none());

    for code in [KeyCode::Tab, KeyCode::Esc, KeyCode::Backspace] {
        let event = KeyEvent::new(code, KeyModifiers::NONE);
        assert!(normalizer.normalize(&event, t0).is_none());
    }

    assert_eq!(session.cursor, 0);
    assert!(!session.is_started());
}

#[test]
fn double_fired_key_counts_once() {
    let text = "fj";
    let mut session = Session::new(text, true);
    let mut normalizer = Normalizer::new(Duration::from_millis(50));
    let mut idle = IdleWatcher::new(Duration::from_secs(5));
    let t0 = Instant::now();

    // 'f' fires twice 10ms apart (touch keyboard double-fire), then 'j'.
    for (ch, ms) in [('f', 100u64), ('f', 110), ('j', 400)] {
        let now = t0 + Duration::from_millis(ms);
        if let Some(token) = normalizer.normalize(&press(ch), now) {
            idle.on_input(&mut session, now);
            session.handle_key(token, now);
        }
    }

    assert!(session.is_complete());
    assert_eq!(session.error_count(), 0);
}
