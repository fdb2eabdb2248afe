use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::KeyEvent;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::badge::Badge;
use crate::config::Config;
use crate::input::normalizer::Normalizer;
use crate::lesson::unlock::is_unlocked;
use crate::lesson::{Catalog, Lesson};
use crate::metrics::{self, FinalStats};
use crate::session::engine::KeystrokeEvent;
use crate::session::idle::IdleWatcher;
use crate::session::state::Session;
use crate::store::json_store::ProgressStore;
use crate::store::schema::ProgressData;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    LessonList,
    Practice,
    Results,
}

/// Everything the results screen needs from a finished session.
pub struct CompletionSummary {
    pub lesson_id: u32,
    pub stats: FinalStats,
    pub new_badges: Vec<&'static Badge>,
    /// Correct key that took longest to find, for gentle coaching.
    pub slowest_key: Option<(char, Duration)>,
}

pub struct App {
    pub screen: AppScreen,
    pub catalog: Catalog,
    pub config: Config,
    pub progress: ProgressData,
    pub store: Option<ProgressStore>,
    /// Row index into `catalog.rows()`.
    pub selected: usize,
    pub current_lesson: Option<u32>,
    /// The active session and its idle watcher live and die together;
    /// replacing them on reset or navigation cancels every pending
    /// deadline at once.
    pub session: Option<Session>,
    pub idle: IdleWatcher,
    pub normalizer: Normalizer,
    pub session_events: Vec<KeystrokeEvent>,
    pub last_result: Option<CompletionSummary>,
    pub should_quit: bool,
    rng: SmallRng,
}

impl App {
    pub fn new(catalog: Catalog, config: Config, store: Option<ProgressStore>) -> Self {
        let progress = store.as_ref().map(|s| s.load()).unwrap_or_default();
        let idle = IdleWatcher::new(config.idle_timeout());
        let normalizer = Normalizer::new(config.key_repeat_window());
        Self {
            screen: AppScreen::LessonList,
            catalog,
            config,
            progress,
            store,
            selected: 0,
            current_lesson: None,
            session: None,
            idle,
            normalizer,
            session_events: Vec::new(),
            last_result: None,
            should_quit: false,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn current_lesson(&self) -> Option<&Lesson> {
        self.current_lesson.and_then(|id| self.catalog.get(id))
    }

    pub fn selected_lesson(&self) -> Option<&Lesson> {
        self.catalog.rows().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        let count = self.catalog.len();
        if count > 0 && self.selected + 1 < count {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn start_selected(&mut self) {
        if let Some(lesson) = self.selected_lesson() {
            self.start_lesson(lesson.id);
        }
    }

    /// Begin a lesson, replacing any previous session state wholesale.
    /// Locked or unknown lessons are ignored.
    pub fn start_lesson(&mut self, id: u32) {
        let Some(lesson) = self.catalog.get(id) else {
            return;
        };
        if !is_unlocked(lesson, &self.progress.lessons) {
            return;
        }

        self.current_lesson = Some(id);
        self.session_events.clear();
        self.last_result = None;
        self.idle = IdleWatcher::new(self.config.idle_timeout());
        self.normalizer = Normalizer::new(self.config.key_repeat_window());

        if lesson.is_typed() {
            self.normalizer.set_allowed_keys(Some(&lesson.keys));
            let text = lesson.texts[self.rng.gen_range(0..lesson.texts.len())].clone();
            self.session = Some(Session::new(&text, self.config.block_on_error));
        } else {
            self.session = None;
        }
        self.screen = AppScreen::Practice;

        // A degenerate (empty) text completes without a keystroke.
        if self
            .session
            .as_ref()
            .is_some_and(|session| session.is_complete())
        {
            self.finish_session();
        }
    }

    /// Raw key event from the terminal during practice: normalize, then
    /// feed the engine. Discarded events never touch the session.
    pub fn on_practice_key(&mut self, event: &KeyEvent, now: Instant) {
        if let Some(token) = self.normalizer.normalize(event, now) {
            self.type_token(token, now);
        }
    }

    /// Feed one normalized token through the idle watcher and the engine.
    pub fn type_token(&mut self, token: char, now: Instant) {
        let Some(ref mut session) = self.session else {
            return;
        };
        // The engine already ignores input after Stopped; bailing here also
        // keeps a straggler keystroke from re-recording the completion.
        if session.is_complete() {
            return;
        }
        // Lessons are lowercase; case policy is decided here, not in the
        // engine. Punctuation and space still compare exactly.
        let token = if token.is_alphabetic() {
            token.to_ascii_lowercase()
        } else {
            token
        };
        self.idle.on_input(session, now);
        if let Some(event) = session.handle_key(token, now) {
            self.session_events.push(event);
        }
        if session.is_complete() {
            self.finish_session();
        }
    }

    /// Drive per-tick housekeeping: idle detection and the wrong-key flash.
    pub fn on_tick(&mut self, now: Instant) {
        if self.screen != AppScreen::Practice {
            return;
        }
        if let Some(ref mut session) = self.session {
            self.idle.on_tick(session, now);
            session.tick(now);
        }
    }

    fn finish_session(&mut self) {
        let Some(lesson_id) = self.current_lesson else {
            return;
        };
        let Some(stats) = self.session.as_ref().and_then(FinalStats::from_session) else {
            return;
        };

        self.idle.disarm();
        let new_badges = self
            .progress
            .record_completion(lesson_id, &stats, Utc::now());
        self.save_progress();

        self.last_result = Some(CompletionSummary {
            lesson_id,
            stats,
            new_badges,
            slowest_key: metrics::slowest_key(&self.session_events),
        });
        self.screen = AppScreen::Results;
    }

    fn save_progress(&self) {
        if let Some(ref store) = self.store {
            let _ = store.save(&self.progress);
        }
    }

    pub fn retry_lesson(&mut self) {
        if let Some(id) = self.current_lesson {
            self.start_lesson(id);
        }
    }

    pub fn has_next_lesson(&self) -> bool {
        self.current_lesson
            .and_then(|id| self.catalog.next_after(id))
            .is_some()
    }

    /// Advance to the next lesson in the sequence if it is unlocked;
    /// otherwise fall back to the list so the child can see why.
    pub fn next_lesson(&mut self) {
        let next = self
            .current_lesson
            .and_then(|id| self.catalog.next_after(id))
            .map(|lesson| lesson.id);
        match next {
            Some(id)
                if self
                    .catalog
                    .get(id)
                    .is_some_and(|lesson| is_unlocked(lesson, &self.progress.lessons)) =>
            {
                self.start_lesson(id);
            }
            _ => self.go_to_list(),
        }
    }

    /// Back to the picker. Dropping the session and watcher here is what
    /// guarantees no stale deadline can touch a dead session.
    pub fn go_to_list(&mut self) {
        if let Some(id) = self.current_lesson {
            let rows = self.catalog.rows();
            if let Some(row) = rows.iter().position(|lesson| lesson.id == id) {
                self.selected = row;
            }
        }
        self.screen = AppScreen::LessonList;
        self.session = None;
        self.current_lesson = None;
        self.session_events.clear();
        self.idle.disarm();
    }
}
