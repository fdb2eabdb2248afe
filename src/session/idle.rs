use std::time::{Duration, Instant};

use crate::session::state::Session;

/// Watches the keystroke stream for inactivity and suspends the session
/// clock so a child who wanders off mid-lesson is not penalized in wpm.
///
/// The watcher owns a single deadline; the UI tick polls it. It lives and
/// dies with its session, so replacing the pair on reset or navigation
/// cancels the timer with no further bookkeeping.
pub struct IdleWatcher {
    window: Duration,
    deadline: Option<Instant>,
    idle: bool,
}

impl IdleWatcher {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
            idle: false,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }

    /// Call before forwarding each accepted token to the engine: wakes a
    /// paused session and re-arms the inactivity deadline.
    pub fn on_input(&mut self, session: &mut Session, now: Instant) {
        if self.idle {
            session.resume(now);
            self.idle = false;
        }
        self.deadline = Some(now + self.window);
    }

    /// Poll from the UI tick. Fires at most once per armed deadline.
    pub fn on_tick(&mut self, session: &mut Session, now: Instant) {
        // A deadline can outlive the session's clock; never pause a
        // session that already stopped.
        if session.is_complete() {
            self.disarm();
            return;
        }
        if let Some(deadline) = self.deadline
            && now >= deadline
            && !self.idle
        {
            self.idle = true;
            self.deadline = None;
            session.pause(now);
        }
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }
}
