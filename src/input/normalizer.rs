use std::collections::HashSet;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Maps raw terminal key events to canonical tokens for the session engine.
///
/// This is the only place that knows about platform key naming: Enter
/// becomes `'\n'`, modifier and navigation keys are discarded, and a key
/// repeated within the suppression window collapses to a single token
/// (some terminals double-fire key events). An optional allow-list drops
/// tokens a lesson has not introduced yet; space is always exempt so a
/// child can't get stuck between words.
pub struct Normalizer {
    repeat_window: Duration,
    last: Option<(char, Instant)>,
    allowed: Option<HashSet<char>>,
}

impl Normalizer {
    pub fn new(repeat_window: Duration) -> Self {
        Self {
            repeat_window,
            last: None,
            allowed: None,
        }
    }

    /// Restrict accepted tokens to this set (compared case-insensitively
    /// for letters). `None` accepts everything.
    pub fn set_allowed_keys(&mut self, keys: Option<&[char]>) {
        self.allowed = keys.map(|keys| {
            keys.iter()
                .map(|ch| ch.to_ascii_lowercase())
                .collect()
        });
    }

    pub fn normalize(&mut self, event: &KeyEvent, now: Instant) -> Option<char> {
        if event.kind != KeyEventKind::Press {
            return None;
        }
        // Chorded input (ctrl-c and friends) is app control, never typing.
        if event
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
        {
            return None;
        }

        let token = match event.code {
            KeyCode::Char(ch) => ch,
            KeyCode::Enter => '\n',
            _ => return None,
        };

        if let Some((prev, at)) = self.last
            && prev == token
            && now.saturating_duration_since(at) <= self.repeat_window
        {
            return None;
        }
        self.last = Some((token, now));

        if let Some(ref allowed) = self.allowed
            && token != ' '
            && !allowed.contains(&token.to_ascii_lowercase())
        {
            return None;
        }

        Some(token)
    }
}
