use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::state::Session;
use crate::ui::Palette;

/// Renders the practice text with per-character feedback: green for
/// positions typed correctly, red underline where the first attempt was
/// wrong, a cursor block on the next expected character, dim for the rest.
/// While a rejected key is flashing, the cursor cell turns red and shows
/// the key the child actually pressed.
pub struct TypingArea<'a> {
    session: &'a Session,
}

impl<'a> TypingArea<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }
}

fn display_char(ch: char) -> String {
    match ch {
        '\n' => "\u{21b5}".to_string(), // ↵
        _ => ch.to_string(),
    }
}

impl Widget for TypingArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = self.session;
        let mut lines: Vec<Vec<Span>> = vec![Vec::new()];

        for (idx, &ch) in session.target.iter().enumerate() {
            let (style, display) = if idx < session.cursor {
                let style = if session.error_positions.contains(&idx) {
                    Style::default()
                        .fg(Palette::ERROR)
                        .add_modifier(Modifier::UNDERLINED)
                } else {
                    Style::default().fg(Palette::CORRECT)
                };
                (style, display_char(ch))
            } else if idx == session.cursor {
                match session.wrong_key() {
                    Some(wrong) => (
                        Style::default().fg(Palette::ERROR).bg(Palette::ERROR_BG),
                        display_char(wrong),
                    ),
                    None => (
                        Style::default()
                            .fg(Palette::CURSOR_FG)
                            .bg(Palette::CURSOR_BG),
                        display_char(ch),
                    ),
                }
            } else {
                (Style::default().fg(Palette::PENDING), display_char(ch))
            };

            lines.last_mut().unwrap().push(Span::styled(display, style));
            if ch == '\n' {
                lines.push(Vec::new());
            }
        }

        let ratatui_lines: Vec<Line> = lines.into_iter().map(Line::from).collect();

        let block = Block::bordered()
            .border_style(Style::default().fg(Palette::LOCKED))
            .style(Style::default().bg(Palette::BG));

        Paragraph::new(ratatui_lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
