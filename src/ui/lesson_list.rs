use std::collections::HashMap;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::lesson::unlock::is_unlocked;
use crate::lesson::{Catalog, SECTION_ORDER};
use crate::store::schema::LessonProgress;
use crate::ui::{Palette, star_bar};

/// Scrollable lesson picker grouped by section. Lock state is computed
/// from the progress map on every render, never cached.
pub struct LessonList<'a> {
    catalog: &'a Catalog,
    progress: &'a HashMap<u32, LessonProgress>,
    selected: usize,
}

impl<'a> LessonList<'a> {
    pub fn new(
        catalog: &'a Catalog,
        progress: &'a HashMap<u32, LessonProgress>,
        selected: usize,
    ) -> Self {
        Self {
            catalog,
            progress,
            selected,
        }
    }
}

impl Widget for LessonList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines: Vec<Line> = Vec::new();
        let mut row = 0usize;
        let mut selected_line = 0usize;

        for &section in SECTION_ORDER {
            if self.catalog.by_section(section).next().is_none() {
                continue;
            }
            lines.push(Line::from(Span::styled(
                format!(" {} ", section.label()),
                Style::default()
                    .fg(Palette::ACCENT)
                    .add_modifier(Modifier::BOLD),
            )));

            for lesson in self.catalog.by_section(section) {
                let unlocked = is_unlocked(lesson, self.progress);
                let record = self.progress.get(&lesson.id);
                let stars = record.map(|r| r.stars).unwrap_or(0);
                let is_selected = row == self.selected;

                let marker = if !unlocked {
                    " \u{1f512} "
                } else if is_selected {
                    " > "
                } else {
                    "   "
                };
                let stars_text = if lesson.is_typed() {
                    format!("  {}", star_bar(stars))
                } else {
                    String::new()
                };

                let base = if !unlocked {
                    Style::default().fg(Palette::LOCKED)
                } else if is_selected {
                    Style::default()
                        .fg(Palette::ACCENT)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Palette::TEXT)
                };

                let mut spans = vec![
                    Span::styled(
                        format!("{marker}{:>2}. {:<24}", lesson.id, lesson.title),
                        base,
                    ),
                    Span::styled(stars_text, Style::default().fg(Palette::STAR)),
                ];
                if unlocked && !lesson.is_typed() {
                    spans.push(Span::styled(
                        "  (read me)",
                        Style::default().fg(Palette::PENDING),
                    ));
                }

                if is_selected {
                    selected_line = lines.len();
                }
                lines.push(Line::from(spans));
                row += 1;
            }
            lines.push(Line::default());
        }

        // Keep the selection in view on small terminals.
        let visible = area.height.saturating_sub(2) as usize;
        let scroll = selected_line.saturating_sub(visible / 2).min(
            lines.len().saturating_sub(visible),
        ) as u16;

        let block = Block::bordered()
            .title(" Lessons ")
            .border_style(Style::default().fg(Palette::LOCKED))
            .style(Style::default().bg(Palette::BG));

        Paragraph::new(lines)
            .block(block)
            .scroll((scroll, 0))
            .render(area, buf);
    }
}
