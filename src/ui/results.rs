use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::badge::Badge;
use crate::metrics::FinalStats;
use crate::ui::{Palette, star_bar};

/// Completion card: stars earned, the numbers behind them, points, and any
/// badges this run unlocked.
pub struct ResultsCard<'a> {
    stats: &'a FinalStats,
    new_badges: &'a [&'static Badge],
    slowest_key: Option<(char, Duration)>,
    has_next: bool,
}

impl<'a> ResultsCard<'a> {
    pub fn new(
        stats: &'a FinalStats,
        new_badges: &'a [&'static Badge],
        slowest_key: Option<(char, Duration)>,
        has_next: bool,
    ) -> Self {
        Self {
            stats,
            new_badges,
            slowest_key,
            has_next,
        }
    }
}

impl Widget for ResultsCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let stats = self.stats;
        let mut lines = vec![
            Line::default(),
            Line::from(Span::styled(
                "Lesson complete!",
                Style::default()
                    .fg(Palette::ACCENT)
                    .add_modifier(Modifier::BOLD),
            ))
            .centered(),
            Line::default(),
            Line::from(Span::styled(
                star_bar(stats.stars),
                Style::default()
                    .fg(Palette::STAR)
                    .add_modifier(Modifier::BOLD),
            ))
            .centered(),
            Line::default(),
            Line::from(vec![
                Span::styled("Speed     ", Style::default().fg(Palette::PENDING)),
                Span::styled(
                    format!("{} wpm", stats.wpm),
                    Style::default().fg(Palette::TEXT),
                ),
            ])
            .centered(),
            Line::from(vec![
                Span::styled("Accuracy  ", Style::default().fg(Palette::PENDING)),
                Span::styled(
                    format!("{}%", stats.accuracy),
                    Style::default().fg(Palette::TEXT),
                ),
            ])
            .centered(),
            Line::from(vec![
                Span::styled("Time      ", Style::default().fg(Palette::PENDING)),
                Span::styled(
                    format!("{}s", stats.elapsed_secs),
                    Style::default().fg(Palette::TEXT),
                ),
            ])
            .centered(),
            Line::from(vec![
                Span::styled("Points    ", Style::default().fg(Palette::PENDING)),
                Span::styled(
                    format!("+{}", stats.points),
                    Style::default()
                        .fg(Palette::CORRECT)
                        .add_modifier(Modifier::BOLD),
                ),
            ])
            .centered(),
        ];

        // Only worth mentioning once a pause is human-noticeable.
        if let Some((key, gap)) = self.slowest_key
            && gap >= Duration::from_secs(1)
        {
            let shown = if key == ' ' { "space".to_string() } else { key.to_string() };
            lines.push(Line::default());
            lines.push(
                Line::from(vec![
                    Span::styled("Trickiest key  ", Style::default().fg(Palette::PENDING)),
                    Span::styled(shown, Style::default().fg(Palette::ACCENT)),
                ])
                .centered(),
            );
        }

        if !self.new_badges.is_empty() {
            lines.push(Line::default());
            lines.push(
                Line::from(Span::styled(
                    "New badges",
                    Style::default()
                        .fg(Palette::STAR)
                        .add_modifier(Modifier::BOLD),
                ))
                .centered(),
            );
            for badge in self.new_badges {
                lines.push(
                    Line::from(vec![
                        Span::styled(badge.name, Style::default().fg(Palette::TEXT)),
                        Span::styled(
                            format!(" - {}", badge.description),
                            Style::default().fg(Palette::PENDING),
                        ),
                    ])
                    .centered(),
                );
            }
        }

        lines.push(Line::default());
        let mut actions = String::from(" [r] Try again ");
        if self.has_next {
            actions.push_str(" [n] Next lesson ");
        }
        actions.push_str(" [Esc] Lessons ");
        lines.push(
            Line::from(Span::styled(
                actions,
                Style::default().fg(Palette::PENDING),
            ))
            .centered(),
        );

        let block = Block::bordered()
            .border_style(Style::default().fg(Palette::ACCENT))
            .style(Style::default().bg(Palette::BG));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
