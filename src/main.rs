mod app;
mod badge;
mod config;
mod event;
mod input;
mod lesson;
mod metrics;
mod session;
mod store;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use app::{App, AppScreen};
use config::Config;
use event::{AppEvent, EventHandler, TICK_RATE};
use lesson::Catalog;
use lesson::unlock::is_unlocked;
use metrics::LiveStats;
use store::json_store::ProgressStore;
use ui::lesson_list::LessonList;
use ui::results::ResultsCard;
use ui::typing_area::TypingArea;
use ui::{Palette, star_bar};

#[derive(Parser)]
#[command(name = "typekid", version, about = "Terminal typing tutor for kids")]
struct Cli {
    #[arg(short, long, help = "Jump straight into a lesson by id")]
    lesson: Option<u32>,

    #[arg(long, help = "List lessons with lock and star state, then exit")]
    list: bool,

    #[arg(long, help = "Override the progress data directory")]
    data_dir: Option<PathBuf>,

    #[arg(long, help = "Advance past errors instead of holding the cursor")]
    advance_on_error: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let catalog = Catalog::load()?;
    let mut config = Config::load().unwrap_or_default();
    if cli.advance_on_error {
        config.block_on_error = false;
    }

    let store = match cli.data_dir {
        Some(dir) => ProgressStore::with_base_dir(dir).ok(),
        None => ProgressStore::new().ok(),
    };

    let mut app = App::new(catalog, config, store);

    if cli.list {
        print_lesson_list(&app);
        return Ok(());
    }

    if let Some(id) = cli.lesson {
        app.start_lesson(id);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(TICK_RATE);

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn print_lesson_list(app: &App) {
    for lesson in app.catalog.rows() {
        let unlocked = is_unlocked(lesson, &app.progress.lessons);
        let stars = app
            .progress
            .lessons
            .get(&lesson.id)
            .map(|record| record.stars)
            .unwrap_or(0);
        let state = if !unlocked {
            "locked".to_string()
        } else if lesson.is_typed() {
            star_bar(stars)
        } else {
            "info".to_string()
        };
        println!("{:>2}. {:<24} {}", lesson.id, lesson.title, state);
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.on_tick(Instant::now()),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::LessonList => handle_list_key(app, key),
        AppScreen::Practice => handle_practice_key(app, key),
        AppScreen::Results => handle_results_key(app, key),
    }
}

fn handle_list_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Enter => app.start_selected(),
        _ => {}
    }
}

fn handle_practice_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.go_to_list();
        return;
    }

    let is_info = app.current_lesson().is_some_and(|lesson| !lesson.is_typed());
    if is_info {
        if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
            app.next_lesson();
        }
        return;
    }

    app.on_practice_key(&key, Instant::now());
}

fn handle_results_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.retry_lesson(),
        KeyCode::Char('n') if app.has_next_lesson() => app.next_lesson(),
        KeyCode::Char('q') | KeyCode::Esc => app.go_to_list(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let bg = Block::default().style(Style::default().bg(Palette::BG));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::LessonList => render_list(frame, app),
        AppScreen::Practice => render_practice(frame, app),
        AppScreen::Results => render_results(frame, app),
    }
}

fn header_line(app: &App, title: &str) -> Paragraph<'static> {
    let stats = &app.progress.stats;
    let info = format!(
        " {} pts | {} \u{2605} | {}/{} lessons ",
        stats.total_points,
        stats.total_stars,
        stats.lessons_completed,
        app.catalog.len(),
    );
    Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" typekid \u{2328} {title} "),
            Style::default()
                .fg(Palette::HEADER_FG)
                .bg(Palette::HEADER_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info,
            Style::default().fg(Palette::PENDING).bg(Palette::HEADER_BG),
        ),
    ]))
    .style(Style::default().bg(Palette::HEADER_BG))
}

fn screen_layout(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area)
}

fn render_list(frame: &mut ratatui::Frame, app: &App) {
    let layout = screen_layout(frame.area());
    frame.render_widget(header_line(app, "Lessons"), layout[0]);

    let list = LessonList::new(&app.catalog, &app.progress.lessons, app.selected);
    frame.render_widget(list, layout[1]);

    let footer = Paragraph::new(Line::from(Span::styled(
        " [\u{2191}\u{2193}] Choose  [Enter] Start  [q] Quit ",
        Style::default().fg(Palette::PENDING),
    )));
    frame.render_widget(footer, layout[2]);
}

fn render_practice(frame: &mut ratatui::Frame, app: &App) {
    let Some(lesson) = app.current_lesson() else {
        return;
    };
    let layout = screen_layout(frame.area());
    frame.render_widget(
        header_line(app, &format!("Lesson {}: {}", lesson.id, lesson.title)),
        layout[0],
    );

    if let Some(ref session) = app.session {
        let body = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(layout[1]);

        let live = LiveStats::observe(session, Instant::now());
        let paused = if app.idle.is_idle() {
            "  \u{23f8} paused - type to continue"
        } else {
            ""
        };
        let stats_line = Paragraph::new(Line::from(vec![
            Span::styled(
                format!(
                    " {} wpm | {}% | streak {} | {}s | {:.0}% done",
                    live.wpm,
                    live.accuracy,
                    live.streak,
                    live.elapsed_secs,
                    session.progress() * 100.0
                ),
                Style::default().fg(Palette::TEXT),
            ),
            Span::styled(paused, Style::default().fg(Palette::STAR)),
        ]));
        frame.render_widget(stats_line, body[0]);

        frame.render_widget(TypingArea::new(session), body[1]);

        if app.config.show_key_hint
            && let Some(next) = session.expected_char()
        {
            let shown = match next {
                ' ' => "space".to_string(),
                '\n' => "enter".to_string(),
                ch => ch.to_string(),
            };
            let hint = Paragraph::new(Line::from(Span::styled(
                format!(" next key: {shown}"),
                Style::default().fg(Palette::ACCENT),
            )));
            frame.render_widget(hint, body[2]);
        }

        if !session.is_started() {
            let keys: String = lesson
                .keys
                .iter()
                .map(|ch| if *ch == ' ' { '\u{2423}' } else { *ch })
                .map(|ch| format!("{ch} "))
                .collect();
            let mut ready_text = format!(" ready? this lesson uses: {keys}");
            if let (Some(wpm), Some(acc)) = (lesson.target_wpm, lesson.min_accuracy) {
                ready_text.push_str(&format!("  (goal: {wpm} wpm, {acc}%)"));
            }
            let ready = Paragraph::new(Line::from(Span::styled(
                ready_text,
                Style::default().fg(Palette::PENDING),
            )));
            frame.render_widget(ready, body[3]);
        }
    } else {
        // Info lesson: just the card text.
        let mut lines = vec![Line::default()];
        for text in &lesson.texts {
            lines.push(
                Line::from(Span::styled(
                    text.clone(),
                    Style::default().fg(Palette::TEXT),
                ))
                .centered(),
            );
            lines.push(Line::default());
        }
        lines.push(
            Line::from(Span::styled(
                "[Enter] Continue",
                Style::default().fg(Palette::ACCENT),
            ))
            .centered(),
        );
        let card = Paragraph::new(lines).block(
            Block::bordered().border_style(Style::default().fg(Palette::LOCKED)),
        );
        frame.render_widget(card, centered_rect(70, 60, layout[1]));
    }

    let footer = Paragraph::new(Line::from(Span::styled(
        " [Esc] Back to lessons ",
        Style::default().fg(Palette::PENDING),
    )));
    frame.render_widget(footer, layout[2]);
}

fn render_results(frame: &mut ratatui::Frame, app: &App) {
    let layout = screen_layout(frame.area());
    frame.render_widget(header_line(app, "Results"), layout[0]);

    if let Some(ref summary) = app.last_result {
        let card = ResultsCard::new(
            &summary.stats,
            &summary.new_badges,
            summary.slowest_key,
            app.has_next_lesson(),
        );
        frame.render_widget(card, centered_rect(60, 80, layout[1]));
    }
}

/// Centered sub-rectangle taking the given percentages of the area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
