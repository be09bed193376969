pub mod leaderboard_table;
pub mod stats_panel;

use chrono::{DateTime, Utc};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
    Frame,
};

use crate::app::App;
use crate::identity::AuthProvider;
use crate::session::SessionState;

const HORIZONTAL_MARGIN: u16 = 3;
const STATS_PANEL_HEIGHT: u16 = 16;

pub fn draw<A: AuthProvider>(app: &App<A>, f: &mut Frame) {
    f.render_widget(app, f.area());
}

impl<A: AuthProvider> Widget for &App<A> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let now = Utc::now();

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints(if self.show_stats {
                vec![Constraint::Min(12), Constraint::Length(STATS_PANEL_HEIGHT)]
            } else {
                vec![Constraint::Min(12)]
            })
            .split(area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // title
                Constraint::Length(1), // controls
                Constraint::Length(3), // live stats / results
                Constraint::Min(3),    // passage
                Constraint::Length(1), // status
                Constraint::Length(1), // legend
            ])
            .split(outer[0]);

        render_title(chunks[0], buf);
        render_controls(self, chunks[1], buf);

        if self.session.is_active() {
            render_live_stats(&self.session, now, chunks[2], buf);
        } else if self.session.is_finished() {
            render_results(&self.session, chunks[2], buf);
        }

        let passage = Paragraph::new(Line::from(passage_spans(&self.session)))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", self.passage.title)),
            )
            .wrap(Wrap { trim: false });
        passage.render(chunks[3], buf);

        if let Some(status) = &self.status {
            Paragraph::new(Span::styled(
                status.as_str(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            ))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);
        }

        Paragraph::new(Span::styled(
            legend(&self.session),
            Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
        ))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);

        if self.show_stats {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(outer[1]);

            stats_panel::render_stats(self.stats.as_ref(), columns[0], buf);

            let title = if self.leaderboard_by_mode {
                format!(" Leaderboard ({}) ", self.game_mode())
            } else {
                " Leaderboard ".to_string()
            };
            leaderboard_table::render_leaderboard(&self.leaderboard, &title, columns[1], buf);
        }
    }
}

fn render_title(area: Rect, buf: &mut Buffer) {
    let title = Line::from(vec![
        Span::styled(
            "TypeRush",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "  test your typing speed",
            Style::default().fg(Color::Gray),
        ),
    ]);
    Paragraph::new(title)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_controls<A: AuthProvider>(app: &App<A>, area: Rect, buf: &mut Buffer) {
    let difficulty_style = if app.session.is_active() {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD)
    };
    let who = if app.backend.identity().is_authenticated() {
        "signed in"
    } else {
        "not signed in"
    };

    let line = Line::from(vec![
        Span::raw("difficulty: "),
        Span::styled(app.difficulty.to_string(), difficulty_style),
        Span::raw("   "),
        Span::styled(who, Style::default().fg(Color::Gray)),
    ]);
    Paragraph::new(line)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_live_stats(session: &SessionState, now: DateTime<Utc>, area: Rect, buf: &mut Buffer) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    Paragraph::new(Span::styled(
        format!(
            "{} wpm   {}% acc   {} mistakes",
            session.live_wpm(now),
            session.accuracy(),
            session.mistakes
        ),
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(rows[0], buf);

    let progress = session.progress().clamp(0.0, 1.0);
    Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(progress)
        .label(format!("{:.0}%", progress * 100.0))
        .render(rows[2], buf);
}

fn render_results(session: &SessionState, area: Rect, buf: &mut Buffer) {
    let seconds = (session.elapsed_ms(Utc::now()) as f64 / 1000.0).round();
    let text = format!(
        "{} wpm   {}% acc   {} mistakes   {}s",
        session.final_wpm(),
        session.accuracy(),
        session.mistakes,
        seconds
    );

    Paragraph::new(vec![
        Line::from(Span::styled(
            "Finished!",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            text,
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
    .render(area, buf);
}

/// Typed text in green, the next char highlighted, the rest dimmed
pub fn passage_spans(session: &SessionState) -> Vec<Span<'static>> {
    let text = &session.text;
    let split = text
        .char_indices()
        .nth(session.current_index)
        .map_or(text.len(), |(i, _)| i);

    let (typed, rest) = text.split_at(split);
    let mut spans = vec![Span::styled(
        typed.to_string(),
        Style::default().fg(Color::Green),
    )];

    let mut rest_chars = rest.chars();
    if let Some(current) = rest_chars.next() {
        let cursor_style = if session.is_active() {
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(current.to_string(), cursor_style));
        spans.push(Span::styled(
            rest_chars.as_str().to_string(),
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        ));
    }

    spans
}

fn legend(session: &SessionState) -> &'static str {
    if session.is_active() {
        "(esc) reset / (ctrl+c) quit"
    } else {
        "(enter) start / (r)eset / (n)ew text / (d)ifficulty / (s)tats / (m)ode filter / (q)uit"
    }
}
