use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};

use crate::results::GameResult;
use crate::stats::UserStats;

fn recent_row(result: &GameResult) -> Row<'static> {
    let date = result
        .created_at
        .with_timezone(&Local)
        .format("%b %d %H:%M")
        .to_string();

    Row::new(vec![
        Cell::from(date).style(Style::default().fg(Color::Gray)),
        Cell::from(result.game_mode.clone()),
        Cell::from(format!("{} WPM", result.wpm)).style(Style::default().fg(Color::Cyan)),
        Cell::from(format!("{}%", result.accuracy)),
    ])
}

fn summary_lines(stats: &UserStats) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::Gray);
    let value = Style::default().add_modifier(Modifier::BOLD);

    vec![
        Line::from(vec![
            Span::styled("games ", label),
            Span::styled(stats.games_played.to_string(), value),
        ]),
        Line::from(vec![
            Span::styled("avg ", label),
            Span::styled(format!("{} WPM", stats.average_wpm), value),
            Span::styled("   best ", label),
            Span::styled(format!("{} WPM", stats.best_wpm), value.fg(Color::Green)),
        ]),
        Line::from(vec![
            Span::styled("avg ", label),
            Span::styled(format!("{}%", stats.average_accuracy), value),
            Span::styled("   best ", label),
            Span::styled(format!("{}%", stats.best_accuracy), value.fg(Color::Green)),
        ]),
    ]
}

/// Personal stats panel; `None` means nobody is signed in
pub fn render_stats(stats: Option<&UserStats>, area: Rect, buf: &mut Buffer) {
    let block = Block::default().borders(Borders::ALL).title(" Your Stats ");

    let stats = match stats {
        None => {
            return placeholder("Sign in to track your stats", block, area, buf);
        }
        Some(stats) if stats.games_played == 0 => {
            return placeholder("No games played yet", block, area, buf);
        }
        Some(stats) => stats,
    };

    let inner = block.inner(area);
    block.render(area, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(inner);

    Paragraph::new(summary_lines(stats)).render(chunks[0], buf);

    let rows: Vec<Row> = stats.recent_results.iter().map(recent_row).collect();
    Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(7),
            Constraint::Length(9),
            Constraint::Length(5),
        ],
    )
    .header(Row::new(vec!["Recent", "Mode", "Speed", "Acc"]).style(label_style()))
    .render(chunks[1], buf);
}

fn label_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn placeholder(message: &str, block: Block, area: Rect, buf: &mut Buffer) {
    Paragraph::new(message.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::DIM))
        .block(block)
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::UserId;
    use crate::results::ResultId;
    use crate::stats::summarize;
    use chrono::Utc;

    fn rendered(stats: Option<&UserStats>) -> String {
        let area = Rect::new(0, 0, 50, 16);
        let mut buffer = Buffer::empty(area);
        render_stats(stats, area, &mut buffer);
        buffer.content.iter().map(|c| c.symbol()).collect()
    }

    fn result(wpm: f64) -> GameResult {
        GameResult {
            id: ResultId(1),
            user_id: UserId(1),
            wpm,
            accuracy: 95.0,
            time_spent: 40.0,
            text_length: 150,
            mistakes: 4,
            game_mode: "hard".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn anonymous_placeholder() {
        assert!(rendered(None).contains("Sign in to track your stats"));
    }

    #[test]
    fn no_games_placeholder() {
        assert!(rendered(Some(&UserStats::default())).contains("No games played yet"));
    }

    #[test]
    fn summary_and_recent_results() {
        let stats = summarize(&[result(60.0), result(80.0)]);

        let screen = rendered(Some(&stats));

        assert!(screen.contains("games 2"));
        assert!(screen.contains("best 80 WPM"));
        assert!(screen.contains("hard"));
    }
}
