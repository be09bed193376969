use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::leaderboard::LeaderboardEntry;

const ORANGE: Color = Color::Rgb(255, 165, 0);
const NAME_WIDTH: usize = 20;

/// Cut `name` to at most `max` terminal columns, marking the cut with an ellipsis
fn fit_name(name: &str, max: usize) -> String {
    if name.width() <= max {
        return name.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in name.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Medal colors for the podium, plain text below it
fn rank_style(rank: usize) -> Style {
    match rank {
        1 => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        2 => Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
        3 => Style::default().fg(ORANGE).add_modifier(Modifier::BOLD),
        _ => Style::default(),
    }
}

/// Pure presenter for one leaderboard row, `rank` counted from 1
pub fn present_entry(rank: usize, entry: &LeaderboardEntry) -> Row<'static> {
    Row::new(vec![
        Cell::from(format!("#{rank}")).style(rank_style(rank)),
        Cell::from(fit_name(&entry.username, NAME_WIDTH)),
        Cell::from(format!("{} WPM", entry.result.wpm)).style(Style::default().fg(Color::Cyan)),
        Cell::from(format!("{}%", entry.result.accuracy)),
    ])
}

pub fn render_leaderboard(entries: &[LeaderboardEntry], title: &str, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string());

    if entries.is_empty() {
        Paragraph::new("No results yet")
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block)
            .render(area, buf);
        return;
    }

    let rows: Vec<Row> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| present_entry(i + 1, entry))
        .collect();

    let header = Row::new(vec!["Rank", "Player", "Speed", "Acc"]).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Min(10),
            Constraint::Length(9),
            Constraint::Length(5),
        ],
    )
    .header(header)
    .block(block)
    .column_spacing(1)
    .render(area, buf);
}
