// Leaderboard widget: paged ranking of users by total points.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

use crease_app::protocol::TabId;
use crease_cricket::filter::{paginate, LEADERBOARD_PAGE_SIZE};

use super::{pending_text, render_message};
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    if let Some((text, color)) = pending_text("leaderboard", &state.leaderboard) {
        render_message(frame, area, "Leaderboard", text, color);
        return;
    }

    let visible = state.visible_leaderboard();
    let page = paginate(&visible, state.leaderboard_page, LEADERBOARD_PAGE_SIZE);

    let header = Row::new(vec![
        Cell::from("Rank"),
        Cell::from("User"),
        Cell::from("Points"),
    ])
    .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));

    let me = state.username.as_deref();
    let rows: Vec<Row> = page
        .items
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let style = if me == Some(entry.username.as_str()) {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(format!("{}", page.offset + i + 1)),
                Cell::from(entry.username.clone()),
                Cell::from(format!("{:.2}", entry.total_points)),
            ])
            .style(style)
        })
        .collect();

    let mut title = format!("Leaderboard (page {}/{})", page.index + 1, page.total_pages);
    let search = state.search_text(TabId::Leaderboard);
    if !search.is_empty() {
        title.push_str(&format!(" /{search}"));
    }

    let widths = [
        Constraint::Length(6),
        Constraint::Min(16),
        Constraint::Length(10),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
