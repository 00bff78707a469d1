// My Team widget: the user's selected players with their prices.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState};
use ratatui::Frame;

use crease_app::protocol::TabId;
use crease_cricket::valuation::format_currency;

use super::{pending_text, render_message};
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(team) = state.team.loaded() else {
        if let Some((text, color)) = pending_text("team", &state.team) {
            render_message(frame, area, "My Team", text, color);
        }
        return;
    };

    let visible = state.visible_team();
    if team.members.is_empty() {
        render_message(
            frame,
            area,
            "My Team",
            "No players selected yet. Add some from the Players tab.".to_string(),
            Color::DarkGray,
        );
        return;
    }

    let header = Row::new(vec![
        Cell::from("Name"),
        Cell::from("University"),
        Cell::from("Category"),
        Cell::from("Price"),
    ])
    .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = visible
        .iter()
        .map(|m| {
            let style = if state.pending.contains(m.id()) {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(m.player.name.clone()),
                Cell::from(m.player.university.clone()),
                Cell::from(m.player.category.label()),
                Cell::from(format_currency(m.value)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Min(16),
        Constraint::Min(12),
        Constraint::Length(12),
        Constraint::Length(13),
    ];

    let mut title = format!("My Team ({}/{})", team.members.len(), team.max_players);
    let search = state.search_text(TabId::MyTeam);
    if !search.is_empty() {
        title.push_str(&format!(" /{search}"));
    }

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol(">> ");

    let mut table_state = TableState::default();
    if !visible.is_empty() {
        table_state.select(Some(state.selected_index(TabId::MyTeam)));
    }
    frame.render_stateful_widget(table, area, &mut table_state);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
