// Players widget: searchable, category-filtered table of every player.
//
// Columns: Name, University, Category, Points, Value. Players already in the
// team are marked with a check; players with a pending add/remove with a
// dot.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState};
use ratatui::Frame;

use crease_app::protocol::TabId;
use crease_core::model::Player;
use crease_cricket::valuation::{format_currency, points, value};

use super::{pending_text, render_message};
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    if let Some((text, color)) = pending_text("players", &state.players) {
        render_message(frame, area, "Players", text, color);
        return;
    }

    let visible = state.visible_players();

    let header = Row::new(vec![
        Cell::from(""),
        Cell::from("Name"),
        Cell::from("University"),
        Cell::from("Category"),
        Cell::from("Points"),
        Cell::from("Value"),
    ])
    .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = visible
        .iter()
        .map(|p| {
            let (marker, style) = row_marker(state, p);
            Row::new(vec![
                Cell::from(marker),
                Cell::from(p.name.clone()),
                Cell::from(p.university.clone()),
                Cell::from(p.category.label()),
                Cell::from(format!("{:.2}", points(&p.stats))),
                Cell::from(format_currency(value(&p.stats))),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(2),
        Constraint::Min(16),
        Constraint::Min(12),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(13),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(build_title(state, visible.len())),
        )
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol(">> ");

    let mut table_state = TableState::default();
    if !visible.is_empty() {
        table_state.select(Some(state.selected_index(TabId::Players)));
    }
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn row_marker(state: &ViewState, player: &Player) -> (&'static str, Style) {
    if state.pending.contains(&player.id) {
        ("•", Style::default().fg(Color::DarkGray))
    } else if state.in_team(&player.id) {
        ("✓", Style::default().fg(Color::Green))
    } else {
        ("", Style::default())
    }
}

/// "Players [Bowler] /ka (3)"
pub(crate) fn build_title(state: &ViewState, count: usize) -> Line<'static> {
    let mut title = String::from("Players");
    if state.category_filter.0.is_some() {
        title.push_str(&format!(" [{}]", state.category_filter.label()));
    }
    let search = state.search_text(state.active_tab);
    if !search.is_empty() || (state.filter_mode && state.active_tab == TabId::Players) {
        title.push_str(&format!(" /{search}"));
    }
    title.push_str(&format!(" ({count})"));
    Line::from(title)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
