// Admin roster widget: every player with value and the New badge.
//
// Only players carrying the badge can be edited or deleted.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState};
use ratatui::Frame;

use crease_app::protocol::TabId;
use crease_core::model::Player;
use crease_cricket::valuation::{format_currency, value};

use super::players::build_title;
use super::{pending_text, render_message};
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    if let Some((text, color)) = pending_text("players", &state.players) {
        render_message(frame, area, "Players", text, color);
        return;
    }

    let visible = state.visible_players();

    let header = Row::new(vec![
        Cell::from("Name"),
        Cell::from("University"),
        Cell::from("Category"),
        Cell::from("Value"),
    ])
    .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = visible
        .iter()
        .map(|p| {
            Row::new(vec![
                Cell::from(name_line(p)),
                Cell::from(p.university.clone()),
                Cell::from(p.category.label()),
                Cell::from(format_currency(value(&p.stats))),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(22),
        Constraint::Min(12),
        Constraint::Length(12),
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
        table_state.select(Some(state.selected_index(TabId::Roster)));
    }
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn name_line(player: &Player) -> Line<'static> {
    let mut spans = vec![Span::raw(player.name.clone())];
    if player.is_editable() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            "New",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}
