// Budget widget: spent, remaining and team size.
//
// Remaining turns red once it drops below zero, which happens only when
// the server reports a team that costs more than the configured budget.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::Frame;

use crease_app::protocol::TeamSnapshot;
use crease_cricket::valuation::{format_currency, format_signed_currency};

use super::pending_text;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default().borders(Borders::ALL).title("Budget");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(team) = state.team.loaded() else {
        if let Some((text, color)) = pending_text("team", &state.team) {
            frame.render_widget(
                Paragraph::new(text).style(Style::default().fg(color)),
                inner,
            );
        }
        return;
    };

    let lines = budget_lines(team);
    let text_height = lines.len() as u16;
    frame.render_widget(Paragraph::new(lines), inner);

    // Spend gauge below the figures, if there is room.
    if inner.height > text_height + 1 {
        let gauge_area = Rect {
            y: inner.y + text_height + 1,
            height: 1,
            ..inner
        };
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(spend_color(team)))
            .ratio(spend_ratio(team));
        frame.render_widget(gauge, gauge_area);
    }
}

pub fn budget_lines(team: &TeamSnapshot) -> Vec<Line<'static>> {
    let remaining_style = if team.remaining < 0 {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    };
    vec![
        Line::from(vec![
            Span::raw("Budget:    "),
            Span::raw(format_currency(team.budget)),
        ]),
        Line::from(vec![
            Span::raw("Spent:     "),
            Span::raw(format_currency(team.spent)),
        ]),
        Line::from(vec![
            Span::raw("Remaining: "),
            Span::styled(format_signed_currency(team.remaining), remaining_style),
        ]),
        Line::from(vec![
            Span::raw("Players:   "),
            Span::raw(format!("{}/{}", team.members.len(), team.max_players)),
        ]),
    ]
}

/// Fraction of the budget spent, clamped to [0, 1].
pub fn spend_ratio(team: &TeamSnapshot) -> f64 {
    if team.budget == 0 {
        return 1.0;
    }
    (team.spent as f64 / team.budget as f64).clamp(0.0, 1.0)
}

fn spend_color(team: &TeamSnapshot) -> Color {
    let ratio = spend_ratio(team);
    if team.remaining < 0 || ratio >= 0.9 {
        Color::Red
    } else if ratio >= 0.7 {
        Color::Yellow
    } else {
        Color::Green
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
