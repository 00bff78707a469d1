// Tournament summary widget for the admin console.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crease_core::model::TournamentSummary;

use super::{pending_text, render_message};
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let title = "Tournament Summary";
    let Some(summary) = state.summary.loaded() else {
        if let Some((text, color)) = pending_text("tournament summary", &state.summary) {
            render_message(frame, area, title, text, color);
        }
        return;
    };

    let paragraph = Paragraph::new(summary_lines(summary))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(paragraph, area);
}

fn summary_lines(summary: &TournamentSummary) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::Gray);
    let figure = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    vec![
        Line::raw(""),
        Line::from(vec![
            Span::styled("  Total runs:       ", label),
            Span::styled(summary.total_runs.to_string(), figure),
        ]),
        Line::from(vec![
            Span::styled("  Total wickets:    ", label),
            Span::styled(summary.total_wickets.to_string(), figure),
        ]),
        Line::raw(""),
        Line::from(vec![
            Span::styled("  Top run scorer:   ", label),
            Span::styled(summary.highest_run.player.clone(), figure),
            Span::raw(format!(" ({} runs)", summary.highest_run.runs)),
        ]),
        Line::from(vec![
            Span::styled("  Top wicket taker: ", label),
            Span::styled(summary.highest_wicket.player.clone(), figure),
            Span::raw(format!(" ({} wickets)", summary.highest_wicket.wickets)),
        ]),
    ]
}
