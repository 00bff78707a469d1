// Admin create/edit player form overlay.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crease_cricket::forms::PlayerField;

use super::confirm::centered_rect;
use crate::tui::PlayerFormState;

const WIDTH: u16 = 64;
// Nine fields, one error line each, plus the footer and borders.
const HEIGHT: u16 = 22;

pub fn render(frame: &mut Frame, area: Rect, state: &PlayerFormState) {
    let dialog = centered_rect(WIDTH, HEIGHT, area);
    frame.render_widget(Clear, dialog);

    let title = if state.editing.is_some() {
        " Edit Player "
    } else {
        " New Player "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let paragraph = Paragraph::new(form_lines(state))
        .block(block)
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog);
}

fn form_lines(state: &PlayerFormState) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(PlayerField::ALL.len() * 2 + 2);
    for field in PlayerField::ALL {
        let focused = state.focus == field;
        let marker = if focused { ">" } else { " " };
        let raw = state.form.get(field);
        let value = if field == PlayerField::Category {
            let shown = if raw.is_empty() { "select" } else { raw };
            format!("< {shown} >")
        } else if focused {
            format!("{raw}_")
        } else {
            raw.to_string()
        };
        let value_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(vec![
            Span::raw(format!("{marker} {:<16}", field.label())),
            Span::styled(value, value_style),
        ]));
        match state.error_for(field) {
            Some(msg) => lines.push(Line::styled(
                format!("  {:<16}{msg}", ""),
                Style::default().fg(Color::Red),
            )),
            None => lines.push(Line::raw("")),
        }
    }

    let footer = if state.saving {
        Span::styled("  Saving...", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled("  Enter to save, Esc to cancel", Style::default().fg(Color::Green))
    };
    lines.push(Line::from(footer));
    lines
}
