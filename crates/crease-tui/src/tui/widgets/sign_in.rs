// Sign-in / sign-up form.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::confirm::centered_rect;
use crate::tui::{AuthField, AuthForm, ViewState};

const FORM_WIDTH: u16 = 52;
const FORM_HEIGHT: u16 = 12;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let form = &state.auth;
    let form_area = centered_rect(FORM_WIDTH, FORM_HEIGHT, area);

    let title = if form.sign_up { " Sign Up " } else { " Sign In " };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let paragraph = Paragraph::new(form_lines(form)).block(block);
    frame.render_widget(paragraph, form_area);
}

fn form_lines(form: &AuthForm) -> Vec<Line<'static>> {
    let masked = "*".repeat(form.password.chars().count());
    let mut lines = vec![Line::raw("")];
    lines.push(field_line("Username", &form.username, form.focus == AuthField::Username));
    lines.push(error_line(form.errors.username.as_deref()));
    lines.push(field_line("Password", &masked, form.focus == AuthField::Password));
    lines.push(error_line(form.errors.password.as_deref()));
    lines.push(Line::raw(""));

    let action = if form.submitting {
        Span::styled("  Please wait...", Style::default().fg(Color::DarkGray))
    } else if form.sign_up {
        Span::styled("  Enter to create account", Style::default().fg(Color::Green))
    } else {
        Span::styled("  Enter to sign in", Style::default().fg(Color::Green))
    };
    lines.push(Line::from(action));

    let switch = if form.sign_up {
        "  Already registered? Ctrl+R to sign in"
    } else {
        "  No account? Ctrl+R to sign up"
    };
    lines.push(Line::styled(switch, Style::default().fg(Color::DarkGray)));
    lines
}

fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let marker = if focused { "> " } else { "  " };
    let value_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        Span::raw(format!("{marker}{label:<10}")),
        Span::styled(format!("{value}{cursor}"), value_style),
    ])
}

fn error_line(error: Option<&str>) -> Line<'static> {
    match error {
        Some(msg) => Line::styled(format!("            {msg}"), Style::default().fg(Color::Red)),
        None => Line::raw(""),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
