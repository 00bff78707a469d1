// Status bar widget: mode, signed-in user and the latest notice.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crease_app::protocol::{Notice, NoticeLevel};

use crate::tui::ViewState;

/// Layout: [Crease <mode>] [user] [notice]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = vec![Span::styled(
        format!(" Crease {} ", state.mode.label()),
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD),
    )];

    let user = match &state.username {
        Some(name) => format!(" {name} "),
        None => " not signed in ".to_string(),
    };
    spans.push(Span::styled(user, Style::default().fg(Color::White)));

    if let Some(notice) = &state.notice {
        spans.push(Span::styled("| ", Style::default().fg(Color::Gray)));
        spans.push(notice_span(notice));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

pub fn notice_span(notice: &Notice) -> Span<'static> {
    let color = match notice.level {
        NoticeLevel::Info => Color::Cyan,
        NoticeLevel::Error => Color::Red,
    };
    Span::styled(notice.text.clone(), Style::default().fg(color))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
