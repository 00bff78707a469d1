// Tab bar widget: numbered tabs for the current mode, active one highlighted.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crease_app::protocol::{Mode, TabId};

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(tab_spans(state.mode, state.active_tab)));
    frame.render_widget(paragraph, area);
}

/// E.g. "[1:Players] [2:My Team] [3:Leaderboard]"
pub fn tab_spans(mode: Mode, active: TabId) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (i, tab) in mode.tabs().iter().enumerate() {
        let style = if *tab == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{}:{}]", i + 1, tab.title()), style));
        spans.push(Span::raw(" "));
    }
    spans
}
