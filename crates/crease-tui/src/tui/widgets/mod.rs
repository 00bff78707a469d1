// TUI widget modules for each panel and overlay.

pub mod budget;
pub mod confirm;
pub mod help_bar;
pub mod leaderboard;
pub mod player_detail;
pub mod player_form;
pub mod players;
pub mod roster;
pub mod sign_in;
pub mod status_bar;
pub mod summary;
pub mod tab_bar;
pub mod team;

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::Loadable;

/// Panel text for data that is not loaded yet, or `None` once it is.
pub(crate) fn pending_text<T>(what: &str, data: &Loadable<T>) -> Option<(String, Color)> {
    match data {
        Loadable::Loading => Some((format!("Loading {what}..."), Color::DarkGray)),
        Loadable::Failed(message) => Some((
            format!("Failed to load {what}: {message} (r to retry)"),
            Color::Red,
        )),
        Loadable::Loaded(_) => None,
    }
}

/// Draw a bordered panel holding a single message.
pub(crate) fn render_message(frame: &mut Frame, area: Rect, title: &str, text: String, color: Color) {
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    frame.render_widget(paragraph, area);
}
