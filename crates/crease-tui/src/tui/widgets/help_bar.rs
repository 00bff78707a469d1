// Help bar widget: key hints for whatever currently has focus.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crease_app::protocol::TabId;

use crate::tui::{Overlay, Screen, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        hint_text(state),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

pub fn hint_text(state: &ViewState) -> &'static str {
    if state.confirm_quit {
        return " y:Quit | n/Esc:Cancel";
    }
    if state.screen == Screen::SignIn {
        return if state.auth.sign_up {
            " Tab:Next field | Enter:Sign up | Ctrl+R:Back to sign in | Esc:Quit"
        } else {
            " Tab:Next field | Enter:Sign in | Ctrl+R:Create account | Esc:Quit"
        };
    }
    if state.filter_mode {
        return " Type to search | Enter:Keep | Esc:Clear";
    }
    match &state.overlay {
        Some(Overlay::PlayerDetail(_)) => return " Esc:Close",
        Some(Overlay::PlayerForm(_)) => {
            return " Tab/Shift+Tab:Field | Space:Category | Enter:Save | Esc:Cancel"
        }
        Some(Overlay::ConfirmDelete { .. }) => return " y:Delete | n/Esc:Cancel",
        None => {}
    }
    match state.active_tab {
        TabId::Players => " a:Add | v:View | /:Search | c:Category | r:Refresh | L:Sign out | q:Quit",
        TabId::MyTeam => " d:Remove | v:View | /:Search | r:Refresh | L:Sign out | q:Quit",
        TabId::Leaderboard => " [/]:Page | /:Search | r:Refresh | L:Sign out | q:Quit",
        TabId::Summary => " 1-2:Tabs | r:Refresh | L:Sign out | q:Quit",
        TabId::Roster => {
            " n:New | e:Edit | x:Delete | v:View | /:Search | c:Category | L:Sign out | q:Quit"
        }
    }
}
