// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Tab Bar (1 row)                                   |
// +-------------------------+------------------------+
// | Main Panel (70%)         | Budget (30%, portal)   |
// +-------------------------+------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+
//
// The admin console has no sidebar; the main panel takes the full width.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crease_app::protocol::Mode;

/// Resolved screen areas.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: user, mode and the latest notice.
    pub status_bar: Rect,
    /// Everything between the status bar and the help bar. The sign-in
    /// screen and modal overlays are drawn here.
    pub body: Rect,
    pub tab_bar: Rect,
    pub main_panel: Rect,
    /// Budget panel, portal only.
    pub sidebar: Option<Rect>,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect, mode: Mode) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(3),    // body
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let status_bar = vertical[0];
    let body = vertical[1];
    let help_bar = vertical[2];

    let body_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(body);

    let tab_bar = body_rows[0];
    let middle = body_rows[1];

    let (main_panel, sidebar) = match mode {
        Mode::Portal => {
            let horizontal = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
                .split(middle);
            (horizontal[0], Some(horizontal[1]))
        }
        Mode::Admin => (middle, None),
    };

    AppLayout {
        status_bar,
        body,
        tab_bar,
        main_panel,
        sidebar,
        help_bar,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
