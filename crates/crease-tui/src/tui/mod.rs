// Terminal UI: view state, update handling and the render loop.
//
// The TUI owns a `ViewState` that mirrors what the app loop reports. The app
// loop pushes `UiUpdate` messages over an mpsc channel; the TUI applies them
// to `ViewState` and re-renders at ~30 fps. Key presses become either local
// `ViewState` changes or `UserCommand`s sent back to the app loop.

pub mod input;
pub mod layout;
pub mod widgets;

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;

use crease_app::protocol::{Mode, Notice, TabId, TeamSnapshot, UiUpdate, UserCommand};
use crease_core::model::{LeaderboardEntry, Player, PlayerId, TournamentSummary};
use crease_cricket::filter::{self, CategoryFilter};
use crease_cricket::forms::{CredentialErrors, PlayerField, PlayerForm};
use crease_cricket::selection::SelectedPlayer;

use layout::build_layout;

// ---------------------------------------------------------------------------
// Loadable
// ---------------------------------------------------------------------------

/// Data behind a panel: still loading, loaded, or failed with a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Loadable<T> {
    pub fn from_result(result: Result<T, String>) -> Self {
        match result {
            Ok(value) => Loadable::Loaded(value),
            Err(message) => Loadable::Failed(message),
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Loadable::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Forms and overlays
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Username,
    Password,
}

/// The sign-in / sign-up form.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthForm {
    pub username: String,
    pub password: String,
    pub focus: AuthField,
    /// Sign-up instead of sign-in.
    pub sign_up: bool,
    pub errors: CredentialErrors,
    /// A request is in flight; Enter is ignored until it answers.
    pub submitting: bool,
}

impl Default for AuthForm {
    fn default() -> Self {
        AuthForm {
            username: String::new(),
            password: String::new(),
            focus: AuthField::Username,
            sign_up: false,
            errors: CredentialErrors::default(),
            submitting: false,
        }
    }
}

/// The admin create/edit player form.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerFormState {
    pub form: PlayerForm,
    /// `None` when creating a new player.
    pub editing: Option<PlayerId>,
    pub focus: PlayerField,
    pub errors: Vec<(PlayerField, String)>,
    pub saving: bool,
}

impl PlayerFormState {
    pub fn create() -> Self {
        PlayerFormState {
            form: PlayerForm::default(),
            editing: None,
            focus: PlayerField::Name,
            errors: Vec::new(),
            saving: false,
        }
    }

    pub fn edit(player: &Player) -> Self {
        PlayerFormState {
            form: PlayerForm::from_draft(&player.to_draft()),
            editing: Some(player.id.clone()),
            ..Self::create()
        }
    }

    pub fn error_for(&self, field: PlayerField) -> Option<&str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, msg)| msg.as_str())
    }
}

/// Modal drawn over the main panel.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    PlayerDetail(Box<Player>),
    PlayerForm(Box<PlayerFormState>),
    ConfirmDelete { id: PlayerId, name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    SignIn,
    Main,
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the application state for rendering.
pub struct ViewState {
    pub mode: Mode,
    pub screen: Screen,
    pub username: Option<String>,
    pub auth: AuthForm,
    pub active_tab: TabId,
    pub players: Loadable<Vec<Player>>,
    pub team: Loadable<TeamSnapshot>,
    pub leaderboard: Loadable<Vec<LeaderboardEntry>>,
    pub summary: Loadable<TournamentSummary>,
    pub notice: Option<Notice>,
    /// Search text per tab.
    pub search: HashMap<TabId, String>,
    /// Whether keystrokes currently go to the search box.
    pub filter_mode: bool,
    pub category_filter: CategoryFilter,
    /// Highlighted row per tab, as an index into the filtered rows.
    pub selected: HashMap<TabId, usize>,
    pub leaderboard_page: usize,
    /// Players with a team add/remove awaiting the server.
    pub pending: HashSet<PlayerId>,
    pub overlay: Option<Overlay>,
    pub confirm_quit: bool,
}

impl ViewState {
    pub fn new(mode: Mode) -> Self {
        ViewState {
            mode,
            screen: Screen::SignIn,
            username: None,
            auth: AuthForm::default(),
            active_tab: mode.default_tab(),
            players: Loadable::Loading,
            team: Loadable::Loading,
            leaderboard: Loadable::Loading,
            summary: Loadable::Loading,
            notice: None,
            search: HashMap::new(),
            filter_mode: false,
            category_filter: CategoryFilter::default(),
            selected: HashMap::new(),
            leaderboard_page: 0,
            pending: HashSet::new(),
            overlay: None,
            confirm_quit: false,
        }
    }

    pub fn search_text(&self, tab: TabId) -> &str {
        self.search.get(&tab).map(String::as_str).unwrap_or("")
    }

    pub fn selected_index(&self, tab: TabId) -> usize {
        self.selected.get(&tab).copied().unwrap_or(0)
    }

    /// Players passing the active tab's search and the category filter.
    pub fn visible_players(&self) -> Vec<&Player> {
        match self.players.loaded() {
            Some(players) => filter::filter_players(
                players,
                self.search_text(self.active_tab),
                self.category_filter,
            ),
            None => Vec::new(),
        }
    }

    pub fn visible_team(&self) -> Vec<&SelectedPlayer> {
        match self.team.loaded() {
            Some(team) => filter::filter_team(&team.members, self.search_text(TabId::MyTeam)),
            None => Vec::new(),
        }
    }

    pub fn visible_leaderboard(&self) -> Vec<&LeaderboardEntry> {
        match self.leaderboard.loaded() {
            Some(rows) => filter::filter_leaderboard(rows, self.search_text(TabId::Leaderboard)),
            None => Vec::new(),
        }
    }

    /// Number of selectable rows on `tab`.
    pub fn row_count(&self, tab: TabId) -> usize {
        match tab {
            TabId::Players | TabId::Roster => self.visible_players().len(),
            TabId::MyTeam => self.visible_team().len(),
            TabId::Leaderboard | TabId::Summary => 0,
        }
    }

    /// The highlighted player on the Players or Roster tab.
    pub fn selected_player(&self) -> Option<&Player> {
        let index = self.selected_index(self.active_tab);
        self.visible_players().get(index).copied()
    }

    /// The highlighted member on the My Team tab.
    pub fn selected_member(&self) -> Option<&SelectedPlayer> {
        self.visible_team()
            .get(self.selected_index(TabId::MyTeam))
            .copied()
    }

    pub fn in_team(&self, id: &PlayerId) -> bool {
        self.team.loaded().is_some_and(|t| t.contains(id))
    }

    /// Keep every highlighted row inside its (possibly shrunken) table.
    fn clamp_selection(&mut self) {
        for tab in [TabId::Players, TabId::Roster, TabId::MyTeam] {
            let count = if tab == TabId::MyTeam {
                self.visible_team().len()
            } else {
                match self.players.loaded() {
                    Some(players) => filter::filter_players(
                        players,
                        self.search_text(tab),
                        self.category_filter,
                    )
                    .len(),
                    None => 0,
                }
            };
            if let Some(index) = self.selected.get_mut(&tab) {
                *index = (*index).min(count.saturating_sub(1));
            }
        }
    }

    /// Drop everything that belongs to the signed-in user.
    fn reset_user_data(&mut self) {
        self.players = Loadable::Loading;
        self.team = Loadable::Loading;
        self.leaderboard = Loadable::Loading;
        self.summary = Loadable::Loading;
        self.search.clear();
        self.filter_mode = false;
        self.category_filter = CategoryFilter::default();
        self.selected.clear();
        self.leaderboard_page = 0;
        self.pending.clear();
        self.overlay = None;
        self.active_tab = self.mode.default_tab();
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::SignedIn { username } => {
            state.screen = Screen::Main;
            state.auth = AuthForm::default();
            state.reset_user_data();
            state.notice = Some(Notice::info(format!("Signed in as {username}")));
            state.username = Some(username);
        }
        UiUpdate::SignedOut { reason } => {
            state.screen = Screen::SignIn;
            state.username = None;
            state.auth.password.clear();
            state.auth.submitting = false;
            state.reset_user_data();
            state.notice = reason.map(Notice::error);
        }
        UiUpdate::AuthFailed(errors) => {
            state.auth.errors = errors;
            state.auth.submitting = false;
        }
        UiUpdate::Registered { username } => {
            state.auth = AuthForm {
                username,
                focus: AuthField::Password,
                ..AuthForm::default()
            };
            state.notice = Some(Notice::info("Account created, please sign in"));
        }
        UiUpdate::Players(result) => {
            state.players = Loadable::from_result(result);
            state.clamp_selection();
        }
        UiUpdate::Team(result) => {
            state.team = Loadable::from_result(result);
            state.clamp_selection();
        }
        UiUpdate::Leaderboard(result) => {
            state.leaderboard = Loadable::from_result(result);
        }
        UiUpdate::Summary(result) => {
            state.summary = Loadable::from_result(result);
        }
        UiUpdate::PlayerDetail(player) => {
            // Only refresh an open detail view, or open one if nothing else is up.
            let show = match &state.overlay {
                None => true,
                Some(Overlay::PlayerDetail(open)) => open.id == player.id,
                Some(_) => false,
            };
            if show {
                state.overlay = Some(Overlay::PlayerDetail(player));
            }
        }
        UiUpdate::MutationSettled { player_id, .. } => {
            state.pending.remove(&player_id);
        }
        UiUpdate::PlayerSaved(_) => {
            if matches!(state.overlay, Some(Overlay::PlayerForm(_))) {
                state.overlay = None;
            }
        }
        UiUpdate::PlayerDeleted(id) => {
            let showing = match &state.overlay {
                Some(Overlay::PlayerDetail(player)) => player.id == id,
                Some(Overlay::ConfirmDelete { id: pending, .. }) => *pending == id,
                _ => false,
            };
            if showing {
                state.overlay = None;
            }
        }
        UiUpdate::Notice(notice) => {
            if let Some(Overlay::PlayerForm(form)) = &mut state.overlay {
                form.saving = false;
            }
            state.notice = Some(notice);
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete frame for the current screen.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area(), state.mode);

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::help_bar::render(frame, layout.help_bar, state);

    match state.screen {
        Screen::SignIn => {
            widgets::sign_in::render(frame, layout.body, state);
        }
        Screen::Main => {
            widgets::tab_bar::render(frame, layout.tab_bar, state);
            match state.active_tab {
                TabId::Players => widgets::players::render(frame, layout.main_panel, state),
                TabId::MyTeam => widgets::team::render(frame, layout.main_panel, state),
                TabId::Leaderboard => widgets::leaderboard::render(frame, layout.main_panel, state),
                TabId::Summary => widgets::summary::render(frame, layout.main_panel, state),
                TabId::Roster => widgets::roster::render(frame, layout.main_panel, state),
            }
            if let Some(sidebar) = layout.sidebar {
                widgets::budget::render(frame, sidebar, state);
            }
            match &state.overlay {
                Some(Overlay::PlayerDetail(player)) => {
                    widgets::player_detail::render(frame, layout.body, player);
                }
                Some(Overlay::PlayerForm(form)) => {
                    widgets::player_form::render(frame, layout.body, form);
                }
                Some(Overlay::ConfirmDelete { name, .. }) => {
                    widgets::confirm::render(frame, layout.body, " Delete player? ", &format!("Delete {name}?"));
                }
                None => {}
            }
        }
    }

    if state.confirm_quit {
        widgets::confirm::render(frame, frame.area(), " Quit? ", "Really quit?");
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// Initializes the terminal, installs a panic hook that restores it, then
/// selects over UI updates, keyboard input and the render tick until the
/// user quits or the app loop hangs up.
pub async fn run(
    mode: Mode,
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::new(mode);
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // App loop has shut down
                    None => break Ok(()),
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break Ok(());
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(anyhow::Error::new(e).context("terminal input error")),
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &view_state)) {
                    break Err(anyhow::Error::new(e).context("failed to draw frame"));
                }
            }
        }
    };

    ratatui::restore();
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crease_core::model::{Category, PlayerStats, TopScorer, TopWicketTaker};
    use crease_cricket::selection::TeamSelection;

    pub(crate) fn player(id: &str, name: &str, category: Category, is_new: bool) -> Player {
        Player {
            id: PlayerId::new(id),
            name: name.into(),
            university: "University of Moratuwa".into(),
            category,
            stats: PlayerStats {
                total_runs: 500.0,
                balls_faced: 400.0,
                innings_played: 10.0,
                ..PlayerStats::default()
            },
            is_new_player: is_new,
        }
    }

    pub(crate) fn sample_players() -> Vec<Player> {
        vec![
            player("p1", "Danushka Kumara", Category::Batsman, false),
            player("p2", "Isuru Udana", Category::Bowler, true),
            player("p3", "Kamindu Mendis", Category::AllRounder, false),
        ]
    }

    pub(crate) fn team_with(players: &[Player]) -> TeamSnapshot {
        let mut selection = TeamSelection::new(9_000_000, 11);
        for p in players {
            selection.add(SelectedPlayer::priced(p.clone())).unwrap();
        }
        TeamSnapshot::of(&selection)
    }

    pub(crate) fn sample_summary() -> TournamentSummary {
        TournamentSummary {
            total_runs: 12_450,
            total_wickets: 380,
            highest_run: TopScorer {
                player: "Chamika Bandara".into(),
                runs: 642,
            },
            highest_wicket: TopWicketTaker {
                player: "Lahiru Madushanka".into(),
                wickets: 31,
            },
        }
    }

    /// A signed-in portal view with players and an empty team loaded.
    pub(crate) fn loaded_portal() -> ViewState {
        let mut state = ViewState::new(Mode::Portal);
        apply_ui_update(&mut state, UiUpdate::SignedIn { username: "kasun".into() });
        apply_ui_update(&mut state, UiUpdate::Players(Ok(sample_players())));
        apply_ui_update(&mut state, UiUpdate::Team(Ok(team_with(&[]))));
        apply_ui_update(
            &mut state,
            UiUpdate::Leaderboard(Ok(vec![LeaderboardEntry {
                username: "kasun".into(),
                total_points: 320.5,
            }])),
        );
        state
    }

    /// A signed-in admin view with the roster and summary loaded.
    pub(crate) fn loaded_admin() -> ViewState {
        let mut state = ViewState::new(Mode::Admin);
        apply_ui_update(&mut state, UiUpdate::SignedIn { username: "admin".into() });
        apply_ui_update(&mut state, UiUpdate::Players(Ok(sample_players())));
        apply_ui_update(&mut state, UiUpdate::Summary(Ok(sample_summary())));
        state
    }

    pub(crate) fn draw(state: &ViewState, width: u16, height: u16) -> String {
        let backend = ratatui::backend::TestBackend::new(width, height);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render_frame(frame, state))
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    pub(crate) fn buffer_text(buffer: &ratatui::buffer::Buffer) -> String {
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn new_view_starts_on_sign_in() {
        let state = ViewState::new(Mode::Portal);
        assert_eq!(state.screen, Screen::SignIn);
        assert_eq!(state.active_tab, TabId::Players);
        assert_eq!(state.players, Loadable::Loading);
        assert!(state.pending.is_empty());
        assert!(!state.confirm_quit);
        assert_eq!(ViewState::new(Mode::Admin).active_tab, TabId::Summary);
    }

    #[test]
    fn signed_in_switches_to_main_screen() {
        let state = loaded_portal();
        assert_eq!(state.screen, Screen::Main);
        assert_eq!(state.username.as_deref(), Some("kasun"));
        assert_eq!(state.visible_players().len(), 3);
    }

    #[test]
    fn signed_out_clears_user_data() {
        let mut state = loaded_portal();
        state.pending.insert(PlayerId::new("p1"));
        apply_ui_update(
            &mut state,
            UiUpdate::SignedOut {
                reason: Some("Session expired, please sign in again".into()),
            },
        );
        assert_eq!(state.screen, Screen::SignIn);
        assert_eq!(state.players, Loadable::Loading);
        assert!(state.pending.is_empty());
        assert!(state.notice.as_ref().unwrap().text.contains("expired"));
    }

    #[test]
    fn auth_failed_sets_field_errors() {
        let mut state = ViewState::new(Mode::Portal);
        state.auth.submitting = true;
        apply_ui_update(
            &mut state,
            UiUpdate::AuthFailed(CredentialErrors::rejected("Invalid username or password")),
        );
        assert!(!state.auth.submitting);
        assert_eq!(
            state.auth.errors.password.as_deref(),
            Some("Invalid username or password")
        );
    }

    #[test]
    fn registered_returns_to_sign_in_with_username() {
        let mut state = ViewState::new(Mode::Portal);
        state.auth.sign_up = true;
        apply_ui_update(&mut state, UiUpdate::Registered { username: "amaya".into() });
        assert!(!state.auth.sign_up);
        assert_eq!(state.auth.username, "amaya");
        assert_eq!(state.auth.focus, AuthField::Password);
    }

    #[test]
    fn failed_load_is_kept_as_message() {
        let mut state = loaded_portal();
        apply_ui_update(&mut state, UiUpdate::Players(Err("network error".into())));
        assert_eq!(state.players, Loadable::Failed("network error".into()));
        assert!(state.visible_players().is_empty());
    }

    #[test]
    fn mutation_settled_clears_pending() {
        let mut state = loaded_portal();
        state.pending.insert(PlayerId::new("p1"));
        apply_ui_update(
            &mut state,
            UiUpdate::MutationSettled {
                player_id: PlayerId::new("p1"),
                ok: false,
            },
        );
        assert!(state.pending.is_empty());
    }

    #[test]
    fn selection_is_clamped_when_list_shrinks() {
        let mut state = loaded_portal();
        state.selected.insert(TabId::Players, 2);
        apply_ui_update(&mut state, UiUpdate::Players(Ok(sample_players()[..1].to_vec())));
        assert_eq!(state.selected_index(TabId::Players), 0);
    }

    #[test]
    fn player_saved_closes_form() {
        let mut state = loaded_admin();
        state.overlay = Some(Overlay::PlayerForm(Box::new(PlayerFormState::create())));
        apply_ui_update(&mut state, UiUpdate::PlayerSaved(Box::new(sample_players()[1].clone())));
        assert!(state.overlay.is_none());
    }

    #[test]
    fn error_notice_reenables_form() {
        let mut state = loaded_admin();
        let mut form = PlayerFormState::create();
        form.saving = true;
        state.overlay = Some(Overlay::PlayerForm(Box::new(form)));
        apply_ui_update(&mut state, UiUpdate::Notice(Notice::error("Saving player failed")));
        let Some(Overlay::PlayerForm(form)) = &state.overlay else {
            panic!("form should stay open");
        };
        assert!(!form.saving);
    }

    #[test]
    fn player_detail_does_not_replace_other_overlays() {
        let mut state = loaded_admin();
        state.overlay = Some(Overlay::ConfirmDelete {
            id: PlayerId::new("p2"),
            name: "Isuru Udana".into(),
        });
        apply_ui_update(&mut state, UiUpdate::PlayerDetail(Box::new(sample_players()[0].clone())));
        assert!(matches!(state.overlay, Some(Overlay::ConfirmDelete { .. })));
    }

    #[test]
    fn render_sign_in_screen() {
        let state = ViewState::new(Mode::Portal);
        let text = draw(&state, 100, 30);
        assert!(text.contains("Sign In"));
        assert!(text.contains("Username"));
    }

    #[test]
    fn render_every_portal_tab() {
        let mut state = loaded_portal();
        for tab in Mode::Portal.tabs() {
            state.active_tab = *tab;
            let text = draw(&state, 120, 30);
            assert!(text.contains(tab.title()), "missing title for {tab:?}");
        }
    }

    #[test]
    fn render_every_admin_tab_and_overlay() {
        let mut state = loaded_admin();
        state.active_tab = TabId::Roster;
        state.overlay = Some(Overlay::PlayerForm(Box::new(PlayerFormState::create())));
        let text = draw(&state, 120, 40);
        assert!(text.contains("New Player"));

        state.overlay = Some(Overlay::ConfirmDelete {
            id: PlayerId::new("p2"),
            name: "Isuru Udana".into(),
        });
        let text = draw(&state, 120, 40);
        assert!(text.contains("Delete Isuru Udana?"));
    }

    #[test]
    fn render_quit_confirmation_on_top() {
        let mut state = loaded_portal();
        state.confirm_quit = true;
        let text = draw(&state, 100, 30);
        assert!(text.contains("Really quit?"));
    }

    #[test]
    fn render_tiny_terminal_does_not_panic() {
        let state = loaded_portal();
        draw(&state, 10, 4);
        let state = ViewState::new(Mode::Admin);
        draw(&state, 10, 4);
    }
}
