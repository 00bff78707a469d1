// Application state and the command loop.
//
// The loop owns the session, the roster and the user's team. It reads one
// `UserCommand` at a time, performs the API calls it implies and pushes the
// results to the TUI as `UiUpdate`s. A command's round trip finishes before
// the next one is read.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crease_core::api::{ApiError, FantasyApi};
use crease_core::config::Config;
use crease_core::model::{Player, PlayerDraft, PlayerId};
use crease_core::session::Session;
use crease_cricket::forms::{
    self, CredentialErrors, MSG_INVALID_CREDENTIALS, MSG_REGISTRATION_FAILED,
};
use crease_cricket::selection::TeamSelection;

use crate::mutation::{MutationError, MutationHandler, TeamMutation};
use crate::protocol::{Mode, Notice, TabId, TeamSnapshot, UiUpdate, UserCommand};

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub config: Config,
    pub mode: Mode,
    pub api: Arc<dyn FantasyApi>,
    pub session: Session,
    /// Last roster fetched from the players endpoint.
    pub players: Vec<Player>,
    pub selection: TeamSelection,
    pub mutations: MutationHandler,
    pub active_tab: TabId,
}

impl AppState {
    pub fn new(config: Config, mode: Mode, api: Arc<dyn FantasyApi>, session: Session) -> Self {
        let selection = TeamSelection::from_config(&config.team);
        AppState {
            config,
            mode,
            api,
            session,
            players: Vec::new(),
            selection,
            mutations: MutationHandler::new(),
            active_tab: mode.default_tab(),
        }
    }

    /// Token and user id of the signed-in user, cloned so the caller can
    /// mutate the rest of the state while holding them.
    fn credentials(&self) -> Result<(String, String), ApiError> {
        self.session
            .current()
            .map(|s| (s.access_token.clone(), s.user_id.clone()))
            .ok_or(ApiError::NotSignedIn)
    }

    fn clear_user_data(&mut self) {
        self.players.clear();
        self.selection.clear();
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the command loop until `Quit` arrives or the TUI hangs up.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started in {} mode", state.mode.label());

    if let Some(info) = state.session.current() {
        let username = info.username.clone();
        let _ = ui_tx.send(UiUpdate::SignedIn { username }).await;
        load_all(&mut state, &ui_tx).await;
    } else {
        let _ = ui_tx.send(UiUpdate::SignedOut { reason: None }).await;
    }

    while let Some(cmd) = cmd_rx.recv().await {
        if cmd == UserCommand::Quit {
            info!("Quit command received, shutting down");
            break;
        }
        handle_user_command(&mut state, cmd, &ui_tx).await;
    }

    info!("Application event loop exiting");
    Ok(())
}

async fn handle_user_command(state: &mut AppState, cmd: UserCommand, ui_tx: &mpsc::Sender<UiUpdate>) {
    debug!("Handling command: {}", command_name(&cmd));
    match cmd {
        UserCommand::SignIn { username, password } => {
            sign_in(state, username, password, ui_tx).await;
        }
        UserCommand::SignUp { username, password } => {
            sign_up(state, username, password, ui_tx).await;
        }
        UserCommand::SignOut => {
            sign_out(state, None, ui_tx).await;
        }
        UserCommand::SwitchTab(tab) => {
            state.active_tab = tab;
            info!("Switched to tab: {:?}", tab);
        }
        UserCommand::Refresh(tab) => {
            load_tab(state, tab, ui_tx).await;
        }
        UserCommand::AddToTeam(id) => {
            mutate_team(state, id, true, ui_tx).await;
        }
        UserCommand::RemoveFromTeam(id) => {
            mutate_team(state, id, false, ui_tx).await;
        }
        UserCommand::ViewPlayer(id) => {
            view_player(state, id, ui_tx).await;
        }
        UserCommand::CreatePlayer(draft) => {
            save_player(state, None, draft, ui_tx).await;
        }
        UserCommand::UpdatePlayer { id, draft } => {
            save_player(state, Some(id), draft, ui_tx).await;
        }
        UserCommand::DeletePlayer(id) => {
            delete_player(state, id, ui_tx).await;
        }
        UserCommand::Quit => {
            // Handled in the main loop
        }
    }
}

fn command_name(cmd: &UserCommand) -> &'static str {
    // Never log credentials.
    match cmd {
        UserCommand::SignIn { .. } => "SignIn",
        UserCommand::SignUp { .. } => "SignUp",
        UserCommand::SignOut => "SignOut",
        UserCommand::SwitchTab(_) => "SwitchTab",
        UserCommand::Refresh(_) => "Refresh",
        UserCommand::AddToTeam(_) => "AddToTeam",
        UserCommand::RemoveFromTeam(_) => "RemoveFromTeam",
        UserCommand::ViewPlayer(_) => "ViewPlayer",
        UserCommand::CreatePlayer(_) => "CreatePlayer",
        UserCommand::UpdatePlayer { .. } => "UpdatePlayer",
        UserCommand::DeletePlayer(_) => "DeletePlayer",
        UserCommand::Quit => "Quit",
    }
}

async fn notify(ui_tx: &mpsc::Sender<UiUpdate>, notice: Notice) {
    let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
}

/// Common handling for a failed authenticated call: an expired or rejected
/// token ends the session, anything else becomes an error notice.
async fn report_api_error(state: &mut AppState, what: &str, err: &ApiError, ui_tx: &mpsc::Sender<UiUpdate>) {
    warn!("{} failed: {}", what, err);
    if err.is_unauthorized() && state.session.is_signed_in() {
        sign_out(state, Some("Session expired, please sign in again".to_string()), ui_tx).await;
    } else {
        notify(ui_tx, Notice::error(format!("{what} failed: {err}"))).await;
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

async fn sign_in(state: &mut AppState, username: String, password: String, ui_tx: &mpsc::Sender<UiUpdate>) {
    if let Err(errors) = forms::validate_sign_in(&username, &password) {
        let _ = ui_tx.send(UiUpdate::AuthFailed(errors)).await;
        return;
    }

    let login = match state.api.login(username.trim(), &password).await {
        Ok(login) => login,
        Err(e) => {
            warn!("Sign-in failed for {}: {}", username.trim(), e);
            let message = match e {
                ApiError::Network(_) => format!("Cannot reach server: {e}"),
                _ => MSG_INVALID_CREDENTIALS.to_string(),
            };
            let _ = ui_tx
                .send(UiUpdate::AuthFailed(CredentialErrors::rejected(&message)))
                .await;
            return;
        }
    };

    let username = match state.session.sign_in(login) {
        Ok(info) => info.username.clone(),
        Err(e) => {
            error!("Failed to persist session: {:#}", e);
            notify(ui_tx, Notice::error(format!("Could not save session: {e}"))).await;
            return;
        }
    };
    state.active_tab = state.mode.default_tab();
    let _ = ui_tx.send(UiUpdate::SignedIn { username }).await;
    load_all(state, ui_tx).await;
}

async fn sign_up(state: &mut AppState, username: String, password: String, ui_tx: &mpsc::Sender<UiUpdate>) {
    if let Err(errors) = forms::validate_sign_up(&username, &password) {
        let _ = ui_tx.send(UiUpdate::AuthFailed(errors)).await;
        return;
    }

    let username = username.trim().to_string();
    match state.api.register(&username, &password).await {
        Ok(()) => {
            info!("Registered new account {}", username);
            let _ = ui_tx.send(UiUpdate::Registered { username }).await;
        }
        Err(e) => {
            warn!("Registration failed for {}: {}", username, e);
            let _ = ui_tx
                .send(UiUpdate::AuthFailed(CredentialErrors::rejected(MSG_REGISTRATION_FAILED)))
                .await;
        }
    }
}

async fn sign_out(state: &mut AppState, reason: Option<String>, ui_tx: &mpsc::Sender<UiUpdate>) {
    if let Err(e) = state.session.sign_out() {
        error!("Failed to clear persisted session: {:#}", e);
    }
    state.clear_user_data();
    let _ = ui_tx.send(UiUpdate::SignedOut { reason }).await;
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load every tab of the current mode, e.g. right after signing in.
async fn load_all(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    for &tab in state.mode.tabs() {
        load_tab(state, tab, ui_tx).await;
        if !state.session.is_signed_in() {
            break;
        }
    }
}

async fn load_tab(state: &mut AppState, tab: TabId, ui_tx: &mpsc::Sender<UiUpdate>) {
    match tab {
        TabId::Players | TabId::Roster => load_players(state, ui_tx).await,
        TabId::MyTeam => load_team(state, ui_tx).await,
        TabId::Leaderboard => load_leaderboard(state, ui_tx).await,
        TabId::Summary => load_summary(state, ui_tx).await,
    }
}

async fn load_players(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let result = match state.credentials() {
        Ok((token, _)) => state.api.list_players(&token).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(players) => {
            info!("Loaded {} players", players.len());
            state.players = players.clone();
            let _ = ui_tx.send(UiUpdate::Players(Ok(players))).await;
        }
        Err(e) => {
            let _ = ui_tx.send(UiUpdate::Players(Err(e.to_string()))).await;
            report_api_error(state, "Loading players", &e, ui_tx).await;
        }
    }
}

async fn load_team(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let result = match state.credentials() {
        Ok((token, user_id)) => state.api.get_team(&token, &user_id).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(entries) => {
            state.selection.replace_members(entries);
            info!("Loaded team with {} members", state.selection.len());
            let snapshot = TeamSnapshot::of(&state.selection);
            let _ = ui_tx.send(UiUpdate::Team(Ok(snapshot))).await;
        }
        Err(e) => {
            let _ = ui_tx.send(UiUpdate::Team(Err(e.to_string()))).await;
            report_api_error(state, "Loading team", &e, ui_tx).await;
        }
    }
}

async fn load_leaderboard(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let result = match state.credentials() {
        Ok((token, _)) => state.api.leaderboard(&token).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(mut rows) => {
            rows.sort_by(|a, b| b.total_points.total_cmp(&a.total_points));
            let _ = ui_tx.send(UiUpdate::Leaderboard(Ok(rows))).await;
        }
        Err(e) => {
            let _ = ui_tx.send(UiUpdate::Leaderboard(Err(e.to_string()))).await;
            report_api_error(state, "Loading leaderboard", &e, ui_tx).await;
        }
    }
}

async fn load_summary(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let result = match state.credentials() {
        Ok((token, _)) => state.api.tournament_summary(&token).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(summary) => {
            let _ = ui_tx.send(UiUpdate::Summary(Ok(summary))).await;
        }
        Err(e) => {
            let _ = ui_tx.send(UiUpdate::Summary(Err(e.to_string()))).await;
            report_api_error(state, "Loading tournament summary", &e, ui_tx).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Team mutations
// ---------------------------------------------------------------------------

async fn mutate_team(state: &mut AppState, player_id: PlayerId, add: bool, ui_tx: &mpsc::Sender<UiUpdate>) {
    let (token, user_id) = match state.credentials() {
        Ok(creds) => creds,
        Err(e) => {
            let _ = ui_tx
                .send(UiUpdate::MutationSettled { player_id, ok: false })
                .await;
            report_api_error(state, "Team change", &e, ui_tx).await;
            return;
        }
    };

    let mutation = if add {
        TeamMutation::add(player_id.clone(), user_id)
    } else {
        TeamMutation::remove(player_id.clone(), user_id)
    };
    let name = state
        .players
        .iter()
        .find(|p| p.id == player_id)
        .or_else(|| state.selection.get(&player_id).map(|m| &m.player))
        .map(|p| p.name.clone())
        .unwrap_or_else(|| player_id.to_string());

    let result = state
        .mutations
        .execute(
            state.api.as_ref(),
            &token,
            &mut state.selection,
            &state.players,
            mutation,
        )
        .await;

    let ok = result.is_ok();
    let _ = ui_tx
        .send(UiUpdate::MutationSettled {
            player_id: player_id.clone(),
            ok,
        })
        .await;

    match result {
        Ok(()) => {
            let verb = if add { "added to" } else { "removed from" };
            let snapshot = TeamSnapshot::of(&state.selection);
            let _ = ui_tx.send(UiUpdate::Team(Ok(snapshot))).await;
            notify(ui_tx, Notice::info(format!("{name} {verb} your team"))).await;
        }
        Err(MutationError::Remote(e)) => {
            report_api_error(state, "Team change", &e, ui_tx).await;
        }
        Err(e) => {
            info!("Team change for {} refused: {}", player_id, e);
            notify(ui_tx, Notice::error(e.to_string())).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Player administration
// ---------------------------------------------------------------------------

async fn view_player(state: &mut AppState, id: PlayerId, ui_tx: &mpsc::Sender<UiUpdate>) {
    let result = match state.credentials() {
        Ok((token, _)) => state.api.get_player(&token, &id).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(player) => {
            let _ = ui_tx.send(UiUpdate::PlayerDetail(Box::new(player))).await;
        }
        Err(e) => report_api_error(state, "Loading player", &e, ui_tx).await,
    }
}

/// Refuse to touch a player that is no longer flagged new.
fn ensure_editable(state: &AppState, id: &PlayerId) -> Result<(), String> {
    match state.players.iter().find(|p| &p.id == id) {
        Some(p) if p.is_editable() => Ok(()),
        Some(p) => Err(format!("{} is not a new player and cannot be changed", p.name)),
        None => Err(format!("Player {id} is not in the roster")),
    }
}

async fn save_player(state: &mut AppState, id: Option<PlayerId>, draft: PlayerDraft, ui_tx: &mpsc::Sender<UiUpdate>) {
    if let Some(id) = &id {
        if let Err(msg) = ensure_editable(state, id) {
            notify(ui_tx, Notice::error(msg)).await;
            return;
        }
    }
    let (token, _) = match state.credentials() {
        Ok(creds) => creds,
        Err(e) => return report_api_error(state, "Saving player", &e, ui_tx).await,
    };

    let result = match &id {
        Some(id) => state.api.update_player(&token, id, &draft).await,
        None => state.api.create_player(&token, &draft).await,
    };
    match result {
        Ok(player) => {
            let verb = if id.is_some() { "Updated" } else { "Created" };
            info!("{} player {} ({})", verb, player.name, player.id);
            notify(ui_tx, Notice::info(format!("{verb} {}", player.name))).await;
            let _ = ui_tx.send(UiUpdate::PlayerSaved(Box::new(player))).await;
            load_players(state, ui_tx).await;
        }
        Err(e) => report_api_error(state, "Saving player", &e, ui_tx).await,
    }
}

async fn delete_player(state: &mut AppState, id: PlayerId, ui_tx: &mpsc::Sender<UiUpdate>) {
    if let Err(msg) = ensure_editable(state, &id) {
        notify(ui_tx, Notice::error(msg)).await;
        return;
    }
    let (token, _) = match state.credentials() {
        Ok(creds) => creds,
        Err(e) => return report_api_error(state, "Deleting player", &e, ui_tx).await,
    };

    match state.api.delete_player(&token, &id).await {
        Ok(()) => {
            info!("Deleted player {}", id);
            state.players.retain(|p| p.id != id);
            let _ = ui_tx.send(UiUpdate::PlayerDeleted(id)).await;
            notify(ui_tx, Notice::info("Player deleted")).await;
            load_players(state, ui_tx).await;
        }
        Err(e) => report_api_error(state, "Deleting player", &e, ui_tx).await,
    }
}
