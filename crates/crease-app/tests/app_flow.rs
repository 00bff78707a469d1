// End-to-end tests of the app event loop.
//
// The loop runs on its own task against an in-memory backend; tests drive it
// through the command channel and assert on the UiUpdates that come back.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crease_app::app::{self, AppState};
use crease_app::import::import_players;
use crease_app::protocol::*;
use crease_core::api::{ApiError, FantasyApi, LoginResponse};
use crease_core::config::Config;
use crease_core::db::Database;
use crease_core::model::*;
use crease_core::session::Session;
use crease_cricket::forms::{MSG_INVALID_CREDENTIALS, MSG_PASSWORD_TOO_SHORT, MSG_USERNAME_REQUIRED};
use crease_cricket::valuation;

// ===========================================================================
// In-memory backend
// ===========================================================================

#[derive(Default)]
struct Backend {
    users: HashMap<String, String>,
    players: Vec<Player>,
    teams: HashMap<String, Vec<TeamEntry>>,
    leaderboard: Vec<LeaderboardEntry>,
    next_id: usize,
    /// When set, every token is rejected with a 401.
    revoked: bool,
    fail_team_mutations: bool,
}

#[derive(Default)]
struct FakeApi {
    backend: Mutex<Backend>,
}

fn status(status: u16, message: &str) -> ApiError {
    ApiError::Status {
        status,
        message: message.to_string(),
    }
}

impl FakeApi {
    fn check_token(&self, token: &str) -> Result<(), ApiError> {
        let backend = self.backend.lock().unwrap();
        if backend.revoked || !token.starts_with("token-") {
            return Err(status(401, "jwt expired"));
        }
        Ok(())
    }
}

#[async_trait]
impl FantasyApi for FakeApi {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let backend = self.backend.lock().unwrap();
        match backend.users.get(username) {
            Some(p) if p == password => Ok(LoginResponse {
                access_token: format!("token-{username}"),
                username: username.to_string(),
                user_id: Some(format!("uid-{username}")),
            }),
            _ => Err(status(401, "Invalid credentials")),
        }
    }

    async fn register(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let mut backend = self.backend.lock().unwrap();
        if backend.users.contains_key(username) {
            return Err(status(409, "User exists"));
        }
        backend.users.insert(username.to_string(), password.to_string());
        Ok(())
    }

    async fn list_players(&self, token: &str) -> Result<Vec<Player>, ApiError> {
        self.check_token(token)?;
        Ok(self.backend.lock().unwrap().players.clone())
    }

    async fn get_player(&self, token: &str, id: &PlayerId) -> Result<Player, ApiError> {
        self.check_token(token)?;
        let backend = self.backend.lock().unwrap();
        backend
            .players
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| status(404, "Player not found"))
    }

    async fn create_player(&self, token: &str, draft: &PlayerDraft) -> Result<Player, ApiError> {
        self.check_token(token)?;
        let mut backend = self.backend.lock().unwrap();
        backend.next_id += 1;
        let player = Player {
            id: PlayerId::new(format!("new-{}", backend.next_id)),
            name: draft.name.clone(),
            university: draft.university.clone(),
            category: draft.category,
            stats: draft.stats,
            is_new_player: draft.is_new_player,
        };
        backend.players.push(player.clone());
        Ok(player)
    }

    async fn update_player(
        &self,
        token: &str,
        id: &PlayerId,
        draft: &PlayerDraft,
    ) -> Result<Player, ApiError> {
        self.check_token(token)?;
        let mut backend = self.backend.lock().unwrap();
        let player = backend
            .players
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| status(404, "Player not found"))?;
        player.name = draft.name.clone();
        player.university = draft.university.clone();
        player.category = draft.category;
        player.stats = draft.stats;
        Ok(player.clone())
    }

    async fn delete_player(&self, token: &str, id: &PlayerId) -> Result<(), ApiError> {
        self.check_token(token)?;
        self.backend.lock().unwrap().players.retain(|p| &p.id != id);
        Ok(())
    }

    async fn add_to_team(&self, token: &str, user_id: &str, id: &PlayerId) -> Result<(), ApiError> {
        self.check_token(token)?;
        let mut backend = self.backend.lock().unwrap();
        if backend.fail_team_mutations {
            return Err(status(500, "Database unavailable"));
        }
        let player = backend
            .players
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| status(404, "Player not found"))?;
        let price = valuation::value(&player.stats);
        backend
            .teams
            .entry(user_id.to_string())
            .or_default()
            .push(TeamEntry { player, price });
        Ok(())
    }

    async fn remove_from_team(&self, token: &str, user_id: &str, id: &PlayerId) -> Result<(), ApiError> {
        self.check_token(token)?;
        let mut backend = self.backend.lock().unwrap();
        if backend.fail_team_mutations {
            return Err(status(500, "Database unavailable"));
        }
        if let Some(team) = backend.teams.get_mut(user_id) {
            team.retain(|e| &e.player.id != id);
        }
        Ok(())
    }

    async fn get_team(&self, token: &str, user_id: &str) -> Result<Vec<TeamEntry>, ApiError> {
        self.check_token(token)?;
        let backend = self.backend.lock().unwrap();
        Ok(backend.teams.get(user_id).cloned().unwrap_or_default())
    }

    async fn leaderboard(&self, token: &str) -> Result<Vec<LeaderboardEntry>, ApiError> {
        self.check_token(token)?;
        Ok(self.backend.lock().unwrap().leaderboard.clone())
    }

    async fn tournament_summary(&self, token: &str) -> Result<TournamentSummary, ApiError> {
        self.check_token(token)?;
        Ok(TournamentSummary {
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
        })
    }
}

// ===========================================================================
// Test helpers
// ===========================================================================

fn player(id: &str, name: &str, runs: f64, is_new: bool) -> Player {
    Player {
        id: PlayerId::new(id),
        name: name.into(),
        university: "University of Colombo".into(),
        category: Category::Batsman,
        stats: PlayerStats {
            total_runs: runs,
            balls_faced: 400.0,
            innings_played: 10.0,
            ..PlayerStats::default()
        },
        is_new_player: is_new,
    }
}

fn seeded_api() -> Arc<FakeApi> {
    let api = FakeApi::default();
    {
        let mut backend = api.backend.lock().unwrap();
        backend.users.insert("kasun".into(), "secret123".into());
        backend.players = vec![
            player("p1", "Danushka Kumara", 500.0, false),
            player("p2", "Jeewan Thirimanne", 300.0, true),
        ];
        backend.leaderboard = vec![
            LeaderboardEntry {
                username: "nimal".into(),
                total_points: 120.5,
            },
            LeaderboardEntry {
                username: "spiritx_2025".into(),
                total_points: 980.0,
            },
        ];
    }
    Arc::new(api)
}

struct Harness {
    cmd_tx: mpsc::Sender<UserCommand>,
    ui_rx: mpsc::Receiver<UiUpdate>,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

fn start(api: Arc<FakeApi>, mode: Mode, session: Session) -> Harness {
    let state = AppState::new(Config::default(), mode, api, session);
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (ui_tx, ui_rx) = mpsc::channel(256);
    let handle = tokio::spawn(app::run(cmd_rx, ui_tx, state));
    Harness {
        cmd_tx,
        ui_rx,
        handle,
    }
}

fn fresh_session() -> Session {
    Session::restore(Database::open(":memory:").unwrap()).unwrap()
}

impl Harness {
    async fn send(&self, cmd: UserCommand) {
        self.cmd_tx.send(cmd).await.unwrap();
    }

    /// Receive updates until one matches `pred`, returning it. Panics after
    /// a second without a match.
    async fn wait_for<F>(&mut self, mut pred: F) -> UiUpdate
    where
        F: FnMut(&UiUpdate) -> bool,
    {
        let deadline = Duration::from_secs(1);
        loop {
            let update = tokio::time::timeout(deadline, self.ui_rx.recv())
                .await
                .expect("timed out waiting for update")
                .expect("ui channel closed");
            if pred(&update) {
                return update;
            }
        }
    }

    async fn sign_in(&mut self) {
        self.send(UserCommand::SignIn {
            username: "kasun".into(),
            password: "secret123".into(),
        })
        .await;
        self.wait_for(|u| matches!(u, UiUpdate::SignedIn { .. })).await;
    }

    async fn quit(self) {
        self.cmd_tx.send(UserCommand::Quit).await.unwrap();
        let result = self.handle.await.unwrap();
        assert!(result.is_ok());
    }
}

// ===========================================================================
// Session
// ===========================================================================

#[tokio::test]
async fn starts_signed_out_without_a_stored_session() {
    let mut h = start(seeded_api(), Mode::Portal, fresh_session());
    let update = h.wait_for(|_| true).await;
    assert_eq!(update, UiUpdate::SignedOut { reason: None });
    h.quit().await;
}

#[tokio::test]
async fn sign_in_with_empty_fields_reports_required() {
    let mut h = start(seeded_api(), Mode::Portal, fresh_session());
    h.send(UserCommand::SignIn {
        username: "".into(),
        password: "".into(),
    })
    .await;
    let update = h.wait_for(|u| matches!(u, UiUpdate::AuthFailed(_))).await;
    let UiUpdate::AuthFailed(errors) = update else {
        unreachable!()
    };
    assert_eq!(errors.username.as_deref(), Some(MSG_USERNAME_REQUIRED));
    h.quit().await;
}

#[tokio::test]
async fn wrong_password_is_reported_under_password() {
    let mut h = start(seeded_api(), Mode::Portal, fresh_session());
    h.send(UserCommand::SignIn {
        username: "kasun".into(),
        password: "wrong".into(),
    })
    .await;
    let update = h.wait_for(|u| matches!(u, UiUpdate::AuthFailed(_))).await;
    let UiUpdate::AuthFailed(errors) = update else {
        unreachable!()
    };
    assert_eq!(errors.password.as_deref(), Some(MSG_INVALID_CREDENTIALS));
    h.quit().await;
}

#[tokio::test]
async fn sign_in_loads_every_portal_tab() {
    let mut h = start(seeded_api(), Mode::Portal, fresh_session());
    h.sign_in().await;

    let players = h.wait_for(|u| matches!(u, UiUpdate::Players(_))).await;
    assert!(matches!(players, UiUpdate::Players(Ok(ref p)) if p.len() == 2));

    let team = h.wait_for(|u| matches!(u, UiUpdate::Team(_))).await;
    let UiUpdate::Team(Ok(snapshot)) = team else {
        panic!("expected team snapshot, got {team:?}")
    };
    assert!(snapshot.members.is_empty());
    assert_eq!(snapshot.remaining, 9_000_000);

    let board = h.wait_for(|u| matches!(u, UiUpdate::Leaderboard(_))).await;
    let UiUpdate::Leaderboard(Ok(rows)) = board else {
        panic!("expected leaderboard, got {board:?}")
    };
    assert_eq!(rows[0].username, "spiritx_2025");
    h.quit().await;
}

#[tokio::test]
async fn stored_session_is_restored_on_start() {
    let path = std::env::temp_dir().join("crease_app_flow_restore.db");
    let _ = std::fs::remove_file(&path);
    let path_str = path.to_str().unwrap().to_string();

    {
        let mut h = start(seeded_api(), Mode::Portal, Session::restore(Database::open(&path_str).unwrap()).unwrap());
        h.sign_in().await;
        h.quit().await;
    }

    let mut h = start(seeded_api(), Mode::Portal, Session::restore(Database::open(&path_str).unwrap()).unwrap());
    let first = h.wait_for(|_| true).await;
    assert_eq!(
        first,
        UiUpdate::SignedIn {
            username: "kasun".into()
        }
    );
    h.quit().await;
}

#[tokio::test]
async fn sign_out_returns_to_sign_in() {
    let mut h = start(seeded_api(), Mode::Portal, fresh_session());
    h.sign_in().await;
    h.send(UserCommand::SignOut).await;
    let update = h
        .wait_for(|u| matches!(u, UiUpdate::SignedOut { .. }))
        .await;
    assert_eq!(update, UiUpdate::SignedOut { reason: None });
    h.quit().await;
}

#[tokio::test]
async fn revoked_token_ends_the_session() {
    let api = seeded_api();
    let mut h = start(api.clone(), Mode::Portal, fresh_session());
    h.sign_in().await;
    h.wait_for(|u| matches!(u, UiUpdate::Leaderboard(_))).await;

    api.backend.lock().unwrap().revoked = true;
    h.send(UserCommand::Refresh(TabId::Players)).await;

    let update = h
        .wait_for(|u| matches!(u, UiUpdate::SignedOut { .. }))
        .await;
    assert!(matches!(update, UiUpdate::SignedOut { reason: Some(_) }));
    h.quit().await;
}

#[tokio::test]
async fn sign_up_validates_then_registers() {
    let api = seeded_api();
    let mut h = start(api.clone(), Mode::Portal, fresh_session());

    h.send(UserCommand::SignUp {
        username: "amaya".into(),
        password: "12345".into(),
    })
    .await;
    let update = h.wait_for(|u| matches!(u, UiUpdate::AuthFailed(_))).await;
    let UiUpdate::AuthFailed(errors) = update else {
        unreachable!()
    };
    assert_eq!(errors.password.as_deref(), Some(MSG_PASSWORD_TOO_SHORT));

    h.send(UserCommand::SignUp {
        username: "amaya".into(),
        password: "123456".into(),
    })
    .await;
    let update = h
        .wait_for(|u| matches!(u, UiUpdate::Registered { .. }))
        .await;
    assert_eq!(
        update,
        UiUpdate::Registered {
            username: "amaya".into()
        }
    );
    assert!(api.backend.lock().unwrap().users.contains_key("amaya"));
    h.quit().await;
}

// ===========================================================================
// Team
// ===========================================================================

#[tokio::test]
async fn add_and_remove_update_budget() {
    let mut h = start(seeded_api(), Mode::Portal, fresh_session());
    h.sign_in().await;
    h.wait_for(|u| matches!(u, UiUpdate::Leaderboard(_))).await;

    let id = PlayerId::new("p1");
    h.send(UserCommand::AddToTeam(id.clone())).await;
    let settled = h
        .wait_for(|u| matches!(u, UiUpdate::MutationSettled { .. }))
        .await;
    assert_eq!(
        settled,
        UiUpdate::MutationSettled {
            player_id: id.clone(),
            ok: true
        }
    );
    let team = h.wait_for(|u| matches!(u, UiUpdate::Team(_))).await;
    let UiUpdate::Team(Ok(snapshot)) = team else {
        panic!("expected team snapshot")
    };
    assert_eq!(snapshot.members.len(), 1);
    assert_eq!(snapshot.remaining, 8_300_000);

    h.send(UserCommand::RemoveFromTeam(id)).await;
    h.wait_for(|u| matches!(u, UiUpdate::MutationSettled { ok: true, .. }))
        .await;
    let team = h.wait_for(|u| matches!(u, UiUpdate::Team(_))).await;
    let UiUpdate::Team(Ok(snapshot)) = team else {
        panic!("expected team snapshot")
    };
    assert!(snapshot.members.is_empty());
    assert_eq!(snapshot.remaining, 9_000_000);
    h.quit().await;
}

#[tokio::test]
async fn failed_remote_add_leaves_team_unchanged() {
    let api = seeded_api();
    api.backend.lock().unwrap().fail_team_mutations = true;
    let mut h = start(api, Mode::Portal, fresh_session());
    h.sign_in().await;
    h.wait_for(|u| matches!(u, UiUpdate::Leaderboard(_))).await;

    h.send(UserCommand::AddToTeam(PlayerId::new("p1"))).await;
    let settled = h
        .wait_for(|u| matches!(u, UiUpdate::MutationSettled { .. }))
        .await;
    assert!(matches!(settled, UiUpdate::MutationSettled { ok: false, .. }));
    let notice = h.wait_for(|u| matches!(u, UiUpdate::Notice(_))).await;
    assert!(matches!(notice, UiUpdate::Notice(Notice { level: NoticeLevel::Error, .. })));

    // The team as the server and the client see it is still empty.
    h.send(UserCommand::Refresh(TabId::MyTeam)).await;
    let team = h.wait_for(|u| matches!(u, UiUpdate::Team(_))).await;
    assert!(matches!(team, UiUpdate::Team(Ok(ref s)) if s.members.is_empty()));
    h.quit().await;
}

#[tokio::test]
async fn duplicate_add_is_refused_locally() {
    let mut h = start(seeded_api(), Mode::Portal, fresh_session());
    h.sign_in().await;
    h.wait_for(|u| matches!(u, UiUpdate::Leaderboard(_))).await;

    let id = PlayerId::new("p2");
    h.send(UserCommand::AddToTeam(id.clone())).await;
    h.wait_for(|u| matches!(u, UiUpdate::MutationSettled { ok: true, .. }))
        .await;
    h.send(UserCommand::AddToTeam(id)).await;
    let settled = h
        .wait_for(|u| matches!(u, UiUpdate::MutationSettled { .. }))
        .await;
    assert!(matches!(settled, UiUpdate::MutationSettled { ok: false, .. }));
    let notice = h.wait_for(|u| matches!(u, UiUpdate::Notice(_))).await;
    let UiUpdate::Notice(notice) = notice else {
        unreachable!()
    };
    assert!(notice.text.contains("already in your team"), "{}", notice.text);
    h.quit().await;
}

// ===========================================================================
// Admin
// ===========================================================================

#[tokio::test]
async fn admin_sign_in_loads_summary_and_roster() {
    let mut h = start(seeded_api(), Mode::Admin, fresh_session());
    h.sign_in().await;
    let summary = h.wait_for(|u| matches!(u, UiUpdate::Summary(_))).await;
    let UiUpdate::Summary(Ok(summary)) = summary else {
        panic!("expected summary")
    };
    assert_eq!(summary.total_runs, 12_450);
    h.wait_for(|u| matches!(u, UiUpdate::Players(Ok(_)))).await;
    h.quit().await;
}

#[tokio::test]
async fn admin_cannot_edit_established_player() {
    let api = seeded_api();
    let mut h = start(api.clone(), Mode::Admin, fresh_session());
    h.sign_in().await;
    h.wait_for(|u| matches!(u, UiUpdate::Players(_))).await;

    let established = api.backend.lock().unwrap().players[0].clone();
    let mut draft = established.to_draft();
    draft.name = "Renamed".into();
    h.send(UserCommand::UpdatePlayer {
        id: established.id.clone(),
        draft,
    })
    .await;
    let notice = h.wait_for(|u| matches!(u, UiUpdate::Notice(_))).await;
    assert!(matches!(notice, UiUpdate::Notice(Notice { level: NoticeLevel::Error, .. })));
    assert_eq!(api.backend.lock().unwrap().players[0].name, "Danushka Kumara");
    h.quit().await;
}

#[tokio::test]
async fn admin_creates_edits_and_deletes_new_player() {
    let api = seeded_api();
    let mut h = start(api.clone(), Mode::Admin, fresh_session());
    h.sign_in().await;
    h.wait_for(|u| matches!(u, UiUpdate::Players(_))).await;

    let draft = PlayerDraft {
        name: "Pathum Nissanka".into(),
        university: "University of Sri Jayewardenepura".into(),
        category: Category::Batsman,
        stats: PlayerStats::default(),
        is_new_player: true,
    };
    h.send(UserCommand::CreatePlayer(draft.clone())).await;
    let saved = h.wait_for(|u| matches!(u, UiUpdate::PlayerSaved(_))).await;
    let UiUpdate::PlayerSaved(created) = saved else {
        unreachable!()
    };
    h.wait_for(|u| matches!(u, UiUpdate::Players(Ok(p)) if p.len() == 3))
        .await;

    let mut edited = draft;
    edited.stats.total_runs = 120.0;
    h.send(UserCommand::UpdatePlayer {
        id: created.id.clone(),
        draft: edited,
    })
    .await;
    h.wait_for(|u| matches!(u, UiUpdate::PlayerSaved(_))).await;
    h.wait_for(|u| matches!(u, UiUpdate::Players(Ok(_)))).await;

    h.send(UserCommand::ViewPlayer(created.id.clone())).await;
    let detail = h.wait_for(|u| matches!(u, UiUpdate::PlayerDetail(_))).await;
    let UiUpdate::PlayerDetail(detail) = detail else {
        unreachable!()
    };
    assert_eq!(detail.stats.total_runs, 120.0);

    h.send(UserCommand::DeletePlayer(created.id.clone())).await;
    let deleted = h.wait_for(|u| matches!(u, UiUpdate::PlayerDeleted(_))).await;
    assert_eq!(deleted, UiUpdate::PlayerDeleted(created.id.clone()));
    assert_eq!(api.backend.lock().unwrap().players.len(), 2);
    h.quit().await;
}

// ===========================================================================
// Import
// ===========================================================================

#[tokio::test]
async fn import_creates_each_draft() {
    let api = seeded_api();
    let drafts: Vec<PlayerDraft> = ["A", "B", "C"]
        .iter()
        .map(|name| PlayerDraft {
            name: name.to_string(),
            university: "University of Ruhuna".into(),
            category: Category::Bowler,
            stats: PlayerStats::default(),
            is_new_player: true,
        })
        .collect();

    let report = import_players(api.as_ref(), "token-kasun", &drafts).await.unwrap();
    assert_eq!(report.created, 3);
    assert!(report.failed.is_empty());
    assert_eq!(api.backend.lock().unwrap().players.len(), 5);
}

#[tokio::test]
async fn import_stops_on_rejected_token() {
    let api = seeded_api();
    let drafts = vec![player("x", "X", 0.0, true).to_draft()];
    let err = import_players(api.as_ref(), "bogus", &drafts).await.unwrap_err();
    assert!(err.is_unauthorized());
}
