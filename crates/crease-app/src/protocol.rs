// Messages exchanged between the TUI and the app event loop.
//
// The TUI sends `UserCommand`s; the app loop answers with `UiUpdate`s. All
// payloads are owned so they can cross the mpsc channels.

use crease_core::model::{LeaderboardEntry, Player, PlayerDraft, PlayerId, TournamentSummary};
use crease_cricket::forms::CredentialErrors;
use crease_cricket::selection::{SelectedPlayer, TeamSelection};

// ---------------------------------------------------------------------------
// Modes and tabs
// ---------------------------------------------------------------------------

/// Which surface the client is running as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// End users: browse players, build a team, view the leaderboard.
    Portal,
    /// Administrators: tournament summary and roster management.
    Admin,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Portal => "Portal",
            Mode::Admin => "Admin",
        }
    }

    /// Tabs in number-key order.
    pub fn tabs(&self) -> &'static [TabId] {
        match self {
            Mode::Portal => &[TabId::Players, TabId::MyTeam, TabId::Leaderboard],
            Mode::Admin => &[TabId::Summary, TabId::Roster],
        }
    }

    pub fn default_tab(&self) -> TabId {
        self.tabs()[0]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabId {
    Players,
    MyTeam,
    Leaderboard,
    Summary,
    Roster,
}

impl TabId {
    pub fn title(&self) -> &'static str {
        match self {
            TabId::Players => "Players",
            TabId::MyTeam => "My Team",
            TabId::Leaderboard => "Leaderboard",
            TabId::Summary => "Tournament Summary",
            TabId::Roster => "Players",
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Requests from the TUI to the app loop.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    SignIn { username: String, password: String },
    SignUp { username: String, password: String },
    SignOut,
    SwitchTab(TabId),
    /// Reload the data behind a tab.
    Refresh(TabId),
    AddToTeam(PlayerId),
    RemoveFromTeam(PlayerId),
    /// Fetch a fresh copy of one player for the detail overlay.
    ViewPlayer(PlayerId),
    CreatePlayer(PlayerDraft),
    UpdatePlayer { id: PlayerId, draft: PlayerDraft },
    DeletePlayer(PlayerId),
    Quit,
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One-line message for the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// The user's team as the TUI displays it.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamSnapshot {
    pub members: Vec<SelectedPlayer>,
    pub budget: u64,
    pub spent: u64,
    pub remaining: i64,
    pub max_players: usize,
}

impl TeamSnapshot {
    pub fn of(selection: &TeamSelection) -> Self {
        TeamSnapshot {
            members: selection.members().to_vec(),
            budget: selection.budget(),
            spent: selection.spent(),
            remaining: selection.remaining_budget(),
            max_players: selection.max_players(),
        }
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.members.iter().any(|m| m.id() == id)
    }
}

/// Updates pushed from the app loop to the TUI.
///
/// Load results carry `Err(message)` when the fetch failed; the TUI shows
/// the message with a retry hint in place of the table.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    SignedIn { username: String },
    SignedOut { reason: Option<String> },
    /// Sign-in or sign-up was refused; show these under the fields.
    AuthFailed(CredentialErrors),
    /// Account created; the form switches back to sign-in.
    Registered { username: String },
    Players(Result<Vec<Player>, String>),
    Team(Result<TeamSnapshot, String>),
    Leaderboard(Result<Vec<LeaderboardEntry>, String>),
    Summary(Result<TournamentSummary, String>),
    PlayerDetail(Box<Player>),
    /// A team add/remove for this player has finished, one way or the other.
    MutationSettled { player_id: PlayerId, ok: bool },
    /// A create or update was accepted; the admin form can close.
    PlayerSaved(Box<Player>),
    PlayerDeleted(PlayerId),
    Notice(Notice),
}
