// REST API surface of the fantasy-cricket backend.
//
// `FantasyApi` is the seam between the app and the network: `HttpApi` talks
// to the real backend over reqwest, tests substitute in-memory fakes.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    LeaderboardEntry, Player, PlayerDraft, PlayerId, TeamEntry, TournamentSummary,
};

pub use http::HttpApi;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("not signed in")]
    NotSignedIn,
}

impl ApiError {
    /// Whether the backend rejected the credentials or the token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ApiError::Status {
                status: 401 | 403,
                ..
            } | ApiError::NotSignedIn
        )
    }
}

// ---------------------------------------------------------------------------
// Auth payloads
// ---------------------------------------------------------------------------

/// Body of a successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub username: String,
    #[serde(default, alias = "_id", alias = "id")]
    pub user_id: Option<String>,
}

// ---------------------------------------------------------------------------
// FantasyApi
// ---------------------------------------------------------------------------

/// Every backend operation the portal and the admin console use.
///
/// Authenticated calls take the bearer token explicitly; the caller owns the
/// session.
#[async_trait]
pub trait FantasyApi: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError>;

    async fn register(&self, username: &str, password: &str) -> Result<(), ApiError>;

    async fn list_players(&self, token: &str) -> Result<Vec<Player>, ApiError>;

    async fn get_player(&self, token: &str, id: &PlayerId) -> Result<Player, ApiError>;

    async fn create_player(&self, token: &str, draft: &PlayerDraft) -> Result<Player, ApiError>;

    async fn update_player(
        &self,
        token: &str,
        id: &PlayerId,
        draft: &PlayerDraft,
    ) -> Result<Player, ApiError>;

    async fn delete_player(&self, token: &str, id: &PlayerId) -> Result<(), ApiError>;

    async fn add_to_team(
        &self,
        token: &str,
        user_id: &str,
        player_id: &PlayerId,
    ) -> Result<(), ApiError>;

    async fn remove_from_team(
        &self,
        token: &str,
        user_id: &str,
        player_id: &PlayerId,
    ) -> Result<(), ApiError>;

    async fn get_team(&self, token: &str, user_id: &str) -> Result<Vec<TeamEntry>, ApiError>;

    async fn leaderboard(&self, token: &str) -> Result<Vec<LeaderboardEntry>, ApiError>;

    async fn tournament_summary(&self, token: &str) -> Result<TournamentSummary, ApiError>;
}
