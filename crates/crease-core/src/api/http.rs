// reqwest implementation of `FantasyApi`.
//
// Routes mirror the backend's Express router names (`/players/get-all`,
// `/team/get-user-team/:id`, ...). Every authenticated request carries
// `Authorization: Bearer <token>`.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{ApiError, FantasyApi, LoginResponse};
use crate::config::ApiConfig;
use crate::model::{
    LeaderboardEntry, Player, PlayerDraft, PlayerId, TeamEntry, TournamentSummary,
};

/// HTTP client for the fantasy-cricket backend.
#[derive(Debug, Clone)]
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// Create a client rooted at `base_url` (trailing slashes are ignored).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config.base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, token: &str, path: &str) -> RequestBuilder {
        self.http.get(self.url(path)).bearer_auth(token)
    }

    fn post(&self, token: &str, path: &str) -> RequestBuilder {
        self.http.post(self.url(path)).bearer_auth(token)
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
    let response = request.send().await.map_err(ApiError::Network)?;
    let status = response.status();
    debug!(status = status.as_u16(), url = %response.url(), "api response");
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(&body);
    warn!(status = status.as_u16(), %message, "api request failed");
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    let response = send(request).await?;
    let bytes = response.bytes().await.map_err(ApiError::Network)?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

async fn send_empty(request: RequestBuilder) -> Result<(), ApiError> {
    send(request).await.map(|_| ())
}

/// Pull a human-readable message out of an error body.
///
/// Express backends usually answer `{"message": "..."}` or `{"error": "..."}`;
/// anything else is returned trimmed, or a placeholder when empty.
pub(crate) fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error", "msg"] {
            if let Some(text) = value.get(key).and_then(Value::as_str) {
                return text.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no response body".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Decode a get-team body. Anything other than a JSON array means the user
/// has no team yet.
pub(crate) fn decode_team(body: Value) -> Result<Vec<TeamEntry>, ApiError> {
    match body {
        Value::Array(_) => serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string())),
        other => {
            debug!("get-team returned non-array body, treating as empty: {}", other);
            Ok(Vec::new())
        }
    }
}

// ---------------------------------------------------------------------------
// FantasyApi impl
// ---------------------------------------------------------------------------

#[async_trait]
impl FantasyApi for HttpApi {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = json!({ "username": username, "password": password });
        send_json(self.http.post(self.url("/auth/login")).json(&body)).await
    }

    async fn register(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let body = json!({ "username": username, "password": password });
        send_empty(self.http.post(self.url("/auth/register")).json(&body)).await
    }

    async fn list_players(&self, token: &str) -> Result<Vec<Player>, ApiError> {
        send_json(self.get(token, "/players/get-all")).await
    }

    async fn get_player(&self, token: &str, id: &PlayerId) -> Result<Player, ApiError> {
        send_json(self.get(token, &format!("/players/get-one/{id}"))).await
    }

    async fn create_player(&self, token: &str, draft: &PlayerDraft) -> Result<Player, ApiError> {
        send_json(self.post(token, "/players/create").json(draft)).await
    }

    async fn update_player(
        &self,
        token: &str,
        id: &PlayerId,
        draft: &PlayerDraft,
    ) -> Result<Player, ApiError> {
        let request = self
            .http
            .put(self.url(&format!("/players/update-one/{id}")))
            .bearer_auth(token)
            .json(draft);
        send_json(request).await
    }

    async fn delete_player(&self, token: &str, id: &PlayerId) -> Result<(), ApiError> {
        let request = self
            .http
            .delete(self.url(&format!("/players/delete-one/{id}")))
            .bearer_auth(token);
        send_empty(request).await
    }

    async fn add_to_team(
        &self,
        token: &str,
        user_id: &str,
        player_id: &PlayerId,
    ) -> Result<(), ApiError> {
        let body = json!({ "userId": user_id, "playerId": player_id });
        send_empty(self.post(token, "/team/add").json(&body)).await
    }

    async fn remove_from_team(
        &self,
        token: &str,
        user_id: &str,
        player_id: &PlayerId,
    ) -> Result<(), ApiError> {
        let body = json!({ "userId": user_id, "playerId": player_id });
        send_empty(self.post(token, "/team/remove").json(&body)).await
    }

    async fn get_team(&self, token: &str, user_id: &str) -> Result<Vec<TeamEntry>, ApiError> {
        let body: Value = send_json(self.get(token, &format!("/team/get-user-team/{user_id}"))).await?;
        decode_team(body)
    }

    async fn leaderboard(&self, token: &str) -> Result<Vec<LeaderboardEntry>, ApiError> {
        send_json(self.get(token, "/leaderboard/get-leaderboard")).await
    }

    async fn tournament_summary(&self, token: &str) -> Result<TournamentSummary, ApiError> {
        send_json(self.get(token, "/tournament/summary")).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = HttpApi::new("http://localhost:5000/api/ ");
        assert_eq!(api.base_url(), "http://localhost:5000/api");
        assert_eq!(api.url("/players/get-all"), "http://localhost:5000/api/players/get-all");
    }

    #[test]
    fn from_config_uses_base_url() {
        let api = HttpApi::from_config(&ApiConfig::default());
        assert_eq!(api.base_url(), "http://localhost:5000/api");
    }

    #[test]
    fn error_message_from_json_message() {
        assert_eq!(
            extract_error_message(r#"{"message":"Player already in team"}"#),
            "Player already in team"
        );
        assert_eq!(extract_error_message(r#"{"error":"Invalid token"}"#), "Invalid token");
    }

    #[test]
    fn error_message_falls_back_to_body_text() {
        assert_eq!(extract_error_message("  Bad Gateway \n"), "Bad Gateway");
        assert_eq!(extract_error_message(""), "no response body");
        assert_eq!(extract_error_message(r#"{"status":"x"}"#), r#"{"status":"x"}"#);
    }

    #[test]
    fn decode_team_handles_non_array_as_empty() {
        assert!(decode_team(json!({ "message": "no team" })).unwrap().is_empty());
        assert!(decode_team(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn decode_team_parses_entries() {
        let entries = decode_team(json!([{
            "player": {
                "_id": "p1",
                "name": "Isuru Udana",
                "university": "University of Colombo",
                "category": "Bowler",
                "wickets": 20,
                "oversBowled": 40,
                "runsConceded": 240
            },
            "price": 600000
        }]))
        .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].player.id, PlayerId::new("p1"));
        assert_eq!(entries[0].price, 600_000);
    }

    #[test]
    fn decode_team_reports_malformed_entries() {
        let result = decode_team(json!([{ "price": 1 }]));
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }
}
