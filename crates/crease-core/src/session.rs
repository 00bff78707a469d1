// Explicit session context: the signed-in user and their bearer token.
//
// Lifecycle: `Session::restore` on startup reads whatever was persisted,
// `sign_in` stores a fresh login, `sign_out` clears it. Nothing else about
// the user is kept on disk.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::LoginResponse;
use crate::db::Database;

/// Credentials and identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub access_token: String,
    pub username: String,
    /// Identifier used by the team endpoints. Falls back to the username
    /// when the login response carries no explicit id.
    pub user_id: String,
    pub signed_in_at: DateTime<Utc>,
}

impl SessionInfo {
    pub fn from_login(login: LoginResponse, now: DateTime<Utc>) -> Self {
        let user_id = login
            .user_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| login.username.clone());
        SessionInfo {
            access_token: login.access_token,
            username: login.username,
            user_id,
            signed_in_at: now,
        }
    }
}

/// Session context passed to everything that talks to the API.
pub struct Session {
    db: Database,
    current: Option<SessionInfo>,
}

impl Session {
    /// Key in the `session_state` table holding the serialized session.
    const SESSION_KEY: &'static str = "session";

    /// Build the session context from the store, restoring a persisted
    /// sign-in if there is one. An unreadable record is discarded.
    pub fn restore(db: Database) -> Result<Self> {
        let current = match db.load_state(Self::SESSION_KEY)? {
            Some(value) => match serde_json::from_value::<SessionInfo>(value) {
                Ok(info) if !info.access_token.is_empty() => {
                    info!("Restored session for {}", info.username);
                    Some(info)
                }
                Ok(_) => {
                    warn!("Persisted session has an empty token, discarding");
                    db.delete_state(Self::SESSION_KEY)?;
                    None
                }
                Err(e) => {
                    warn!("Persisted session is unreadable, discarding: {}", e);
                    db.delete_state(Self::SESSION_KEY)?;
                    None
                }
            },
            None => None,
        };
        Ok(Session { db, current })
    }

    pub fn current(&self) -> Option<&SessionInfo> {
        self.current.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.is_some()
    }

    /// Bearer token of the signed-in user.
    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.access_token.as_str())
    }

    /// Record a successful login and persist it.
    pub fn sign_in(&mut self, login: LoginResponse) -> Result<&SessionInfo> {
        let info = SessionInfo::from_login(login, Utc::now());
        let value = serde_json::to_value(&info).context("failed to serialize session")?;
        self.db.save_state(Self::SESSION_KEY, &value)?;
        info!("Signed in as {}", info.username);
        Ok(&*self.current.insert(info))
    }

    /// Forget the signed-in user, both in memory and on disk. The in-memory
    /// session is cleared even when the stored record cannot be deleted.
    pub fn sign_out(&mut self) -> Result<()> {
        if let Some(info) = self.current.take() {
            info!("Signed out {}", info.username);
        }
        self.db.delete_state(Self::SESSION_KEY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
