// Team add/remove as explicit command objects.
//
// A mutation is checked locally first, then sent to the backend, and only
// committed to the local selection once the backend acknowledges it. After
// the commit the selection is reconciled with the backend's team list.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use crease_core::api::{ApiError, FantasyApi};
use crease_core::model::{Player, PlayerId};
use crease_cricket::selection::{SelectedPlayer, SelectionError, TeamSelection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamAction {
    Add,
    Remove,
}

impl fmt::Display for TeamAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamAction::Add => f.write_str("add"),
            TeamAction::Remove => f.write_str("remove"),
        }
    }
}

/// One requested change to a user's team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMutation {
    pub action: TeamAction,
    pub player_id: PlayerId,
    pub user_id: String,
}

impl TeamMutation {
    pub fn add(player_id: PlayerId, user_id: impl Into<String>) -> Self {
        TeamMutation {
            action: TeamAction::Add,
            player_id,
            user_id: user_id.into(),
        }
    }

    pub fn remove(player_id: PlayerId, user_id: impl Into<String>) -> Self {
        TeamMutation {
            action: TeamAction::Remove,
            player_id,
            user_id: user_id.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum MutationError {
    /// Failed a local precondition; nothing was sent.
    #[error("{0}")]
    Rejected(#[from] SelectionError),

    /// The backend refused or could not be reached; nothing was committed.
    #[error("server rejected the change: {0}")]
    Remote(#[source] ApiError),

    #[error("a change for this player is already in progress")]
    InFlight(PlayerId),

    #[error("player {0} is not in the roster")]
    UnknownPlayer(PlayerId),
}

/// Runs team mutations, at most one per player at a time.
#[derive(Debug, Default)]
pub struct MutationHandler {
    in_flight: HashSet<PlayerId>,
}

impl MutationHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self, id: &PlayerId) -> bool {
        self.in_flight.contains(id)
    }

    /// Mark a mutation as started. Refuses a second one for the same player.
    pub fn begin(&mut self, mutation: &TeamMutation) -> Result<(), MutationError> {
        if !self.in_flight.insert(mutation.player_id.clone()) {
            return Err(MutationError::InFlight(mutation.player_id.clone()));
        }
        Ok(())
    }

    pub fn finish(&mut self, id: &PlayerId) {
        self.in_flight.remove(id);
    }

    /// Check, send, commit and reconcile one mutation.
    ///
    /// `roster` is the player list the add candidate is looked up in. On any
    /// error `selection` is exactly as it was before the call.
    pub async fn execute(
        &mut self,
        api: &dyn FantasyApi,
        token: &str,
        selection: &mut TeamSelection,
        roster: &[Player],
        mutation: TeamMutation,
    ) -> Result<(), MutationError> {
        self.begin(&mutation)?;
        let result = apply(api, token, selection, roster, &mutation).await;
        self.finish(&mutation.player_id);
        result
    }
}

async fn apply(
    api: &dyn FantasyApi,
    token: &str,
    selection: &mut TeamSelection,
    roster: &[Player],
    mutation: &TeamMutation,
) -> Result<(), MutationError> {
    let id = &mutation.player_id;
    match mutation.action {
        TeamAction::Add => {
            let player = roster
                .iter()
                .find(|p| &p.id == id)
                .cloned()
                .ok_or_else(|| MutationError::UnknownPlayer(id.clone()))?;
            let candidate = SelectedPlayer::priced(player);
            selection.check_add(&candidate)?;
            api.add_to_team(token, &mutation.user_id, id)
                .await
                .map_err(MutationError::Remote)?;
            selection.add(candidate)?;
        }
        TeamAction::Remove => {
            selection.check_remove(id)?;
            api.remove_from_team(token, &mutation.user_id, id)
                .await
                .map_err(MutationError::Remote)?;
            selection.remove(id)?;
        }
    }
    info!("Team {} acknowledged for player {}", mutation.action, id);

    match api.get_team(token, &mutation.user_id).await {
        Ok(entries) => {
            debug!("Reconciled team with {} members from server", entries.len());
            selection.replace_members(entries);
        }
        Err(e) => warn!("Team reconciliation after {} failed, keeping local state: {}", mutation.action, e),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
