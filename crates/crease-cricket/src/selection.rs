// Budget-constrained team selection.
//
// A team holds at most `max_players` unique players whose combined value
// may not exceed the budget. The remaining budget is always derived from the
// members; there is no separate counter to drift out of sync.

use thiserror::Error;

use crease_core::config::TeamConfig;
use crease_core::model::{Player, PlayerId, TeamEntry};

use crate::valuation;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A player on the team together with the price paid for them.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedPlayer {
    pub player: Player,
    pub value: u64,
}

impl SelectedPlayer {
    /// Price the player with the valuation formula.
    pub fn priced(player: Player) -> Self {
        let value = valuation::value(&player.stats);
        SelectedPlayer { player, value }
    }

    pub fn id(&self) -> &PlayerId {
        &self.player.id
    }
}

impl From<TeamEntry> for SelectedPlayer {
    /// Members reported by the server keep the server's price.
    fn from(entry: TeamEntry) -> Self {
        SelectedPlayer {
            player: entry.player,
            value: entry.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("team already has {max} players")]
    TeamFull { max: usize },

    #[error("{name} is already in your team")]
    AlreadySelected { name: String },

    #[error("not enough budget: costs {value}, {remaining} remaining")]
    InsufficientBudget { value: u64, remaining: i64 },

    #[error("player is not in your team")]
    NotSelected,
}

/// The user's current team.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamSelection {
    budget: u64,
    max_players: usize,
    members: Vec<SelectedPlayer>,
}

// ---------------------------------------------------------------------------
// TeamSelection
// ---------------------------------------------------------------------------

impl TeamSelection {
    pub fn new(budget: u64, max_players: usize) -> Self {
        TeamSelection {
            budget,
            max_players,
            members: Vec::new(),
        }
    }

    pub fn from_config(config: &TeamConfig) -> Self {
        Self::new(config.budget, config.max_players)
    }

    pub fn budget(&self) -> u64 {
        self.budget
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }

    pub fn members(&self) -> &[SelectedPlayer] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max_players
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.members.iter().any(|m| m.id() == id)
    }

    pub fn get(&self, id: &PlayerId) -> Option<&SelectedPlayer> {
        self.members.iter().find(|m| m.id() == id)
    }

    /// Sum of the members' values, saturating at `u64::MAX`.
    pub fn spent(&self) -> u64 {
        self.members
            .iter()
            .fold(0u64, |total, m| total.saturating_add(m.value))
    }

    /// Budget minus spent, clamped to the `i64` range. Negative only if the
    /// server reports a team that costs more than the configured budget.
    pub fn remaining_budget(&self) -> i64 {
        let remaining = i128::from(self.budget) - i128::from(self.spent());
        i64::try_from(remaining).unwrap_or(if remaining < 0 { i64::MIN } else { i64::MAX })
    }

    /// Check whether `candidate` may join, without changing anything.
    ///
    /// Checked in order: room on the team, not already a member, affordable.
    pub fn check_add(&self, candidate: &SelectedPlayer) -> Result<(), SelectionError> {
        if self.is_full() {
            return Err(SelectionError::TeamFull {
                max: self.max_players,
            });
        }
        if self.contains(candidate.id()) {
            return Err(SelectionError::AlreadySelected {
                name: candidate.player.name.clone(),
            });
        }
        let remaining = self.remaining_budget();
        let affordable = u64::try_from(remaining).is_ok_and(|left| candidate.value <= left);
        if !affordable {
            return Err(SelectionError::InsufficientBudget {
                value: candidate.value,
                remaining,
            });
        }
        Ok(())
    }

    pub fn add(&mut self, candidate: SelectedPlayer) -> Result<(), SelectionError> {
        self.check_add(&candidate)?;
        self.members.push(candidate);
        Ok(())
    }

    pub fn check_remove(&self, id: &PlayerId) -> Result<(), SelectionError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(SelectionError::NotSelected)
        }
    }

    /// Remove a member, returning it. Its value goes back into the budget.
    pub fn remove(&mut self, id: &PlayerId) -> Result<SelectedPlayer, SelectionError> {
        let index = self
            .members
            .iter()
            .position(|m| m.id() == id)
            .ok_or(SelectionError::NotSelected)?;
        Ok(self.members.remove(index))
    }

    /// Replace the members with the authoritative list from the server.
    /// Duplicate ids are collapsed to their first occurrence.
    pub fn replace_members(&mut self, entries: Vec<TeamEntry>) {
        self.members.clear();
        for entry in entries {
            if !self.contains(&entry.player.id) {
                self.members.push(SelectedPlayer::from(entry));
            }
        }
        if self.members.len() > self.max_players {
            tracing::warn!(
                "server reports {} team members, more than the {} allowed",
                self.members.len(),
                self.max_players
            );
        }
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
