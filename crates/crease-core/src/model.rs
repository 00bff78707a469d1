// Domain records exchanged with the fantasy-cricket API.
//
// Wire field names are camelCase with the player id under `_id`. The admin
// API spells the university key `unversity` in some payloads, so both
// spellings are accepted on input and drafts carry both on output.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// PlayerId
// ---------------------------------------------------------------------------

/// Opaque player identifier assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        PlayerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Playing role of a cricketer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Batsman,
    #[serde(rename = "All-Rounder")]
    AllRounder,
    Bowler,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 3] = [Category::Batsman, Category::AllRounder, Category::Bowler];

    /// Display label, identical to the wire value.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Batsman => "Batsman",
            Category::AllRounder => "All-Rounder",
            Category::Bowler => "Bowler",
        }
    }

    /// Parse a label leniently: case-insensitive, hyphen and space optional
    /// ("all rounder", "ALLROUNDER" and "All-Rounder" are all accepted).
    pub fn from_label(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | ' ' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "batsman" | "batter" => Some(Category::Batsman),
            "allrounder" => Some(Category::AllRounder),
            "bowler" => Some(Category::Bowler),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// The six raw performance counters of a player.
///
/// Stored as `f64` because overs are fractional and the backend does not
/// promise integral values for the rest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    #[serde(default)]
    pub total_runs: f64,
    #[serde(default)]
    pub balls_faced: f64,
    #[serde(default)]
    pub innings_played: f64,
    #[serde(default)]
    pub wickets: f64,
    #[serde(default)]
    pub overs_bowled: f64,
    #[serde(default)]
    pub runs_conceded: f64,
}

/// A roster player as returned by the players endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    #[serde(rename = "_id")]
    pub id: PlayerId,
    pub name: String,
    #[serde(default, alias = "unversity")]
    pub university: String,
    pub category: Category,
    #[serde(flatten)]
    pub stats: PlayerStats,
    /// Only players still flagged new may be edited or deleted by an admin.
    #[serde(default)]
    pub is_new_player: bool,
}

impl Player {
    /// Whether an admin may still edit or delete this record.
    pub fn is_editable(&self) -> bool {
        self.is_new_player
    }

    /// The editable fields of this player, used to prefill the edit form.
    pub fn to_draft(&self) -> PlayerDraft {
        PlayerDraft {
            name: self.name.clone(),
            university: self.university.clone(),
            category: self.category,
            stats: self.stats,
            is_new_player: self.is_new_player,
        }
    }
}

/// A player record without an id, sent on create and update.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDraft {
    pub name: String,
    pub university: String,
    pub category: Category,
    #[serde(flatten)]
    pub stats: PlayerStats,
    pub is_new_player: bool,
}

/// Outgoing shape of a draft. The admin endpoints read `unversity`, the
/// rest of the API `university`, so both are sent.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DraftWire<'a> {
    name: &'a str,
    university: &'a str,
    unversity: &'a str,
    category: Category,
    #[serde(flatten)]
    stats: &'a PlayerStats,
    is_new_player: bool,
}

impl Serialize for PlayerDraft {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DraftWire {
            name: &self.name,
            university: &self.university,
            unversity: &self.university,
            category: self.category,
            stats: &self.stats,
            is_new_player: self.is_new_player,
        }
        .serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Team, leaderboard, tournament
// ---------------------------------------------------------------------------

/// One member of a user's team as reported by get-team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamEntry {
    pub player: Player,
    #[serde(deserialize_with = "lenient_u64")]
    pub price: u64,
}

/// A leaderboard row. Computed by the backend and only displayed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    #[serde(alias = "userName")]
    pub username: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopScorer {
    pub player: String,
    #[serde(deserialize_with = "lenient_u64")]
    pub runs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopWicketTaker {
    pub player: String,
    #[serde(deserialize_with = "lenient_u64")]
    pub wickets: u64,
}

/// Aggregate tournament figures shown on the admin console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSummary {
    #[serde(deserialize_with = "lenient_u64")]
    pub total_runs: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub total_wickets: u64,
    pub highest_run: TopScorer,
    pub highest_wicket: TopWicketTaker,
}

// ---------------------------------------------------------------------------
// Lenient numeric decoding
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n,
        NumberOrString::Text(s) => s
            .trim()
            .replace(',', "")
            .parse::<f64>()
            .map_err(serde::de::Error::custom)?,
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(serde::de::Error::custom("non-finite number"))
    }
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_f64(deserializer)?;
    Ok(value.max(0.0).round() as u64)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
