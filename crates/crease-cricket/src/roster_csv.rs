// Roster sheet import.
//
// Reads the tournament roster sheet (one row per player, the same nine
// columns as the admin form) and turns each row into a `PlayerDraft` ready
// for the create endpoint. Malformed rows are skipped with a warning.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crease_core::model::{Category, PlayerDraft, PlayerStats};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("no usable rows in {0}")]
    Empty(String),
}

// ---------------------------------------------------------------------------
// Raw row
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawRosterRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "University")]
    university: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Total Runs")]
    total_runs: f64,
    #[serde(rename = "Balls Faced")]
    balls_faced: f64,
    #[serde(rename = "Innings Played")]
    innings_played: f64,
    #[serde(rename = "Wickets")]
    wickets: f64,
    #[serde(rename = "Overs Bowled")]
    overs_bowled: f64,
    #[serde(rename = "Runs Conceded")]
    runs_conceded: f64,
}

impl RawRosterRow {
    fn into_draft(self) -> Result<PlayerDraft, String> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err("empty name".to_string());
        }
        let category = Category::from_label(&self.category)
            .ok_or_else(|| format!("unknown category '{}'", self.category.trim()))?;
        let stats = PlayerStats {
            total_runs: self.total_runs,
            balls_faced: self.balls_faced,
            innings_played: self.innings_played,
            wickets: self.wickets,
            overs_bowled: self.overs_bowled,
            runs_conceded: self.runs_conceded,
        };
        let counters = [
            stats.total_runs,
            stats.balls_faced,
            stats.innings_played,
            stats.wickets,
            stats.overs_bowled,
            stats.runs_conceded,
        ];
        if counters.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err("negative or non-finite counter".to_string());
        }
        Ok(PlayerDraft {
            name,
            university: self.university.trim().to_string(),
            category,
            stats,
            is_new_player: true,
        })
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn load_roster_from_reader<R: Read>(rdr: R) -> Result<Vec<PlayerDraft>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut drafts = Vec::new();
    for (line, result) in reader.deserialize::<RawRosterRow>().enumerate() {
        match result {
            Ok(raw) => match raw.into_draft() {
                Ok(draft) => drafts.push(draft),
                Err(reason) => warn!("skipping roster row {}: {}", line + 2, reason),
            },
            Err(e) => warn!("skipping malformed roster row: {}", e),
        }
    }
    Ok(drafts)
}

/// Load every usable row of the roster sheet at `path`.
pub fn load_roster(path: &Path) -> Result<Vec<PlayerDraft>, ImportError> {
    let display = path.display().to_string();
    let file = File::open(path).map_err(|source| ImportError::Io {
        path: display.clone(),
        source,
    })?;
    let drafts = load_roster_from_reader(file).map_err(|source| ImportError::Csv {
        path: display.clone(),
        source,
    })?;
    if drafts.is_empty() {
        return Err(ImportError::Empty(display));
    }
    Ok(drafts)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
