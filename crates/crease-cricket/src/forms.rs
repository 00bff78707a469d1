// Validation for the sign-in, sign-up and player forms.
//
// Validation never talks to the network: it turns raw text input into
// either a request payload or a set of per-field messages the TUI shows
// under the offending fields.

use std::fmt;

use crease_core::model::{Category, PlayerDraft, PlayerStats};

/// Minimum password length accepted on sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

pub const MSG_USERNAME_REQUIRED: &str = "Username is required";
pub const MSG_PASSWORD_REQUIRED: &str = "Password is required";
pub const MSG_PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
pub const MSG_INVALID_CREDENTIALS: &str = "Invalid username or password";
pub const MSG_REGISTRATION_FAILED: &str = "Registration failed. Please try again.";

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Field-level messages for the sign-in / sign-up form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialErrors {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CredentialErrors {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none()
    }

    /// Put a server-side rejection under the password field.
    pub fn rejected(message: &str) -> Self {
        CredentialErrors {
            username: None,
            password: Some(message.to_string()),
        }
    }
}

fn check_required(username: &str, password: &str) -> CredentialErrors {
    let mut errors = CredentialErrors::default();
    if username.trim().is_empty() {
        errors.username = Some(MSG_USERNAME_REQUIRED.to_string());
    }
    if password.is_empty() {
        errors.password = Some(MSG_PASSWORD_REQUIRED.to_string());
    }
    errors
}

pub fn validate_sign_in(username: &str, password: &str) -> Result<(), CredentialErrors> {
    let errors = check_required(username, password);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_sign_up(username: &str, password: &str) -> Result<(), CredentialErrors> {
    let mut errors = check_required(username, password);
    if errors.password.is_none() && password.chars().count() < MIN_PASSWORD_LEN {
        errors.password = Some(MSG_PASSWORD_TOO_SHORT.to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// ---------------------------------------------------------------------------
// Player form
// ---------------------------------------------------------------------------

/// The nine editable fields of a player, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerField {
    Name,
    University,
    Category,
    TotalRuns,
    BallsFaced,
    InningsPlayed,
    Wickets,
    OversBowled,
    RunsConceded,
}

impl PlayerField {
    pub const ALL: [PlayerField; 9] = [
        PlayerField::Name,
        PlayerField::University,
        PlayerField::Category,
        PlayerField::TotalRuns,
        PlayerField::BallsFaced,
        PlayerField::InningsPlayed,
        PlayerField::Wickets,
        PlayerField::OversBowled,
        PlayerField::RunsConceded,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PlayerField::Name => "Name",
            PlayerField::University => "University",
            PlayerField::Category => "Category",
            PlayerField::TotalRuns => "Total Runs",
            PlayerField::BallsFaced => "Balls Faced",
            PlayerField::InningsPlayed => "Innings Played",
            PlayerField::Wickets => "Wickets",
            PlayerField::OversBowled => "Overs Bowled",
            PlayerField::RunsConceded => "Runs Conceded",
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(
            self,
            PlayerField::Name | PlayerField::University | PlayerField::Category
        )
    }

    fn index(&self) -> usize {
        PlayerField::ALL
            .iter()
            .position(|f| f == self)
            .unwrap_or_default()
    }

    pub fn next(&self) -> Self {
        PlayerField::ALL[(self.index() + 1) % PlayerField::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let len = PlayerField::ALL.len();
        PlayerField::ALL[(self.index() + len - 1) % len]
    }
}

impl fmt::Display for PlayerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw text of the player form, one entry per `PlayerField`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerForm {
    values: [String; 9],
    /// Carried through unchanged; new records are always flagged new.
    pub is_new_player: bool,
}

impl Default for PlayerForm {
    fn default() -> Self {
        PlayerForm {
            values: Default::default(),
            is_new_player: true,
        }
    }
}

impl PlayerForm {
    /// Prefill from an existing record for editing.
    pub fn from_draft(draft: &PlayerDraft) -> Self {
        let mut form = PlayerForm {
            is_new_player: draft.is_new_player,
            ..PlayerForm::default()
        };
        let s = &draft.stats;
        form.set(PlayerField::Name, draft.name.clone());
        form.set(PlayerField::University, draft.university.clone());
        form.set(PlayerField::Category, draft.category.label().to_string());
        form.set(PlayerField::TotalRuns, s.total_runs.to_string());
        form.set(PlayerField::BallsFaced, s.balls_faced.to_string());
        form.set(PlayerField::InningsPlayed, s.innings_played.to_string());
        form.set(PlayerField::Wickets, s.wickets.to_string());
        form.set(PlayerField::OversBowled, s.overs_bowled.to_string());
        form.set(PlayerField::RunsConceded, s.runs_conceded.to_string());
        form
    }

    pub fn get(&self, field: PlayerField) -> &str {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: PlayerField, value: String) {
        self.values[field.index()] = value;
    }

    pub fn push_char(&mut self, field: PlayerField, c: char) {
        self.values[field.index()].push(c);
    }

    pub fn pop_char(&mut self, field: PlayerField) {
        self.values[field.index()].pop();
    }

    /// Step the category field through the fixed options.
    pub fn cycle_category(&mut self) {
        let next = match Category::from_label(self.get(PlayerField::Category)) {
            None => Category::Batsman,
            Some(Category::Batsman) => Category::AllRounder,
            Some(Category::AllRounder) => Category::Bowler,
            Some(Category::Bowler) => Category::Batsman,
        };
        self.set(PlayerField::Category, next.label().to_string());
    }

    /// Validate every field, returning the payload or all field errors.
    pub fn validate(&self) -> Result<PlayerDraft, Vec<(PlayerField, String)>> {
        let mut errors = Vec::new();

        let name = self.get(PlayerField::Name).trim().to_string();
        if name.is_empty() {
            errors.push((PlayerField::Name, "Name is required".to_string()));
        }
        let university = self.get(PlayerField::University).trim().to_string();
        if university.is_empty() {
            errors.push((PlayerField::University, "University is required".to_string()));
        }
        let category = Category::from_label(self.get(PlayerField::Category));
        if category.is_none() {
            errors.push((PlayerField::Category, "Select a category".to_string()));
        }

        let mut number = |field: PlayerField| -> f64 {
            match parse_counter(self.get(field)) {
                Ok(n) => n,
                Err(msg) => {
                    errors.push((field, format!("{} {}", field.label(), msg)));
                    0.0
                }
            }
        };
        let stats = PlayerStats {
            total_runs: number(PlayerField::TotalRuns),
            balls_faced: number(PlayerField::BallsFaced),
            innings_played: number(PlayerField::InningsPlayed),
            wickets: number(PlayerField::Wickets),
            overs_bowled: number(PlayerField::OversBowled),
            runs_conceded: number(PlayerField::RunsConceded),
        };

        match category {
            Some(category) if errors.is_empty() => Ok(PlayerDraft {
                name,
                university,
                category,
                stats,
                is_new_player: self.is_new_player,
            }),
            _ => Err(errors),
        }
    }
}

/// Parse a counter field. Blank counts as zero.
fn parse_counter(raw: &str) -> Result<f64, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    match raw.parse::<f64>() {
        Ok(n) if !n.is_finite() => Err("must be a number"),
        Ok(n) if n < 0.0 => Err("cannot be negative"),
        Ok(n) => Ok(n),
        Err(_) => Err("must be a number"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
