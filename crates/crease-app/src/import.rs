// Bulk player creation from a roster sheet.

use tracing::{info, warn};

use crease_core::api::{ApiError, FantasyApi};
use crease_core::model::PlayerDraft;

/// Outcome of an import run.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub created: usize,
    /// Name of each player that could not be created, with the reason.
    pub failed: Vec<(String, String)>,
}

/// Create every draft through the API, continuing past individual failures.
///
/// Stops early only when the token is rejected, since every later call
/// would fail the same way.
pub async fn import_players(
    api: &dyn FantasyApi,
    token: &str,
    drafts: &[PlayerDraft],
) -> Result<ImportReport, ApiError> {
    let mut report = ImportReport::default();
    for draft in drafts {
        match api.create_player(token, draft).await {
            Ok(player) => {
                info!("Imported {} ({})", player.name, player.id);
                report.created += 1;
            }
            Err(e) if e.is_unauthorized() => return Err(e),
            Err(e) => {
                warn!("Failed to import {}: {}", draft.name, e);
                report.failed.push((draft.name.clone(), e.to_string()));
            }
        }
    }
    Ok(report)
}
