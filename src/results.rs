use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::identity::{Identity, UserId};
use crate::store::TypingDb;

/// Row id of a stored game result
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResultId(pub i64);

/// Metrics of one finished session, as submitted by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGameResult {
    pub wpm: f64,
    pub accuracy: f64,
    /// seconds
    pub time_spent: f64,
    pub text_length: u32,
    pub mistakes: u32,
    pub game_mode: String,
}

/// A stored, immutable game result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub id: ResultId,
    pub user_id: UserId,
    pub wpm: f64,
    pub accuracy: f64,
    pub time_spent: f64,
    pub text_length: u32,
    pub mistakes: u32,
    pub game_mode: String,
    pub created_at: DateTime<Utc>,
}

/// Append a result owned by the caller.
///
/// Metrics are stored as submitted; no plausibility checks are made.
pub fn save_game_result(
    db: &TypingDb,
    identity: Identity,
    metrics: &NewGameResult,
    now: DateTime<Utc>,
) -> Result<ResultId> {
    let Identity::Authenticated(user) = identity else {
        log::warn!("rejected result save from anonymous caller");
        return Err(Error::Unauthenticated);
    };

    let id = db.insert_result(user, metrics, now)?;
    log::info!(
        "saved result {} for user {}: {} wpm, {}% acc, mode {}",
        id.0,
        user.0,
        metrics.wpm,
        metrics.accuracy,
        metrics.game_mode
    );
    Ok(id)
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    date: String,
    game_mode: &'a str,
    wpm: f64,
    accuracy: f64,
    time_spent: String,
    text_length: u32,
    mistakes: u32,
}

/// Write every stored result of the caller to `path` as CSV, newest first.
/// Returns the number of rows written.
pub fn export_results_csv<P: AsRef<Path>>(
    db: &TypingDb,
    identity: Identity,
    path: P,
) -> Result<usize> {
    let user = identity.user_id().ok_or(Error::Unauthenticated)?;
    let results = db.results_for_user(user, None)?;

    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for r in &results {
        writer.serialize(CsvRow {
            date: r.created_at.to_rfc3339(),
            game_mode: &r.game_mode,
            wpm: r.wpm,
            accuracy: r.accuracy,
            time_spent: format!("{:.2}", r.time_spent),
            text_length: r.text_length,
            mistakes: r.mistakes,
        })?;
    }
    writer.flush()?;

    log::info!(
        "exported {} results to {}",
        results.len(),
        path.as_ref().display()
    );
    Ok(results.len())
}
