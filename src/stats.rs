use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::identity::Identity;
use crate::results::GameResult;
use crate::store::TypingDb;
use crate::util::mean;

/// Number of newest results the summary is computed over
pub const STATS_WINDOW: usize = 50;

/// Number of results returned verbatim for display
pub const RECENT_RESULTS: usize = 10;

/// Performance summary over a user's most recent results.
///
/// Every aggregate covers only the newest `STATS_WINDOW` results, so
/// `games_played` tops out at that window size rather than counting the
/// user's whole history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub games_played: usize,
    pub average_wpm: f64,
    pub best_wpm: f64,
    pub average_accuracy: f64,
    pub best_accuracy: f64,
    pub recent_results: Vec<GameResult>,
}

/// Summarize results that are already ordered newest-first and limited to
/// the window. An empty slice gives the zeroed summary.
pub fn summarize(window: &[GameResult]) -> UserStats {
    if window.is_empty() {
        return UserStats::default();
    }

    let wpms: Vec<f64> = window.iter().map(|r| r.wpm).collect();
    let accuracies: Vec<f64> = window.iter().map(|r| r.accuracy).collect();

    UserStats {
        games_played: window.len(),
        average_wpm: mean(&wpms).unwrap_or_default().round(),
        best_wpm: wpms.iter().copied().fold(f64::MIN, f64::max),
        average_accuracy: mean(&accuracies).unwrap_or_default().round(),
        best_accuracy: accuracies.iter().copied().fold(f64::MIN, f64::max),
        recent_results: window.iter().take(RECENT_RESULTS).cloned().collect(),
    }
}

/// Stats for the caller; `None` when nobody is signed in
pub fn user_stats(db: &TypingDb, identity: Identity) -> Result<Option<UserStats>> {
    let Some(user) = identity.user_id() else {
        return Ok(None);
    };

    let window = db.results_for_user(user, Some(STATS_WINDOW))?;
    Ok(Some(summarize(&window)))
}
