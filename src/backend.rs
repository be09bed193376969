use chrono::Utc;
use std::path::Path;

use crate::error::Result;
use crate::identity::{AuthProvider, Identity};
use crate::leaderboard::{leaderboard, LeaderboardEntry};
use crate::passage::{Difficulty, Passage};
use crate::results::{export_results_csv, save_game_result, NewGameResult, ResultId};
use crate::stats::{user_stats, UserStats};
use crate::store::TypingDb;
use crate::texts::{initialize_texts, random_text, typing_texts, SeedStatus};

/// Request/response operations over the store, resolved against the
/// caller's identity. Each call is independent; nothing is retried.
pub struct Backend<A: AuthProvider> {
    db: TypingDb,
    auth: A,
}

impl<A: AuthProvider> Backend<A> {
    pub fn new(db: TypingDb, auth: A) -> Self {
        Self { db, auth }
    }

    pub fn identity(&self) -> Identity {
        self.auth.current_identity()
    }

    pub fn get_typing_texts(
        &self,
        difficulty: Option<Difficulty>,
        category: Option<&str>,
    ) -> Result<Vec<Passage>> {
        typing_texts(&self.db, difficulty, category)
    }

    pub fn get_random_text(&self, difficulty: Option<Difficulty>) -> Result<Passage> {
        random_text(&self.db, difficulty)
    }

    pub fn save_game_result(&self, metrics: &NewGameResult) -> Result<ResultId> {
        save_game_result(&self.db, self.identity(), metrics, Utc::now())
    }

    pub fn get_user_stats(&self) -> Result<Option<UserStats>> {
        user_stats(&self.db, self.identity())
    }

    pub fn get_leaderboard(&self, game_mode: Option<&str>) -> Result<Vec<LeaderboardEntry>> {
        leaderboard(&self.db, game_mode)
    }

    pub fn initialize_texts(&mut self) -> Result<SeedStatus> {
        initialize_texts(&mut self.db)
    }

    pub fn export_results<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        export_results_csv(&self.db, self.identity(), path)
    }
}
