use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::identity::User;
use crate::results::GameResult;
use crate::store::TypingDb;

/// Number of ranked entries returned
pub const LEADERBOARD_SIZE: usize = 10;

pub const ANONYMOUS_NAME: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub result: GameResult,
    pub username: String,
}

/// Name shown for a result owner: display name, then email, then "Anonymous".
/// Blank values are skipped.
pub fn display_name(user: Option<&User>) -> String {
    user.and_then(|u| {
        [u.name.as_deref(), u.email.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
    })
    .unwrap_or(ANONYMOUS_NAME)
    .to_string()
}

/// Top results by descending WPM, optionally restricted to one game mode.
///
/// Equal WPM ranks the earlier result first.
pub fn leaderboard(db: &TypingDb, game_mode: Option<&str>) -> Result<Vec<LeaderboardEntry>> {
    let rows = db.top_results(game_mode, LEADERBOARD_SIZE)?;

    Ok(rows
        .into_iter()
        .map(|(result, user)| LeaderboardEntry {
            username: display_name(user.as_ref()),
            result,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::UserId;
    use crate::results::NewGameResult;
    use chrono::Utc;

    fn user(name: Option<&str>, email: Option<&str>) -> User {
        User {
            id: UserId(1),
            name: name.map(str::to_string),
            email: email.map(str::to_string),
        }
    }

    fn metrics(wpm: f64, mode: &str) -> NewGameResult {
        NewGameResult {
            wpm,
            accuracy: 93.0,
            time_spent: 25.0,
            text_length: 90,
            mistakes: 6,
            game_mode: mode.to_string(),
        }
    }

    #[test]
    fn display_name_fallback_chain() {
        assert_eq!(
            display_name(Some(&user(Some("Ada"), Some("ada@example.com")))),
            "Ada"
        );
        assert_eq!(
            display_name(Some(&user(None, Some("ada@example.com")))),
            "ada@example.com"
        );
        assert_eq!(
            display_name(Some(&user(Some(""), Some("ada@example.com")))),
            "ada@example.com"
        );
        assert_eq!(display_name(Some(&user(None, None))), "Anonymous");
        assert_eq!(display_name(None), "Anonymous");
    }

    #[test]
    fn ranks_by_descending_wpm() {
        let db = TypingDb::open_in_memory().unwrap();
        let ada = db.upsert_user(Some("Ada"), None).unwrap();
        let now = Utc::now();
        for wpm in [120.0, 95.0, 140.0, 80.0] {
            db.insert_result(ada, &metrics(wpm, "medium"), now).unwrap();
        }

        let board = leaderboard(&db, None).unwrap();

        assert_eq!(
            board.iter().map(|e| e.result.wpm).collect::<Vec<_>>(),
            vec![140.0, 120.0, 95.0, 80.0]
        );
        assert!(board.iter().all(|e| e.username == "Ada"));
    }

    #[test]
    fn truncates_to_ten() {
        let db = TypingDb::open_in_memory().unwrap();
        let ada = db.upsert_user(Some("Ada"), None).unwrap();
        let now = Utc::now();
        for i in 0..15 {
            db.insert_result(ada, &metrics(50.0 + i as f64, "easy"), now)
                .unwrap();
        }

        let board = leaderboard(&db, None).unwrap();

        assert_eq!(board.len(), LEADERBOARD_SIZE);
        assert_eq!(board[0].result.wpm, 64.0);
        assert_eq!(board[9].result.wpm, 55.0);
    }

    #[test]
    fn filters_by_game_mode() {
        let db = TypingDb::open_in_memory().unwrap();
        let ada = db.upsert_user(Some("Ada"), None).unwrap();
        let now = Utc::now();
        db.insert_result(ada, &metrics(150.0, "easy"), now).unwrap();
        db.insert_result(ada, &metrics(90.0, "hard"), now).unwrap();
        db.insert_result(ada, &metrics(110.0, "hard"), now).unwrap();

        let board = leaderboard(&db, Some("hard")).unwrap();

        assert_eq!(
            board.iter().map(|e| e.result.wpm).collect::<Vec<_>>(),
            vec![110.0, 90.0]
        );
    }

    #[test]
    fn empty_store_gives_empty_board() {
        let db = TypingDb::open_in_memory().unwrap();

        assert!(leaderboard(&db, None).unwrap().is_empty());
    }
}
