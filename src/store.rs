use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result, Row, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

use crate::app_dirs::AppDirs;
use crate::identity::{User, UserId};
use crate::passage::{Difficulty, Passage};
use crate::results::{GameResult, NewGameResult, ResultId};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    email TEXT,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS typing_texts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL UNIQUE,
    content TEXT NOT NULL,
    difficulty TEXT NOT NULL,
    category TEXT NOT NULL,
    word_count INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS by_difficulty ON typing_texts(difficulty);
CREATE INDEX IF NOT EXISTS by_category ON typing_texts(category);

CREATE TABLE IF NOT EXISTS game_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    wpm REAL NOT NULL,
    accuracy REAL NOT NULL,
    time_spent REAL NOT NULL,
    text_length INTEGER NOT NULL,
    mistakes INTEGER NOT NULL,
    game_mode TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS by_user ON game_results(user_id, created_at);
CREATE INDEX IF NOT EXISTS by_wpm ON game_results(wpm);
CREATE INDEX IF NOT EXISTS by_game_mode ON game_results(game_mode, wpm);
"#;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const RESULT_COLUMNS: &str =
    "r.id, r.user_id, r.wpm, r.accuracy, r.time_spent, r.text_length, r.mistakes, r.game_mode, r.created_at";

/// SQLite-backed store for passages, users and game results
#[derive(Debug)]
pub struct TypingDb {
    conn: Connection,
}

impl TypingDb {
    /// Open (or create) the database at the default state path
    pub fn open_default() -> crate::error::Result<Self> {
        Self::open(AppDirs::db_path())
    }

    /// Open (or create) the database at `path`, creating parent directories
    pub fn open<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        // other processes may hold the write lock while seeding
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self::with_connection(conn)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Find the user with exactly this name/email pair, inserting one if absent.
    ///
    /// The lookup and insert share one IMMEDIATE transaction so two processes
    /// signing in as the same new user end up with a single row.
    pub fn upsert_user(&self, name: Option<&str>, email: Option<&str>) -> Result<UserId> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;

        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM users WHERE name IS ?1 AND email IS ?2 ORDER BY id LIMIT 1",
                params![name, email],
                |row| row.get(0),
            )
            .optional()?;

        let id = match existing {
            Some(id) => id,
            None => {
                tx.execute(
                    "INSERT INTO users (name, email, created_at) VALUES (?1, ?2, ?3)",
                    params![name, email, Utc::now().timestamp_millis()],
                )?;
                tx.last_insert_rowid()
            }
        };

        tx.commit()?;
        Ok(UserId(id))
    }

    pub fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, name, email FROM users WHERE id = ?1",
                [id.0],
                |row| {
                    Ok(User {
                        id: UserId(row.get(0)?),
                        name: row.get(1)?,
                        email: row.get(2)?,
                    })
                },
            )
            .optional()
    }

    pub fn passage_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM typing_texts", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Passages matching every given filter, in insertion order.
    /// `limit` of `None` returns all matches.
    pub fn passages(
        &self,
        difficulty: Option<Difficulty>,
        category: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Passage>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, title, content, difficulty, category, word_count
            FROM typing_texts
            WHERE (?1 IS NULL OR difficulty = ?1)
              AND (?2 IS NULL OR category = ?2)
            ORDER BY id
            LIMIT ?3
            "#,
        )?;

        let rows = stmt.query_map(params![difficulty, category, sql_limit(limit)], |row| {
            Ok(Passage {
                id: Some(row.get(0)?),
                title: row.get(1)?,
                content: row.get(2)?,
                difficulty: row.get(3)?,
                category: row.get(4)?,
                word_count: row.get(5)?,
            })
        })?;

        rows.collect()
    }

    /// Insert `passages` only if the passage table is empty.
    ///
    /// The emptiness check and the inserts share one IMMEDIATE transaction, so
    /// concurrent first-time callers serialize on the write lock and only one
    /// of them observes an empty table. Titles are unique, so a duplicate row
    /// is skipped rather than inserted twice.
    ///
    /// Returns `Some(inserted)` when seeding happened, `None` otherwise.
    pub fn seed_passages_if_empty(&mut self, passages: &[Passage]) -> Result<Option<usize>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let populated: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM typing_texts)",
            [],
            |row| row.get(0),
        )?;
        if populated {
            return Ok(None);
        }

        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR IGNORE INTO typing_texts
                (title, content, difficulty, category, word_count)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;
            for p in passages {
                inserted += stmt.execute(params![
                    p.title,
                    p.content,
                    p.difficulty,
                    p.category,
                    p.word_count,
                ])?;
            }
        }

        tx.commit()?;
        Ok(Some(inserted))
    }

    pub fn insert_result(
        &self,
        user: UserId,
        result: &NewGameResult,
        created_at: DateTime<Utc>,
    ) -> Result<ResultId> {
        self.conn.execute(
            r#"
            INSERT INTO game_results
            (user_id, wpm, accuracy, time_spent, text_length, mistakes, game_mode, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                user.0,
                result.wpm,
                result.accuracy,
                result.time_spent,
                result.text_length,
                result.mistakes,
                result.game_mode,
                created_at.timestamp_millis(),
            ],
        )?;

        Ok(ResultId(self.conn.last_insert_rowid()))
    }

    /// A user's results, newest first
    pub fn results_for_user(&self, user: UserId, limit: Option<usize>) -> Result<Vec<GameResult>> {
        let sql = format!(
            r#"
            SELECT {RESULT_COLUMNS}
            FROM game_results r
            WHERE r.user_id = ?1
            ORDER BY r.created_at DESC, r.id DESC
            LIMIT ?2
            "#
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user.0, sql_limit(limit)], row_to_result)?;
        rows.collect()
    }

    /// Highest-WPM results joined with their owners, optionally within one
    /// game mode. Equal WPM goes to the earlier result.
    pub fn top_results(
        &self,
        game_mode: Option<&str>,
        limit: usize,
    ) -> Result<Vec<(GameResult, Option<User>)>> {
        let sql = format!(
            r#"
            SELECT {RESULT_COLUMNS}, u.id, u.name, u.email
            FROM game_results r
            LEFT JOIN users u ON u.id = r.user_id
            WHERE (?1 IS NULL OR r.game_mode = ?1)
            ORDER BY r.wpm DESC, r.created_at ASC, r.id ASC
            LIMIT ?2
            "#
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![game_mode, sql_limit(Some(limit))], |row| {
            let result = row_to_result(row)?;
            let user = match row.get::<_, Option<i64>>(9)? {
                Some(id) => Some(User {
                    id: UserId(id),
                    name: row.get(10)?,
                    email: row.get(11)?,
                }),
                None => None,
            };
            Ok((result, user))
        })?;
        rows.collect()
    }
}

/// SQLite treats a negative LIMIT as unbounded
fn sql_limit(limit: Option<usize>) -> i64 {
    limit.map_or(-1, |l| l as i64)
}

fn row_to_result(row: &Row<'_>) -> Result<GameResult> {
    let created_ms: i64 = row.get(8)?;
    let created_at = DateTime::<Utc>::from_timestamp_millis(created_ms)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(8, created_ms))?;

    Ok(GameResult {
        id: ResultId(row.get(0)?),
        user_id: UserId(row.get(1)?),
        wpm: row.get(2)?,
        accuracy: row.get(3)?,
        time_spent: row.get(4)?,
        text_length: row.get(5)?,
        mistakes: row.get(6)?,
        game_mode: row.get(7)?,
        created_at,
    })
}
