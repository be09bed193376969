use include_dir::{include_dir, Dir};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use serde_json::from_str;
use std::io;
use std::str::FromStr;
use thiserror::Error;

use crate::error::Result;

static PASSAGE_DIR: Dir = include_dir!("src/passages");

const SEED_FILE: &str = "computer_science.json";

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Cycle to the next difficulty, wrapping around after `Hard`
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown difficulty: {0}")]
pub struct ParseDifficultyError(String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseDifficultyError(s.to_string())),
        }
    }
}

impl ToSql for Difficulty {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for Difficulty {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// A fixed text presented to the user to type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// `None` for the built-in default passage, which is never stored
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    pub difficulty: Difficulty,
    pub category: String,
    pub word_count: u32,
}

impl Passage {
    pub fn is_builtin(&self) -> bool {
        self.id.is_none()
    }
}

/// Returned whenever no stored passage matches a request
pub fn default_passage() -> Passage {
    Passage {
        id: None,
        title: "Computer Science Practice".to_string(),
        content: "Computer science focuses on algorithms data structures and programming. Typing technical content improves both speed and accuracy.".to_string(),
        difficulty: Difficulty::Easy,
        category: "computer-science".to_string(),
        word_count: 20,
    }
}

#[derive(Deserialize, Clone, Debug)]
struct PassageSet {
    #[allow(dead_code)]
    name: String,
    passages: Vec<Passage>,
}

/// The initial passage set inserted by the one-time seeding operation
pub fn seed_passages() -> Result<Vec<Passage>> {
    let file = PASSAGE_DIR.get_file(SEED_FILE).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("seed file {SEED_FILE} not embedded"),
        )
    })?;

    let contents = file.contents_utf8().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("seed file {SEED_FILE} is not valid UTF-8"),
        )
    })?;

    let set: PassageSet = from_str(contents)?;
    Ok(set.passages)
}
