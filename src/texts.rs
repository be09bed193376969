use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

use crate::error::Result;
use crate::passage::{default_passage, seed_passages, Difficulty, Passage};
use crate::store::TypingDb;

/// Most passages returned by a listing
pub const TEXT_LIST_LIMIT: usize = 20;

/// Outcome of the one-time passage seeding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedStatus {
    Seeded(usize),
    AlreadyInitialized,
}

impl fmt::Display for SeedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedStatus::Seeded(_) => write!(f, "Computer science typing texts initialized"),
            SeedStatus::AlreadyInitialized => write!(f, "Texts already initialized"),
        }
    }
}

/// Up to `TEXT_LIST_LIMIT` passages matching the given filters
pub fn typing_texts(
    db: &TypingDb,
    difficulty: Option<Difficulty>,
    category: Option<&str>,
) -> Result<Vec<Passage>> {
    Ok(db.passages(difficulty, category, Some(TEXT_LIST_LIMIT))?)
}

/// A uniformly random passage of the given difficulty, or the built-in
/// default when nothing matches
pub fn random_text(db: &TypingDb, difficulty: Option<Difficulty>) -> Result<Passage> {
    random_text_with(db, difficulty, &mut rand::thread_rng())
}

pub fn random_text_with<R: Rng + ?Sized>(
    db: &TypingDb,
    difficulty: Option<Difficulty>,
    rng: &mut R,
) -> Result<Passage> {
    let candidates = db.passages(difficulty, None, None)?;

    match candidates.choose(rng) {
        Some(passage) => Ok(passage.clone()),
        None => {
            log::debug!(
                "no stored passages for difficulty {:?}, using default",
                difficulty
            );
            Ok(default_passage())
        }
    }
}

/// Insert the built-in passage set if the store holds no passages yet
pub fn initialize_texts(db: &mut TypingDb) -> Result<SeedStatus> {
    let passages = seed_passages()?;

    let status = match db.seed_passages_if_empty(&passages)? {
        Some(count) => SeedStatus::Seeded(count),
        None => SeedStatus::AlreadyInitialized,
    };
    log::info!("{status}");
    Ok(status)
}
