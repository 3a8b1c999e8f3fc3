//! Storage selection for the command line.

use std::path::Path;

use dars_core::repository::{CardRepository, StreakRepository};
use dars_core::types::{CardSet, ReviewRecord, StreakState};
use dars_store::{JsonFileRepository, SqliteRepository, StoreError};

/// Progress store chosen by the database path's extension.
pub enum Store {
    Sqlite(SqliteRepository),
    Json(JsonFileRepository),
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            return Ok(Self::Json(JsonFileRepository::new(path)));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self::Sqlite(SqliteRepository::open(path)?))
    }

    /// Append to the review log. The JSON store keeps no history.
    pub fn log_review(&self, record: &ReviewRecord) -> Result<(), StoreError> {
        match self {
            Self::Sqlite(repo) => repo.append_review(record).map(|_| ()),
            Self::Json(_) => Ok(()),
        }
    }

    /// Review history of one item, if this store keeps history.
    pub fn reviews_for(&self, item_id: &str) -> Result<Option<Vec<ReviewRecord>>, StoreError> {
        match self {
            Self::Sqlite(repo) => repo.reviews_for(item_id).map(Some),
            Self::Json(_) => Ok(None),
        }
    }
}

impl CardRepository for Store {
    type Error = StoreError;

    fn load_cards(&self) -> Result<CardSet, StoreError> {
        match self {
            Self::Sqlite(repo) => repo.load_cards(),
            Self::Json(repo) => repo.load_cards(),
        }
    }

    fn save_cards(&self, cards: &CardSet) -> Result<(), StoreError> {
        match self {
            Self::Sqlite(repo) => repo.save_cards(cards),
            Self::Json(repo) => repo.save_cards(cards),
        }
    }
}

impl StreakRepository for Store {
    type Error = StoreError;

    fn load_streak(&self) -> Result<Option<StreakState>, StoreError> {
        match self {
            Self::Sqlite(repo) => repo.load_streak(),
            Self::Json(repo) => repo.load_streak(),
        }
    }

    fn save_streak(&self, streak: &StreakState) -> Result<(), StoreError> {
        match self {
            Self::Sqlite(repo) => repo.save_streak(streak),
            Self::Json(repo) => repo.save_streak(streak),
        }
    }
}
