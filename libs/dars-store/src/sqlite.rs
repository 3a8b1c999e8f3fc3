//! SQLite repository for learner progress.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use dars_core::date_utils::{format_date, parse_date};
use dars_core::repository::{CardRepository, StreakRepository};
use dars_core::types::{
    Card, CardSet, CardState, DisplayFields, ItemId, Quality, ReviewRecord, StreakState,
};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::schema::{INIT_SCHEMA_VERSION, SCHEMA};

const CARD_COLUMNS: &str = "item_id, native_text, translation, transliteration, source_group_id,
    interval_days, repetitions, ease_factor, next_review_at, last_reviewed_at,
    correct_streak, total_reviews, is_pinned";

const REVIEW_COLUMNS: &str = "item_id, quality, reviewed_at, passed, interval_before,
    interval_after, ease_before, ease_after";

/// SQLite implementation of the card and streak repositories.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        let repo = Self { conn };
        repo.initialize()?;
        info!(path = %path.as_ref().display(), "opened sqlite database");
        Ok(repo)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        self.conn.execute_batch(INIT_SCHEMA_VERSION)?;
        Ok(())
    }

    /// Highest schema version recorded in the database.
    pub fn schema_version(&self) -> Result<i32> {
        self.conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .map_err(Into::into)
    }

    /// Append a review to the history log.
    pub fn append_review(&self, record: &ReviewRecord) -> Result<i64> {
        self.conn.execute(
            &format!(
                "INSERT INTO review_log ({REVIEW_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
            ),
            params![
                record.item_id.as_str(),
                record.quality,
                format_timestamp(record.reviewed_at),
                record.passed,
                record.interval_before,
                record.interval_after,
                record.ease_before,
                record.ease_after,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Review history of one item, oldest first.
    pub fn reviews_for(&self, item_id: &str) -> Result<Vec<ReviewRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {REVIEW_COLUMNS} FROM review_log WHERE item_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt
            .query_map(params![item_id], ReviewRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(ReviewRow::into_record).collect()
    }

    /// Full review history, oldest first.
    pub fn all_reviews(&self) -> Result<Vec<ReviewRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {REVIEW_COLUMNS} FROM review_log ORDER BY id"))?;
        let rows = stmt
            .query_map([], ReviewRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(ReviewRow::into_record).collect()
    }
}

impl CardRepository for SqliteRepository {
    type Error = StoreError;

    fn load_cards(&self) -> Result<CardSet> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {CARD_COLUMNS} FROM cards"))?;
        let rows = stmt
            .query_map([], CardRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut cards = CardSet::new();
        for row in rows {
            let item_id = row.item_id.clone();
            match row.into_card() {
                Ok(card) => {
                    cards.insert(card);
                }
                Err(e) => warn!(item_id = %item_id, error = %e, "skipping unreadable card row"),
            }
        }
        debug!(cards = cards.len(), "loaded cards from sqlite");
        Ok(cards)
    }

    fn save_cards(&self, cards: &CardSet) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM cards", [])?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO cards ({CARD_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
            ))?;
            for card in cards {
                stmt.execute(params![
                    card.item_id.as_str(),
                    card.display.native,
                    card.display.translation,
                    card.display.transliteration,
                    card.source_group_id,
                    card.state.interval,
                    card.state.repetitions,
                    card.state.ease_factor,
                    format_timestamp(card.state.next_review_at),
                    card.state.last_reviewed_at.map(format_timestamp),
                    card.state.correct_streak,
                    card.state.total_reviews,
                    card.is_pinned,
                ])?;
            }
        }
        tx.commit()?;
        debug!(cards = cards.len(), "saved cards to sqlite");
        Ok(())
    }
}

impl StreakRepository for SqliteRepository {
    type Error = StoreError;

    fn load_streak(&self) -> Result<Option<StreakState>> {
        let row: Option<(u32, String)> = self
            .conn
            .query_row(
                "SELECT current_streak, last_completion_date FROM streak WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        row.map(|(current_streak, date)| -> Result<StreakState> {
            let last_completion_date =
                parse_date(&date).map_err(|e| StoreError::InvalidData(e.to_string()))?;
            Ok(StreakState {
                current_streak,
                last_completion_date,
            })
        })
        .transpose()
    }

    fn save_streak(&self, streak: &StreakState) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO streak (id, current_streak, last_completion_date)
             VALUES (1, ?1, ?2)",
            params![streak.current_streak, format_date(streak.last_completion_date)],
        )?;
        Ok(())
    }
}

/// Card columns as stored, before validation.
struct CardRow {
    item_id: String,
    native: String,
    translation: String,
    transliteration: String,
    source_group_id: String,
    interval: u32,
    repetitions: u32,
    ease_factor: f64,
    next_review_at: String,
    last_reviewed_at: Option<String>,
    correct_streak: u32,
    total_reviews: u32,
    is_pinned: bool,
}

impl CardRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            item_id: row.get(0)?,
            native: row.get(1)?,
            translation: row.get(2)?,
            transliteration: row.get(3)?,
            source_group_id: row.get(4)?,
            interval: row.get(5)?,
            repetitions: row.get(6)?,
            ease_factor: row.get(7)?,
            next_review_at: row.get(8)?,
            last_reviewed_at: row.get(9)?,
            correct_streak: row.get(10)?,
            total_reviews: row.get(11)?,
            is_pinned: row.get(12)?,
        })
    }

    fn into_card(self) -> Result<Card> {
        let item_id =
            ItemId::new(self.item_id).map_err(|e| StoreError::InvalidData(e.to_string()))?;
        let last_reviewed_at = self
            .last_reviewed_at
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;

        Ok(Card {
            item_id,
            display: DisplayFields {
                native: self.native,
                translation: self.translation,
                transliteration: self.transliteration,
            },
            source_group_id: self.source_group_id,
            state: CardState {
                interval: self.interval,
                repetitions: self.repetitions,
                ease_factor: self.ease_factor,
                next_review_at: parse_timestamp(&self.next_review_at)?,
                last_reviewed_at,
                correct_streak: self.correct_streak,
                total_reviews: self.total_reviews,
            },
            is_pinned: self.is_pinned,
        })
    }
}

/// Review log columns as stored, before validation.
struct ReviewRow {
    item_id: String,
    quality: Quality,
    reviewed_at: String,
    passed: bool,
    interval_before: u32,
    interval_after: u32,
    ease_before: f64,
    ease_after: f64,
}

impl ReviewRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            item_id: row.get(0)?,
            quality: row.get(1)?,
            reviewed_at: row.get(2)?,
            passed: row.get(3)?,
            interval_before: row.get(4)?,
            interval_after: row.get(5)?,
            ease_before: row.get(6)?,
            ease_after: row.get(7)?,
        })
    }

    fn into_record(self) -> Result<ReviewRecord> {
        Ok(ReviewRecord {
            item_id: ItemId::new(self.item_id)
                .map_err(|e| StoreError::InvalidData(e.to_string()))?,
            quality: self.quality,
            reviewed_at: parse_timestamp(&self.reviewed_at)?,
            passed: self.passed,
            interval_before: self.interval_before,
            interval_after: self.interval_after,
            ease_before: self.ease_before,
            ease_after: self.ease_after,
        })
    }
}

/// RFC 3339 in UTC, keeping sub-second precision.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidData(format!("timestamp {value:?}: {e}")))
}
