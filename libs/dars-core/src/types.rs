//! Core types for the vocabulary scheduler.

use std::borrow::Borrow;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Namespace for item ids derived from native-script text.
const ITEM_NAMESPACE: Uuid = Uuid::from_u128(0x6d1f_2c3a_9b84_4e57_a0c2_5f3e_8d71_b946);

/// Stable identity of a learnable item.
///
/// Deserialization goes through [`ItemId::new`], so stored and catalog ids
/// are always trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Wrap a caller-supplied id. Surrounding whitespace is trimmed.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidItemId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Derive an id from the item's native-script text.
    ///
    /// The same text always yields the same id, so content without a catalog
    /// id still maps onto exactly one card.
    pub fn from_native_text(text: &str) -> Self {
        Self(Uuid::new_v5(&ITEM_NAMESPACE, text.trim().as_bytes()).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ItemId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ItemId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Display payload of an item. Opaque to the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFields {
    /// Text in Persian script.
    pub native: String,
    pub translation: String,
    #[serde(default)]
    pub transliteration: String,
}

/// A content item offered for seeding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawItemSeed")]
pub struct ItemSeed {
    pub item_id: ItemId,
    pub display: DisplayFields,
    pub source_group_id: String,
}

impl ItemSeed {
    /// Build a seed whose id is derived from the native text.
    pub fn from_display(display: DisplayFields, source_group_id: impl Into<String>) -> Self {
        Self {
            item_id: ItemId::from_native_text(&display.native),
            display,
            source_group_id: source_group_id.into(),
        }
    }
}

/// Catalog form of a seed, where the id may be left out.
#[derive(Deserialize)]
struct RawItemSeed {
    #[serde(default)]
    item_id: Option<ItemId>,
    display: DisplayFields,
    #[serde(default)]
    source_group_id: String,
}

impl From<RawItemSeed> for ItemSeed {
    fn from(raw: RawItemSeed) -> Self {
        let item_id = raw
            .item_id
            .unwrap_or_else(|| ItemId::from_native_text(&raw.display.native));
        Self {
            item_id,
            display: raw.display,
            source_group_id: raw.source_group_id,
        }
    }
}

/// Scheduling state of a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardState {
    /// Days until the next review. Never below 1.
    pub interval: u32,
    /// Consecutive passing reviews since the last lapse.
    pub repetitions: u32,
    /// Never below the algorithm's minimum ease.
    pub ease_factor: f64,
    pub next_review_at: DateTime<Utc>,
    #[serde(default)]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    /// Consecutive passing reviews, for reporting.
    pub correct_streak: u32,
    pub total_reviews: u32,
}

/// Scheduling record for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub item_id: ItemId,
    pub display: DisplayFields,
    #[serde(default)]
    pub source_group_id: String,
    #[serde(flatten)]
    pub state: CardState,
    #[serde(default)]
    pub is_pinned: bool,
}

impl Card {
    /// Create a card for a seed with the given initial state.
    pub fn from_seed(seed: ItemSeed, state: CardState) -> Self {
        Self {
            item_id: seed.item_id,
            display: seed.display,
            source_group_id: seed.source_group_id,
            state,
            is_pinned: false,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.state.next_review_at <= now
    }
}

/// All cards of one learner, keyed by item id.
///
/// Ordered so the persisted form is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardSet(BTreeMap<ItemId, Card>);

impl CardSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.0.contains_key(item_id)
    }

    pub fn get(&self, item_id: &str) -> Option<&Card> {
        self.0.get(item_id)
    }

    pub fn get_mut(&mut self, item_id: &str) -> Option<&mut Card> {
        self.0.get_mut(item_id)
    }

    /// Insert a card, replacing any card with the same id.
    pub fn insert(&mut self, card: Card) -> Option<Card> {
        self.0.insert(card.item_id.clone(), card)
    }

    pub fn iter(&self) -> btree_map::Values<'_, ItemId, Card> {
        self.0.values()
    }
}

impl FromIterator<Card> for CardSet {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        let mut set = Self::new();
        for card in iter {
            set.insert(card);
        }
        set
    }
}

impl IntoIterator for CardSet {
    type Item = Card;
    type IntoIter = btree_map::IntoValues<ItemId, Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_values()
    }
}

impl<'a> IntoIterator for &'a CardSet {
    type Item = &'a Card;
    type IntoIter = btree_map::Values<'a, ItemId, Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.values()
    }
}

/// Review quality, conventionally 1-5. Passing is 3 and above.
pub type Quality = u8;

/// Highest quality the ease formula understands.
pub const MAX_QUALITY: Quality = 5;

/// Answer buttons offered to the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Again,
    Hard,
    Good,
    Easy,
}

impl Grade {
    /// Quality reported to the scheduler for this button.
    pub fn quality(self) -> Quality {
        match self {
            Self::Again => 1,
            Self::Hard => 3,
            Self::Good => 4,
            Self::Easy => 5,
        }
    }

    /// Map a multiple-choice or typed answer to a grade.
    /// Wrong -> Again, Correct -> Easy
    pub fn from_correct(correct: bool) -> Self {
        if correct { Self::Easy } else { Self::Again }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        }
    }
}

impl FromStr for Grade {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "again" | "wrong" => Ok(Self::Again),
            "hard" => Ok(Self::Hard),
            "good" => Ok(Self::Good),
            "easy" | "correct" => Ok(Self::Easy),
            _ => Err(CoreError::InvalidGrade(s.to_string())),
        }
    }
}

/// Due and total card counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub due_count: usize,
    pub total_count: usize,
}

/// Day-based session completion record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current_streak: u32,
    pub last_completion_date: NaiveDate,
}

/// Outcome of one effective review, kept for history and sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub item_id: ItemId,
    pub quality: Quality,
    pub reviewed_at: DateTime<Utc>,
    pub passed: bool,
    pub interval_before: u32,
    pub interval_after: u32,
    pub ease_before: f64,
    pub ease_after: f64,
}
