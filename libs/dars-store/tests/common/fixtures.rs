//! Test fixtures and factory functions for creating test data.

use chrono::{DateTime, Utc};
use dars_core::types::{DisplayFields, ItemSeed};

/// Fixed starting instant for deterministic scheduling.
pub fn start() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-09-01T07:30:15.250Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// A small lesson of Persian words, ids derived from the native text.
pub fn lesson_seeds() -> Vec<ItemSeed> {
    [
        ("سلام", "hello", "salām"),
        ("کتاب", "book", "ketāb"),
        ("آب", "water", "āb"),
        ("نان", "bread", "nān"),
        ("دوست", "friend", "dust"),
    ]
    .into_iter()
    .map(|(native, translation, transliteration)| {
        ItemSeed::from_display(
            DisplayFields {
                native: native.to_string(),
                translation: translation.to_string(),
                transliteration: transliteration.to_string(),
            },
            "lesson-1",
        )
    })
    .collect()
}
