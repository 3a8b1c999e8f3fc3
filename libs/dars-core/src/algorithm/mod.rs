//! Spaced repetition algorithm implementations.

pub mod sm2;

use crate::types::{CardState, Quality};
use chrono::{DateTime, Utc};

/// Result of scheduling a card after review.
#[derive(Debug, Clone)]
pub struct SchedulingResult {
    pub new_state: CardState,
    pub passed: bool,
}

impl SchedulingResult {
    pub fn next_due(&self) -> DateTime<Utc> {
        self.new_state.next_review_at
    }
}

/// Trait for spaced repetition algorithms.
pub trait SpacedRepetitionAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// Calculate next review state after a review.
    fn schedule(&self, state: &CardState, quality: Quality, now: DateTime<Utc>) -> SchedulingResult;

    /// Initial state for a card created at `now`. New cards are due immediately.
    fn initial_state(&self, now: DateTime<Utc>) -> CardState;
}
