//! SM-2 spaced repetition algorithm.
//!
//! Based on SuperMemo 2: the first two passing reviews use fixed intervals,
//! after which the interval is multiplied by a per-card ease factor.

use super::{SchedulingResult, SpacedRepetitionAlgorithm};
use crate::types::{CardState, Quality, MAX_QUALITY};
use chrono::{DateTime, Duration, Utc};

/// SM-2 algorithm with configurable parameters.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    /// Lowest quality that counts as a pass.
    pub pass_threshold: Quality,
    pub first_interval: u32,
    pub second_interval: u32,
    /// Ease subtracted on a lapse.
    pub lapse_penalty: f64,
    /// Longest interval in days a passing review can schedule.
    pub maximum_interval: u32,
}

/// One hundred years.
pub const DEFAULT_MAXIMUM_INTERVAL: u32 = 36_500;

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            pass_threshold: 3,
            first_interval: 1,
            second_interval: 6,
            lapse_penalty: 0.2,
            maximum_interval: DEFAULT_MAXIMUM_INTERVAL,
        }
    }
}

impl SpacedRepetitionAlgorithm for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn initial_state(&self, now: DateTime<Utc>) -> CardState {
        CardState {
            interval: 1,
            repetitions: 0,
            ease_factor: self.initial_ease.max(self.minimum_ease),
            next_review_at: now,
            last_reviewed_at: None,
            correct_streak: 0,
            total_reviews: 0,
        }
    }

    fn schedule(&self, state: &CardState, quality: Quality, now: DateTime<Utc>) -> SchedulingResult {
        let quality = quality.min(MAX_QUALITY);
        let passed = quality >= self.pass_threshold;

        let mut next = state.clone();
        next.total_reviews = state.total_reviews.saturating_add(1);
        next.last_reviewed_at = Some(now);

        if passed {
            next.correct_streak = state.correct_streak.saturating_add(1);
            next.repetitions = state.repetitions.saturating_add(1);
            next.interval = match next.repetitions {
                1 => self.first_interval,
                2 => self.second_interval,
                _ => grow_interval(state.interval, state.ease_factor),
            };
            next.ease_factor = state.ease_factor + ease_delta(quality);
        } else {
            next.correct_streak = 0;
            next.repetitions = 0;
            next.interval = self.first_interval;
            next.ease_factor = state.ease_factor - self.lapse_penalty;
        }

        next.ease_factor = next.ease_factor.max(self.minimum_ease);
        next.interval = next.interval.min(self.maximum_interval).max(1);
        next.next_review_at = add_days(now, next.interval);

        SchedulingResult {
            new_state: next,
            passed,
        }
    }
}

/// Standard SM-2 ease adjustment: +0.1 at quality 5, -0.14 at quality 3.
fn ease_delta(quality: Quality) -> f64 {
    let miss = f64::from(MAX_QUALITY - quality);
    0.1 - miss * (0.08 + miss * 0.02)
}

/// `now` plus whole days, saturating at the latest representable instant.
fn add_days(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    Duration::try_days(i64::from(days))
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn grow_interval(interval: u32, ease_factor: f64) -> u32 {
    let grown = (f64::from(interval) * ease_factor).round();
    if grown >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        grown as u32
    }
}
