//! Common test utilities for storage integration tests.
//!
//! Drives a scheduler and streak tracker through a short study history so
//! each adapter can be checked against the same expectations.

pub mod fixtures;

use chrono::Duration;
use dars_core::repository::{CardRepository, StreakRepository};
use dars_core::{ManualClock, Scheduler, StreakTracker};

/// Seed a lesson, review it over a few days and record sessions, saving
/// after every mutation the way a host application would.
pub fn study_history<R>(repository: &R, clock: &ManualClock)
where
    R: CardRepository + StreakRepository,
{
    let mut scheduler = Scheduler::open(repository, clock.clone()).unwrap();
    let mut streak = StreakTracker::open(repository, clock.clone(), 0).unwrap();

    scheduler.seed(fixtures::lesson_seeds());
    scheduler.save().unwrap();

    let first = scheduler.get_due(3);
    scheduler.set_pinned(first[2].item_id.as_str(), true);
    for (card, quality) in first.iter().zip([5, 1, 4]) {
        scheduler.review(card.item_id.as_str(), quality);
    }
    scheduler.save().unwrap();
    streak.record_session_completed();
    streak.save().unwrap();

    clock.advance(Duration::days(1));
    let due: Vec<_> = scheduler
        .get_due(10)
        .into_iter()
        .map(|card| card.item_id)
        .collect();
    for id in &due {
        scheduler.review(id.as_str(), 3);
    }
    scheduler.save().unwrap();
    streak.record_session_completed();
    streak.save().unwrap();
}
