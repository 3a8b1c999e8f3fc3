//! Spaced repetition core for the Persian vocabulary trainer.
//!
//! Provides:
//! - SM-2 scheduling algorithm
//! - Scheduler owning one learner's card set (seed, due, review, stats)
//! - Day-based study streak tracker
//! - Repository traits and an in-memory repository
//! - Review history queries (needs-practice heuristic)

pub mod algorithm;
pub mod clock;
pub mod date_utils;
pub mod error;
pub mod events;
pub mod history;
pub mod repository;
pub mod scheduler;
pub mod streak;
pub mod types;

pub use algorithm::{SchedulingResult, SpacedRepetitionAlgorithm};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, Result};
pub use events::ProgressEvent;
pub use repository::{CardRepository, MemoryRepository, StreakRepository};
pub use scheduler::Scheduler;
pub use streak::StreakTracker;
pub use types::{
    Card, CardSet, CardState, DisplayFields, Grade, ItemId, ItemSeed, Quality, ReviewRecord,
    Stats, StreakState,
};
