//! Day-based study streak.

use chrono::NaiveDate;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::events::ProgressEvent;
use crate::repository::StreakRepository;
use crate::types::StreakState;

/// Tracks consecutive study days with at least one completed session.
pub struct StreakTracker<R, C = SystemClock> {
    repository: R,
    clock: C,
    daily_reset_hour: u32,
    state: Option<StreakState>,
}

impl<R: StreakRepository, C: Clock> StreakTracker<R, C> {
    /// Load the streak record from the repository.
    ///
    /// `daily_reset_hour` decides when a new study day begins.
    pub fn open(repository: R, clock: C, daily_reset_hour: u32) -> Result<Self, R::Error> {
        let state = repository.load_streak()?;
        Ok(Self {
            repository,
            clock,
            daily_reset_hour,
            state,
        })
    }

    /// Count a finished review session towards today's streak.
    ///
    /// At most one session counts per study day.
    pub fn record_session_completed(&mut self) -> Option<ProgressEvent> {
        let today = self.today();

        let current_streak = match &self.state {
            Some(state) if state.last_completion_date == today => return None,
            Some(state) if is_day_before(state.last_completion_date, today) => {
                state.current_streak.saturating_add(1)
            }
            _ => 1,
        };

        debug!(current_streak, %today, "session completed");
        self.state = Some(StreakState {
            current_streak,
            last_completion_date: today,
        });
        Some(ProgressEvent::SessionCompleted {
            streak: current_streak,
        })
    }

    /// Current streak length as of today.
    ///
    /// A streak whose last session was yesterday is still alive. Anything
    /// older reads as zero; the stored record is only reset by the next
    /// completed session.
    pub fn get_streak(&self) -> u32 {
        let today = self.today();
        match &self.state {
            Some(state)
                if state.last_completion_date == today
                    || is_day_before(state.last_completion_date, today) =>
            {
                state.current_streak
            }
            _ => 0,
        }
    }

    pub fn state(&self) -> Option<&StreakState> {
        self.state.as_ref()
    }

    /// Adopt a remote streak record if it is more recent.
    ///
    /// The later completion date wins; on the same date the longer streak
    /// wins. Returns whether the remote record was taken.
    pub fn merge_remote(&mut self, remote: StreakState) -> bool {
        let take = match &self.state {
            Some(local) => {
                (remote.last_completion_date, remote.current_streak)
                    > (local.last_completion_date, local.current_streak)
            }
            None => true,
        };
        if take {
            self.state = Some(remote);
        }
        take
    }

    /// Write the streak record through the repository, if there is one.
    pub fn save(&self) -> Result<(), R::Error> {
        match &self.state {
            Some(state) => self.repository.save_streak(state),
            None => Ok(()),
        }
    }

    fn today(&self) -> NaiveDate {
        self.clock.today(self.daily_reset_hour)
    }
}

fn is_day_before(earlier: NaiveDate, later: NaiveDate) -> bool {
    earlier.succ_opt() == Some(later)
}
