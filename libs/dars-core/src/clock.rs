//! Time sources for the scheduler and streak tracker.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Offset, Utc};

use crate::date_utils::study_day;

/// Source of the current instant and the learner's study day.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// The learner's current study day.
    fn today(&self, daily_reset_hour: u32) -> NaiveDate;
}

/// Wall clock in the machine's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self, daily_reset_hour: u32) -> NaiveDate {
        study_day(&Local::now(), daily_reset_hour)
    }
}

/// Settable clock with a fixed UTC offset.
///
/// Clones share the same instant, so a test can keep a handle and advance
/// time under a scheduler that owns another clone.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
    offset: FixedOffset,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_offset(now, Utc.fix())
    }

    /// Clock whose study days are computed in `offset`.
    pub fn with_offset(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
            offset,
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn today(&self, daily_reset_hour: u32) -> NaiveDate {
        study_day(&self.now().with_timezone(&self.offset), daily_reset_hour)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn today(&self, daily_reset_hour: u32) -> NaiveDate {
        (**self).today(daily_reset_hour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn clones_share_time() {
        let clock = ManualClock::new(start());
        let handle = clock.clone();
        handle.advance(Duration::days(2));
        assert_eq!(clock.now(), start() + Duration::days(2));

        handle.set(start());
        assert_eq!(clock.now(), start());
    }

    #[test]
    fn today_uses_offset() {
        let late = DateTime::parse_from_rfc3339("2024-06-01T22:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let utc = ManualClock::new(late);
        let tehran = ManualClock::with_offset(late, FixedOffset::east_opt(12_600).unwrap());
        assert_eq!(utc.today(0), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(tehran.today(0), NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
    }
}
