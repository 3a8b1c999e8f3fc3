//! Date utilities for daily reset hour handling.

use chrono::{DateTime, NaiveDate, TimeZone, Timelike};

use crate::error::{CoreError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Get the study day for a local instant.
///
/// If the local hour is before the reset hour, the study day is still
/// "yesterday". This allows learners to study late at night and have it
/// count towards the previous day.
///
/// # Arguments
/// * `now` - Instant in the learner's time zone
/// * `daily_reset_hour` - Hour of day (0-23) when a new study day begins;
///   larger values are treated as 23
pub fn study_day<Tz: TimeZone>(now: &DateTime<Tz>, daily_reset_hour: u32) -> NaiveDate {
    let reset_hour = daily_reset_hour.min(23);
    let date = now.date_naive();

    if now.hour() < reset_hour {
        date.pred_opt().unwrap_or(date)
    } else {
        date
    }
}

/// Format a date as YYYY-MM-DD.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a YYYY-MM-DD date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| CoreError::InvalidDate(value.to_string()))
}
