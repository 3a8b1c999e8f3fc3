//! Environment configuration.

use std::path::PathBuf;

use tracing::warn;

use dars_core::algorithm::sm2::DEFAULT_MAXIMUM_INTERVAL;

const DEFAULT_DUE_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Progress database. A `.json` extension selects the JSON document store.
    pub db_path: PathBuf,
    /// Hour of day (0-23) when a new study day begins.
    pub daily_reset_hour: u32,
    /// Default number of cards listed by `due`.
    pub due_limit: usize,
    /// Longest review interval in days.
    pub max_interval_days: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("DARS_DB_PATH")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let daily_reset_hour = parse_or(&lookup, "DARS_DAILY_RESET_HOUR", 0u32, |hour| *hour < 24);
        let due_limit = parse_or(&lookup, "DARS_DUE_LIMIT", DEFAULT_DUE_LIMIT, |limit| *limit > 0);
        let max_interval_days = parse_or(
            &lookup,
            "DARS_MAX_INTERVAL_DAYS",
            DEFAULT_MAXIMUM_INTERVAL,
            |days| (1..=DEFAULT_MAXIMUM_INTERVAL).contains(days),
        );

        Self {
            db_path,
            daily_reset_hour,
            due_limit,
            max_interval_days,
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dars")
        .join("dars.db")
}

fn parse_or<F, T, V>(lookup: &F, key: &str, default: T, valid: V) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    V: Fn(&T) -> bool,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => value,
        _ => {
            warn!(key, value = %raw, "ignoring invalid configuration value");
            default
        }
    }
}
