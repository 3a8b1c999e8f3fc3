//! Error types for dars-core.

use thiserror::Error;

/// Result type alias using CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised when parsing values at the API boundary.
///
/// Scheduling itself never fails; these only come from turning caller input
/// (grades, dates, ids) into typed values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid grade: {0}")]
    InvalidGrade(String),

    #[error("invalid date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),

    #[error("item id must not be empty")]
    InvalidItemId,
}
