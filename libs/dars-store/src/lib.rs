//! Storage adapters for learner progress.
//!
//! Both adapters implement the repository traits from `dars-core`:
//! - `SqliteRepository`: local SQLite database, also keeps the review log
//! - `JsonFileRepository`: one JSON document on disk

pub mod error;
pub mod json;
pub mod schema;
pub mod sqlite;

pub use error::{Result, StoreError};
pub use json::JsonFileRepository;
pub use sqlite::SqliteRepository;
