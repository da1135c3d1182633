//! Storage Layer
//!
//! SQLite persistence for stress predictions and mood entries, with the
//! summaries the dashboard reads.

mod repository;
mod summary;

pub use repository::{BiometricEntry, MoodEntry, PredictionRecord, Repository, UpsertAction};
pub use summary::{average_mood, weekly_summary, DailyMood, MoodAverage, NEUTRAL_MOOD};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Record not found")]
    NotFound,
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StorageError::NotFound,
            other => StorageError::DatabaseError(other.to_string()),
        }
    }
}
