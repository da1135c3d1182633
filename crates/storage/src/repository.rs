//! Repository Implementation

use crate::StorageError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS stress_predictions (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL,
    prediction  TEXT    NOT NULL CHECK (prediction IN ('Low', 'High')),
    confidence  REAL    NOT NULL,
    method      TEXT    NOT NULL,
    heart_rate  INTEGER NOT NULL,
    sleep_hours REAL    NOT NULL,
    steps       INTEGER NOT NULL,
    created_at  TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_stress_predictions_user
    ON stress_predictions (user_id, created_at);

CREATE TABLE IF NOT EXISTS mood_entries (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL,
    rating      INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 10),
    notes       TEXT,
    entry_date  TEXT    NOT NULL,
    created_at  TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_mood_entries_user
    ON mood_entries (user_id, created_at);

CREATE TABLE IF NOT EXISTS biometric_data (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id         INTEGER NOT NULL,
    heart_rate      INTEGER NOT NULL,
    sleep_hours     REAL    NOT NULL,
    steps           INTEGER NOT NULL,
    calories_burned INTEGER NOT NULL,
    data_date       TEXT    NOT NULL,
    recorded_at     TEXT    NOT NULL,
    is_manual_edit  INTEGER NOT NULL DEFAULT 0,
    source          TEXT    NOT NULL,
    UNIQUE (user_id, data_date)
);
"#;

/// Stored stress prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: i64,
    pub user_id: i64,
    /// `Low` or `High`
    pub prediction: String,
    pub confidence: f64,
    /// `model` or `heuristic`
    pub method: String,
    pub heart_rate: i32,
    pub sleep_hours: f64,
    pub steps: i64,
    pub created_at: DateTime<Utc>,
}

/// Stored mood rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: i64,
    pub user_id: i64,
    /// 1 (worst) to 10 (best)
    pub rating: i32,
    pub notes: Option<String>,
    pub entry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Daily biometric snapshot of one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiometricEntry {
    pub id: i64,
    pub user_id: i64,
    pub heart_rate: i32,
    pub sleep_hours: f64,
    pub steps: i64,
    pub calories_burned: i64,
    /// At most one entry per user and day
    pub data_date: NaiveDate,
    pub recorded_at: DateTime<Utc>,
    /// Entered by hand rather than synced from a tracker
    pub is_manual_edit: bool,
    pub source: String,
}

/// Whether an upsert created a new row or replaced an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertAction {
    Created,
    Updated,
}

impl UpsertAction {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            UpsertAction::Created => "created",
            UpsertAction::Updated => "updated",
        }
    }
}

/// Repository for data access
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Connect to a SQLite database and create the schema
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        info!("Opening SQLite database at {}", url);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;
        Self::with_pool(pool).await
    }

    /// Private in-memory database, used by tests and ephemeral runs
    pub async fn in_memory() -> Result<Self, StorageError> {
        // A single long-lived connection: every new in-memory connection is a new database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement).execute(&pool).await?;
        }
        debug!("Schema ready");
        Ok(Self { pool })
    }

    /// Insert a prediction record, returning its new ID
    pub async fn insert_prediction(&self, record: &PredictionRecord) -> Result<i64, StorageError> {
        let id = sqlx::query(
            "INSERT INTO stress_predictions \
             (user_id, prediction, confidence, method, heart_rate, sleep_hours, steps, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.user_id)
        .bind(&record.prediction)
        .bind(record.confidence)
        .bind(&record.method)
        .bind(record.heart_rate)
        .bind(record.sleep_hours)
        .bind(record.steps)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        debug!("Inserted prediction with ID {}", id);
        Ok(id)
    }

    /// Most recent predictions of a user, newest first
    pub async fn get_predictions(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<PredictionRecord>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, user_id, prediction, confidence, method, heart_rate, sleep_hours, steps, created_at \
             FROM stress_predictions WHERE user_id = ? \
             ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(prediction_from_row).collect()
    }

    /// Insert a mood entry, returning its new ID
    pub async fn insert_mood(&self, entry: &MoodEntry) -> Result<i64, StorageError> {
        let id = sqlx::query(
            "INSERT INTO mood_entries (user_id, rating, notes, entry_date, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(entry.user_id)
        .bind(entry.rating)
        .bind(&entry.notes)
        .bind(entry.entry_date)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        debug!("Inserted mood entry with ID {}", id);
        Ok(id)
    }

    /// Mood entries created at or after `since`, newest first
    pub async fn get_mood_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<MoodEntry>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, user_id, rating, notes, entry_date, created_at FROM mood_entries \
             WHERE user_id = ? AND created_at >= ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(mood_from_row).collect()
    }

    /// Mood entries dated on or after `from`, oldest first
    pub async fn get_mood_from_date(
        &self,
        user_id: i64,
        from: NaiveDate,
    ) -> Result<Vec<MoodEntry>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, user_id, rating, notes, entry_date, created_at FROM mood_entries \
             WHERE user_id = ? AND entry_date >= ? ORDER BY entry_date ASC, id ASC",
        )
        .bind(user_id)
        .bind(from)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(mood_from_row).collect()
    }

    /// Store the user's biometrics for `entry.data_date`, replacing any
    /// entry already recorded for that day
    pub async fn upsert_biometric(&self, entry: &BiometricEntry) -> Result<UpsertAction, StorageError> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<i64> =
            sqlx::query("SELECT id FROM biometric_data WHERE user_id = ? AND data_date = ?")
                .bind(entry.user_id)
                .bind(entry.data_date)
                .fetch_optional(&mut *tx)
                .await?
                .map(|row| row.try_get::<i64, _>("id"))
                .transpose()?;

        let action = match existing {
            Some(id) => {
                sqlx::query(
                    "UPDATE biometric_data SET heart_rate = ?, sleep_hours = ?, steps = ?, \
                     calories_burned = ?, recorded_at = ?, is_manual_edit = ?, source = ? \
                     WHERE id = ?",
                )
                .bind(entry.heart_rate)
                .bind(entry.sleep_hours)
                .bind(entry.steps)
                .bind(entry.calories_burned)
                .bind(entry.recorded_at)
                .bind(entry.is_manual_edit)
                .bind(&entry.source)
                .bind(id)
                .execute(&mut *tx)
                .await?;
                UpsertAction::Updated
            }
            None => {
                sqlx::query(
                    "INSERT INTO biometric_data \
                     (user_id, heart_rate, sleep_hours, steps, calories_burned, data_date, \
                      recorded_at, is_manual_edit, source) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(entry.user_id)
                .bind(entry.heart_rate)
                .bind(entry.sleep_hours)
                .bind(entry.steps)
                .bind(entry.calories_burned)
                .bind(entry.data_date)
                .bind(entry.recorded_at)
                .bind(entry.is_manual_edit)
                .bind(&entry.source)
                .execute(&mut *tx)
                .await?;
                UpsertAction::Created
            }
        };

        tx.commit().await?;
        debug!(
            "Biometrics for user {} on {} {}",
            entry.user_id,
            entry.data_date,
            action.as_str()
        );
        Ok(action)
    }

    /// The user's biometrics for one day
    pub async fn get_biometric_for_date(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<Option<BiometricEntry>, StorageError> {
        let row = sqlx::query(
            "SELECT id, user_id, heart_rate, sleep_hours, steps, calories_burned, data_date, \
             recorded_at, is_manual_edit, source \
             FROM biometric_data WHERE user_id = ? AND data_date = ?",
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(biometric_from_row).transpose()
    }

    /// Manually entered biometrics dated on or after `from`, most recently recorded first
    pub async fn get_manual_biometrics_from(
        &self,
        user_id: i64,
        from: NaiveDate,
    ) -> Result<Vec<BiometricEntry>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, user_id, heart_rate, sleep_hours, steps, calories_burned, data_date, \
             recorded_at, is_manual_edit, source \
             FROM biometric_data WHERE user_id = ? AND is_manual_edit = 1 AND data_date >= ? \
             ORDER BY recorded_at DESC, id DESC",
        )
        .bind(user_id)
        .bind(from)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(biometric_from_row).collect()
    }

    /// Delete the user's manual entry for one day, returning whether one existed
    pub async fn delete_manual_biometric(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<bool, StorageError> {
        let deleted = sqlx::query(
            "DELETE FROM biometric_data WHERE user_id = ? AND data_date = ? AND is_manual_edit = 1",
        )
        .bind(user_id)
        .bind(date)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(deleted > 0)
    }

    /// Total prediction count
    pub async fn prediction_count(&self) -> Result<i64, StorageError> {
        let count = sqlx::query("SELECT COUNT(*) FROM stress_predictions")
            .fetch_one(&self.pool)
            .await?
            .try_get::<i64, _>(0)?;
        Ok(count)
    }

    /// Total mood entry count
    pub async fn mood_count(&self) -> Result<i64, StorageError> {
        let count = sqlx::query("SELECT COUNT(*) FROM mood_entries")
            .fetch_one(&self.pool)
            .await?
            .try_get::<i64, _>(0)?;
        Ok(count)
    }

    /// Check the database answers
    pub async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn prediction_from_row(row: &SqliteRow) -> Result<PredictionRecord, StorageError> {
    Ok(PredictionRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        prediction: row.try_get("prediction")?,
        confidence: row.try_get("confidence")?,
        method: row.try_get("method")?,
        heart_rate: row.try_get("heart_rate")?,
        sleep_hours: row.try_get("sleep_hours")?,
        steps: row.try_get("steps")?,
        created_at: row.try_get("created_at")?,
    })
}

fn mood_from_row(row: &SqliteRow) -> Result<MoodEntry, StorageError> {
    Ok(MoodEntry {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        rating: row.try_get("rating")?,
        notes: row.try_get("notes")?,
        entry_date: row.try_get("entry_date")?,
        created_at: row.try_get("created_at")?,
    })
}

fn biometric_from_row(row: &SqliteRow) -> Result<BiometricEntry, StorageError> {
    Ok(BiometricEntry {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        heart_rate: row.try_get("heart_rate")?,
        sleep_hours: row.try_get("sleep_hours")?,
        steps: row.try_get("steps")?,
        calories_burned: row.try_get("calories_burned")?,
        data_date: row.try_get("data_date")?,
        recorded_at: row.try_get("recorded_at")?,
        is_manual_edit: row.try_get("is_manual_edit")?,
        source: row.try_get("source")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, day, hour, 0, 0).unwrap()
    }

    fn prediction(user_id: i64, created_at: DateTime<Utc>) -> PredictionRecord {
        PredictionRecord {
            id: 0,
            user_id,
            prediction: "High".to_string(),
            confidence: 0.67,
            method: "heuristic".to_string(),
            heart_rate: 80,
            sleep_hours: 6.0,
            steps: 5000,
            created_at,
        }
    }

    fn mood(user_id: i64, rating: i32, created_at: DateTime<Utc>) -> MoodEntry {
        MoodEntry {
            id: 0,
            user_id,
            rating,
            notes: Some("ok".to_string()),
            entry_date: created_at.date_naive(),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_prediction_insert_and_retrieve() {
        let repo = Repository::in_memory().await.unwrap();

        let id = repo.insert_prediction(&prediction(1, at(10, 9))).await.unwrap();
        assert_eq!(id, 1);

        let records = repo.get_predictions(1, 10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].prediction, "High");
        assert_eq!(records[0].created_at, at(10, 9));
        assert_eq!(repo.prediction_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_predictions_scoped_to_user_newest_first() {
        let repo = Repository::in_memory().await.unwrap();
        repo.insert_prediction(&prediction(1, at(10, 9))).await.unwrap();
        repo.insert_prediction(&prediction(1, at(12, 9))).await.unwrap();
        repo.insert_prediction(&prediction(2, at(11, 9))).await.unwrap();
        repo.insert_prediction(&prediction(1, at(11, 9))).await.unwrap();

        let records = repo.get_predictions(1, 2).await.unwrap();
        let times: Vec<_> = records.iter().map(|r| r.created_at).collect();
        assert_eq!(times, vec![at(12, 9), at(11, 9)]);
        assert!(records.iter().all(|r| r.user_id == 1));
    }

    #[tokio::test]
    async fn test_invalid_label_rejected_by_schema() {
        let repo = Repository::in_memory().await.unwrap();
        let mut record = prediction(1, at(10, 9));
        record.prediction = "Medium".to_string();
        assert!(matches!(
            repo.insert_prediction(&record).await,
            Err(StorageError::DatabaseError(_))
        ));
    }

    #[tokio::test]
    async fn test_mood_since_filters_by_time() {
        let repo = Repository::in_memory().await.unwrap();
        let now = at(17, 12);
        repo.insert_mood(&mood(1, 7, now - Duration::days(40))).await.unwrap();
        repo.insert_mood(&mood(1, 4, now - Duration::days(3))).await.unwrap();
        repo.insert_mood(&mood(1, 9, now)).await.unwrap();
        repo.insert_mood(&mood(2, 1, now)).await.unwrap();

        let entries = repo.get_mood_since(1, now - Duration::days(30)).await.unwrap();
        let ratings: Vec<_> = entries.iter().map(|e| e.rating).collect();
        assert_eq!(ratings, vec![9, 4]);
        assert_eq!(repo.mood_count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_mood_from_date_oldest_first() {
        let repo = Repository::in_memory().await.unwrap();
        repo.insert_mood(&mood(1, 6, at(15, 8))).await.unwrap();
        repo.insert_mood(&mood(1, 3, at(9, 8))).await.unwrap();
        repo.insert_mood(&mood(1, 8, at(12, 8))).await.unwrap();

        let from = at(10, 0).date_naive();
        let entries = repo.get_mood_from_date(1, from).await.unwrap();
        let ratings: Vec<_> = entries.iter().map(|e| e.rating).collect();
        assert_eq!(ratings, vec![8, 6]);
        assert_eq!(entries[0].notes.as_deref(), Some("ok"));
    }

    fn biometrics(user_id: i64, day: u32, heart_rate: i32, recorded_at: DateTime<Utc>) -> BiometricEntry {
        BiometricEntry {
            id: 0,
            user_id,
            heart_rate,
            sleep_hours: 7.5,
            steps: 8000,
            calories_burned: 320,
            data_date: at(day, 0).date_naive(),
            recorded_at,
            is_manual_edit: true,
            source: "manual".to_string(),
        }
    }

    #[tokio::test]
    async fn test_biometric_upsert_one_row_per_day() {
        let repo = Repository::in_memory().await.unwrap();

        let first = repo.upsert_biometric(&biometrics(1, 17, 70, at(17, 8))).await.unwrap();
        assert_eq!(first, UpsertAction::Created);

        let second = repo.upsert_biometric(&biometrics(1, 17, 85, at(17, 20))).await.unwrap();
        assert_eq!(second, UpsertAction::Updated);

        let stored = repo
            .get_biometric_for_date(1, at(17, 0).date_naive())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.heart_rate, 85);
        assert_eq!(stored.recorded_at, at(17, 20));
        assert!(stored.is_manual_edit);

        let history = repo.get_manual_biometrics_from(1, at(1, 0).date_naive()).await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_biometric_history_window_and_order() {
        let repo = Repository::in_memory().await.unwrap();
        repo.upsert_biometric(&biometrics(1, 2, 60, at(2, 8))).await.unwrap();
        repo.upsert_biometric(&biometrics(1, 15, 65, at(15, 8))).await.unwrap();
        repo.upsert_biometric(&biometrics(1, 16, 70, at(16, 8))).await.unwrap();
        repo.upsert_biometric(&biometrics(2, 16, 99, at(16, 8))).await.unwrap();

        let history = repo.get_manual_biometrics_from(1, at(10, 0).date_naive()).await.unwrap();
        let rates: Vec<_> = history.iter().map(|e| e.heart_rate).collect();
        assert_eq!(rates, vec![70, 65]);
    }

    #[tokio::test]
    async fn test_delete_manual_biometric() {
        let repo = Repository::in_memory().await.unwrap();
        let today = at(17, 0).date_naive();
        repo.upsert_biometric(&biometrics(1, 17, 70, at(17, 8))).await.unwrap();

        assert!(!repo.delete_manual_biometric(2, today).await.unwrap());
        assert!(repo.delete_manual_biometric(1, today).await.unwrap());
        assert!(!repo.delete_manual_biometric(1, today).await.unwrap());
        assert_eq!(repo.get_biometric_for_date(1, today).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("calmcast.db").display());

        {
            let repo = Repository::connect(&url).await.unwrap();
            repo.insert_mood(&mood(1, 5, at(1, 8))).await.unwrap();
        }

        let reopened = Repository::connect(&url).await.unwrap();
        assert_eq!(reopened.mood_count().await.unwrap(), 1);
        reopened.ping().await.unwrap();
    }
}
