//! Mood Routes

use axum::{extract::State, Json};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storage::{average_mood, weekly_summary, DailyMood, MoodAverage, MoodEntry};
use tracing::info;

use crate::error::ApiError;
use crate::extract::{JsonBody, QueryParams};
use crate::identity::UserId;
use crate::AppState;

/// Days of history returned by the mood list
const MOOD_HISTORY_DAYS: i64 = 30;

/// Request body for a new mood rating
#[derive(Debug, Deserialize)]
pub struct MoodRating {
    pub rating: i32,
    pub notes: Option<String>,
}

/// Plain acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Mood entry as shown to the client
#[derive(Debug, Serialize, Deserialize)]
pub struct MoodItem {
    pub rating: i32,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub date: String,
}

/// Response for the mood list
#[derive(Debug, Serialize, Deserialize)]
pub struct MoodListResponse {
    pub mood_data: Vec<MoodItem>,
}

/// Query parameters for the average endpoint
#[derive(Debug, Deserialize)]
pub struct AverageQuery {
    #[serde(default = "default_days")]
    pub days: u32,
}

fn default_days() -> u32 {
    7
}

/// Record a mood rating for today
pub async fn add_mood(
    State(state): State<Arc<AppState>>,
    user: UserId,
    JsonBody(body): JsonBody<MoodRating>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.validator.validate_mood_rating(body.rating)?;

    let now = Utc::now();
    let entry = MoodEntry {
        id: 0,
        user_id: user.0,
        rating: body.rating,
        notes: body.notes,
        entry_date: now.date_naive(),
        created_at: now,
    };
    let id = state.repository.insert_mood(&entry).await?;
    info!("User {} logged mood {} (entry {})", user.0, body.rating, id);

    Ok(Json(MessageResponse {
        message: "Mood rating added successfully".to_string(),
    }))
}

/// Mood entries of the last 30 days, newest first
pub async fn list_mood(
    State(state): State<Arc<AppState>>,
    user: UserId,
) -> Result<Json<MoodListResponse>, ApiError> {
    let since = Utc::now() - Duration::days(MOOD_HISTORY_DAYS);
    let entries = state.repository.get_mood_since(user.0, since).await?;

    let mood_data = entries
        .into_iter()
        .map(|entry| MoodItem {
            rating: entry.rating,
            notes: entry.notes,
            timestamp: entry.created_at,
            date: entry.entry_date.to_string(),
        })
        .collect();

    Ok(Json(MoodListResponse { mood_data }))
}

/// Daily mood averages for the current week, oldest first
pub async fn weekly_mood(
    State(state): State<Arc<AppState>>,
    user: UserId,
) -> Result<Json<Vec<DailyMood>>, ApiError> {
    let today = Utc::now().date_naive();
    let entries = state
        .repository
        .get_mood_from_date(user.0, today - Duration::days(7))
        .await?;

    Ok(Json(weekly_summary(&entries, today)))
}

/// Average mood over the last `days` days
pub async fn mood_average(
    State(state): State<Arc<AppState>>,
    user: UserId,
    QueryParams(params): QueryParams<AverageQuery>,
) -> Result<Json<MoodAverage>, ApiError> {
    let since = Utc::now()
        .checked_sub_signed(Duration::days(params.days as i64))
        .ok_or_else(|| ApiError::Validation(format!("days value {} is out of range", params.days)))?;
    let entries = state.repository.get_mood_since(user.0, since).await?;

    Ok(Json(average_mood(&entries)))
}
