//! Manual Biometric Log
//!
//! One entry per user and day. Saving again on the same day replaces the
//! earlier values.

use axum::{extract::State, Json};
use chrono::{DateTime, Duration, Utc};
use feature_engine::BiometricReading;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storage::{BiometricEntry, UpsertAction};
use tracing::info;

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::identity::UserId;
use crate::AppState;

/// Days of manual entries returned by the history endpoint
const MANUAL_HISTORY_DAYS: i64 = 30;

/// Source tag stored with hand-entered values
const MANUAL_SOURCE: &str = "manual";

/// Values echoed back after a save
#[derive(Debug, Serialize, Deserialize)]
pub struct ManualData {
    pub sleep_hours: f64,
    pub steps: i64,
    pub heart_rate: i32,
    pub is_manual_edit: bool,
}

/// Response for a manual save
#[derive(Debug, Serialize, Deserialize)]
pub struct ManualSaveResponse {
    pub status: String,
    pub message: String,
    pub action: UpsertAction,
    pub data: ManualData,
}

/// One day of the manual history
#[derive(Debug, Serialize, Deserialize)]
pub struct ManualEntryItem {
    pub sleep_hours: f64,
    pub steps: i64,
    pub heart_rate: i32,
    pub date: String,
    pub recorded_at: DateTime<Utc>,
}

/// Response for the manual history
#[derive(Debug, Serialize, Deserialize)]
pub struct ManualHistoryResponse {
    pub manual_entries: Vec<ManualEntryItem>,
    pub total_entries: usize,
}

/// Today's biometrics, all values empty when nothing was recorded
#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentDataResponse {
    pub sleep_hours: Option<f64>,
    pub steps: Option<i64>,
    pub heart_rate: Option<i32>,
    pub is_manual_edit: bool,
    pub data_date: String,
    /// `manual`, the sync source, or `none`
    pub source: String,
}

/// Plain status acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

/// Save today's biometrics entered by hand
pub async fn save_manual(
    State(state): State<Arc<AppState>>,
    user: UserId,
    JsonBody(reading): JsonBody<BiometricReading>,
) -> Result<Json<ManualSaveResponse>, ApiError> {
    state.manual_validator.validate_reading(&reading)?;

    let now = Utc::now();
    let entry = BiometricEntry {
        id: 0,
        user_id: user.0,
        heart_rate: reading.heart_rate,
        sleep_hours: reading.sleep_hours,
        steps: reading.steps,
        calories_burned: reading.estimated_calories(),
        data_date: now.date_naive(),
        recorded_at: now,
        is_manual_edit: true,
        source: MANUAL_SOURCE.to_string(),
    };
    let action = state.repository.upsert_biometric(&entry).await?;
    info!("Manual biometrics {} for user {}", action.as_str(), user.0);

    Ok(Json(ManualSaveResponse {
        status: "success".to_string(),
        message: format!("Manual data {} successfully", action.as_str()),
        action,
        data: ManualData {
            sleep_hours: reading.sleep_hours,
            steps: reading.steps,
            heart_rate: reading.heart_rate,
            is_manual_edit: true,
        },
    }))
}

/// Manual entries of the last 30 days, most recently recorded first
pub async fn manual_history(
    State(state): State<Arc<AppState>>,
    user: UserId,
) -> Result<Json<ManualHistoryResponse>, ApiError> {
    let from = Utc::now().date_naive() - Duration::days(MANUAL_HISTORY_DAYS);
    let entries = state.repository.get_manual_biometrics_from(user.0, from).await?;

    let manual_entries: Vec<_> = entries
        .into_iter()
        .map(|entry| ManualEntryItem {
            sleep_hours: entry.sleep_hours,
            steps: entry.steps,
            heart_rate: entry.heart_rate,
            date: entry.data_date.to_string(),
            recorded_at: entry.recorded_at,
        })
        .collect();

    Ok(Json(ManualHistoryResponse {
        total_entries: manual_entries.len(),
        manual_entries,
    }))
}

/// Today's biometrics
pub async fn current(
    State(state): State<Arc<AppState>>,
    user: UserId,
) -> Result<Json<CurrentDataResponse>, ApiError> {
    let today = Utc::now().date_naive();
    let response = match state.repository.get_biometric_for_date(user.0, today).await? {
        Some(entry) => CurrentDataResponse {
            sleep_hours: Some(entry.sleep_hours),
            steps: Some(entry.steps),
            heart_rate: Some(entry.heart_rate),
            is_manual_edit: entry.is_manual_edit,
            data_date: entry.data_date.to_string(),
            source: if entry.is_manual_edit {
                MANUAL_SOURCE.to_string()
            } else {
                entry.source
            },
        },
        None => CurrentDataResponse {
            sleep_hours: None,
            steps: None,
            heart_rate: None,
            is_manual_edit: false,
            data_date: today.to_string(),
            source: "none".to_string(),
        },
    };

    Ok(Json(response))
}

/// Delete today's manual entry so it can be entered again
pub async fn delete_today(
    State(state): State<Arc<AppState>>,
    user: UserId,
) -> Result<Json<StatusResponse>, ApiError> {
    let today = Utc::now().date_naive();
    if !state.repository.delete_manual_biometric(user.0, today).await? {
        return Err(ApiError::NotFound("No manual data found for today".to_string()));
    }

    info!("Deleted today's manual biometrics for user {}", user.0);
    Ok(Json(StatusResponse {
        status: "success".to_string(),
        message: "Today's manual data deleted successfully".to_string(),
    }))
}
