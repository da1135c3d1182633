//! Stress Prediction Routes

use axum::{extract::State, Json};
use chrono::Utc;
use feature_engine::{BiometricReading, StressLabel};
use predictor::PredictionMethod;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storage::PredictionRecord;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::extract::{JsonBody, QueryParams};
use crate::identity::UserId;
use crate::telemetry::record_model_availability;
use crate::AppState;

/// Response for the predict endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct StressPredictionResponse {
    pub status: String,
    pub prediction: StressLabel,
    pub confidence: f64,
    pub method: PredictionMethod,
}

/// Response for the model status endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelStatusResponse {
    pub model_available: bool,
    pub method: PredictionMethod,
}

/// Query parameters for the history endpoint
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Response for the history endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub data: Vec<PredictionRecord>,
    pub count: usize,
}

/// Predict the caller's stress level
pub async fn predict(
    State(state): State<Arc<AppState>>,
    user: UserId,
    JsonBody(reading): JsonBody<BiometricReading>,
) -> Result<Json<StressPredictionResponse>, ApiError> {
    let result = state.predictor.predict_validated(&reading, &state.validator);

    let (Some(label), Some(confidence)) = (result.label, result.confidence) else {
        return Err(ApiError::Validation(result.message.unwrap_or_default()));
    };

    debug!(
        "User {} stress {} (conf={:.2}, method={})",
        user.0,
        label,
        confidence,
        result.method.as_str()
    );

    record_prediction(&state, user, &reading, label, confidence, result.method);

    Ok(Json(StressPredictionResponse {
        status: "success".to_string(),
        prediction: label,
        confidence,
        method: result.method,
    }))
}

/// Persist a prediction without holding up the response
fn record_prediction(
    state: &AppState,
    user: UserId,
    reading: &BiometricReading,
    label: StressLabel,
    confidence: f64,
    method: PredictionMethod,
) {
    let repository = state.repository.clone();
    let record = PredictionRecord {
        id: 0,
        user_id: user.0,
        prediction: label.as_str().to_string(),
        confidence,
        method: method.as_str().to_string(),
        heart_rate: reading.heart_rate,
        sleep_hours: reading.sleep_hours,
        steps: reading.steps,
        created_at: Utc::now(),
    };

    tokio::spawn(async move {
        if let Err(e) = repository.insert_prediction(&record).await {
            warn!("Failed to log prediction for user {}: {}", record.user_id, e);
        }
    });
}

/// Report whether the trained model is serving predictions
pub async fn model_status(State(state): State<Arc<AppState>>) -> Json<ModelStatusResponse> {
    let model_available = state.predictor.model_available();
    record_model_availability(model_available);

    Json(ModelStatusResponse {
        model_available,
        method: state.predictor.preferred_method(),
    })
}

/// Get the caller's recent predictions
pub async fn history(
    State(state): State<Arc<AppState>>,
    user: UserId,
    QueryParams(params): QueryParams<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let limit = params.limit.min(500);
    let data = state.repository.get_predictions(user.0, limit).await?;

    Ok(Json(HistoryResponse {
        count: data.len(),
        data,
    }))
}
