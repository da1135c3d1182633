//! Prediction Result Types

use feature_engine::StressLabel;
use serde::{Deserialize, Serialize};

/// Outcome status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    Success,
    Error,
}

/// Which path produced the prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionMethod {
    Model,
    Heuristic,
}

impl PredictionMethod {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionMethod::Model => "model",
            PredictionMethod::Heuristic => "heuristic",
        }
    }

    /// Parse the stored representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "model" => Some(PredictionMethod::Model),
            "heuristic" => Some(PredictionMethod::Heuristic),
            _ => None,
        }
    }
}

/// Uniform prediction result.
///
/// `label` and `confidence` are present iff `status` is success; `message`
/// iff it is error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub status: PredictionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<StressLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub method: PredictionMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PredictionResult {
    /// Successful prediction
    pub fn success(label: StressLabel, confidence: f64, method: PredictionMethod) -> Self {
        Self {
            status: PredictionStatus::Success,
            label: Some(label),
            confidence: Some(confidence),
            method,
            message: None,
        }
    }

    /// Rejected input
    pub fn error(message: impl Into<String>, method: PredictionMethod) -> Self {
        Self {
            status: PredictionStatus::Error,
            label: None,
            confidence: None,
            method,
            message: Some(message.into()),
        }
    }

    /// Whether the prediction succeeded
    pub fn is_success(&self) -> bool {
        self.status == PredictionStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_serialization() {
        let result = PredictionResult::success(StressLabel::High, 0.67, PredictionMethod::Heuristic);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "success",
                "label": "High",
                "confidence": 0.67,
                "method": "heuristic"
            })
        );
    }

    #[test]
    fn test_error_serialization() {
        let result = PredictionResult::error("bad input", PredictionMethod::Model);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "error",
                "method": "model",
                "message": "bad input"
            })
        );
        assert!(!result.is_success());
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(PredictionMethod::parse("model"), Some(PredictionMethod::Model));
        assert_eq!(PredictionMethod::parse("heuristic"), Some(PredictionMethod::Heuristic));
        assert_eq!(PredictionMethod::parse("ml_model"), None);
    }
}
