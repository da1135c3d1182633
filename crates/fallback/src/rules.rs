//! Heuristic Stress Rules
//!
//! `score = (hr - 60) / 20 + (8 - sleep) / 1 + (10000 - steps) / 5000`
//!
//! Each term measures the distance from a population baseline in units of a
//! fixed divisor. A score strictly above 2 is high stress. Confidence is the
//! distance from the threshold over 3, capped at 0.95 so the heuristic never
//! claims certainty.

use feature_engine::{round_confidence, BiometricReading, StressLabel};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Resting heart rate baseline (bpm)
pub const RESTING_HEART_RATE: f64 = 60.0;
/// Heart rate divisor
pub const HEART_RATE_SCALE: f64 = 20.0;
/// Target sleep (hours)
pub const TARGET_SLEEP_HOURS: f64 = 8.0;
/// Sleep divisor
pub const SLEEP_SCALE: f64 = 1.0;
/// Target daily steps
pub const TARGET_STEPS: f64 = 10_000.0;
/// Steps divisor
pub const STEPS_SCALE: f64 = 5_000.0;
/// Scores strictly above this are high stress
pub const HIGH_STRESS_THRESHOLD: f64 = 2.0;
/// Distance from threshold that maps to full confidence before the cap
pub const CONFIDENCE_SCALE: f64 = 3.0;
/// Heuristic confidence ceiling
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Result of heuristic scoring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeuristicOutcome {
    /// Raw linear score
    pub score: f64,
    /// Derived label
    pub label: StressLabel,
    /// Distance-from-threshold confidence, rounded to 2 decimals
    pub confidence: f64,
}

/// Rule-based stress scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackEngine;

impl FallbackEngine {
    /// Create a new fallback engine
    pub fn new() -> Self {
        Self
    }

    /// Linear stress score for a reading
    pub fn stress_score(&self, reading: &BiometricReading) -> f64 {
        (reading.heart_rate as f64 - RESTING_HEART_RATE) / HEART_RATE_SCALE
            + (TARGET_SLEEP_HOURS - reading.sleep_hours) / SLEEP_SCALE
            + (TARGET_STEPS - reading.steps as f64) / STEPS_SCALE
    }

    /// Label for a score
    pub fn label_for(&self, score: f64) -> StressLabel {
        if score > HIGH_STRESS_THRESHOLD {
            StressLabel::High
        } else {
            StressLabel::Low
        }
    }

    /// Confidence for a score
    pub fn confidence_for(&self, score: f64) -> f64 {
        let distance = (score - HIGH_STRESS_THRESHOLD).abs() / CONFIDENCE_SCALE;
        round_confidence(distance.min(MAX_CONFIDENCE))
    }

    /// Score and classify a reading
    pub fn evaluate(&self, reading: &BiometricReading) -> HeuristicOutcome {
        let score = self.stress_score(reading);
        let outcome = HeuristicOutcome {
            score,
            label: self.label_for(score),
            confidence: self.confidence_for(score),
        };
        debug!(
            "Heuristic score {:.3} -> {} (conf={:.2})",
            outcome.score, outcome.label, outcome.confidence
        );
        outcome
    }
}
