//! Feature Vector Assembly
//!
//! The stress classifier was trained on exactly three columns. Their order is
//! part of the model contract and lives in [`FEATURE_ORDER`]; nothing else in
//! the workspace may index features positionally.

use crate::reading::BiometricReading;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Number of features in the vector
pub const FEATURE_DIMENSION: usize = 3;

/// A single model input column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    HeartRate,
    SleepHours,
    Steps,
}

impl Feature {
    /// Column name used by the training data
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::HeartRate => "heart_rate",
            Feature::SleepHours => "sleep_hours",
            Feature::Steps => "steps",
        }
    }

    /// Read this feature out of a reading
    pub fn extract(&self, reading: &BiometricReading) -> f64 {
        match self {
            Feature::HeartRate => reading.heart_rate as f64,
            Feature::SleepHours => reading.sleep_hours,
            Feature::Steps => reading.steps as f64,
        }
    }
}

/// Column order the classifier expects
pub const FEATURE_ORDER: [Feature; FEATURE_DIMENSION] =
    [Feature::HeartRate, Feature::SleepHours, Feature::Steps];

/// Feature vector for ML inference, laid out in [`FEATURE_ORDER`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_DIMENSION],
}

impl FeatureVector {
    /// Assemble the vector from a reading
    pub fn from_reading(reading: &BiometricReading) -> Self {
        let values = FEATURE_ORDER.map(|feature| feature.extract(reading));
        trace!("Assembled feature vector {:?}", values);
        Self { values }
    }

    /// Raw values in model order
    pub fn values(&self) -> &[f64; FEATURE_DIMENSION] {
        &self.values
    }

    /// Values narrowed to `f32`, the input element type of the exported model
    pub fn to_f32(&self) -> [f32; FEATURE_DIMENSION] {
        self.values.map(|v| v as f32)
    }

    /// Look up a single feature by name
    pub fn get(&self, feature: Feature) -> f64 {
        FEATURE_ORDER
            .iter()
            .position(|f| *f == feature)
            .map(|idx| self.values[idx])
            .unwrap_or(f64::NAN)
    }

    /// True when every value is finite
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }
}

impl From<&BiometricReading> for FeatureVector {
    fn from(reading: &BiometricReading) -> Self {
        Self::from_reading(reading)
    }
}
