//! Range Validator

use crate::error::ValidationError;
use feature_engine::BiometricReading;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::debug;

/// Allowed mood rating scale
pub const MOOD_RATING_RANGE: RangeInclusive<i32> = 1..=10;

/// Accepted biometric ranges
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiometricLimits {
    /// Heart rate valid range (bpm)
    pub heart_rate_range: (f64, f64),
    /// Sleep valid range (hours)
    pub sleep_range: (f64, f64),
    /// Daily steps valid range
    pub steps_range: (f64, f64),
}

impl Default for BiometricLimits {
    fn default() -> Self {
        Self {
            heart_rate_range: (40.0, 200.0),
            sleep_range: (0.0, 24.0),
            steps_range: (0.0, 100_000.0),
        }
    }
}

impl BiometricLimits {
    /// Tighter ranges for values a user types in by hand
    pub fn manual_entry() -> Self {
        Self {
            heart_rate_range: (40.0, 120.0),
            sleep_range: (0.0, 24.0),
            steps_range: (0.0, 50_000.0),
        }
    }
}

/// Validator for incoming biometric and mood data
pub struct Validator {
    limits: BiometricLimits,
}

impl Validator {
    /// Create a new validator with given limits
    pub fn new(limits: BiometricLimits) -> Self {
        Self { limits }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite(field));
        }
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate heart rate
    pub fn validate_heart_rate(&self, heart_rate: i32) -> Result<(), ValidationError> {
        self.validate_range("heart_rate", heart_rate as f64, self.limits.heart_rate_range)
    }

    /// Validate sleep hours
    pub fn validate_sleep_hours(&self, hours: f64) -> Result<(), ValidationError> {
        self.validate_range("sleep_hours", hours, self.limits.sleep_range)
    }

    /// Validate step count
    pub fn validate_steps(&self, steps: i64) -> Result<(), ValidationError> {
        self.validate_range("steps", steps as f64, self.limits.steps_range)
    }

    /// Validate every field of a reading, stopping at the first failure
    pub fn validate_reading(&self, reading: &BiometricReading) -> Result<(), ValidationError> {
        self.validate_heart_rate(reading.heart_rate)?;
        self.validate_sleep_hours(reading.sleep_hours)?;
        self.validate_steps(reading.steps)?;
        debug!("Reading passed validation");
        Ok(())
    }

    /// Validate a mood rating on the 1-10 scale
    pub fn validate_mood_rating(&self, rating: i32) -> Result<(), ValidationError> {
        self.validate_range(
            "rating",
            rating as f64,
            (
                *MOOD_RATING_RANGE.start() as f64,
                *MOOD_RATING_RANGE.end() as f64,
            ),
        )
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(BiometricLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_reading() {
        let validator = Validator::default();
        assert!(validator.validate_reading(&BiometricReading::new(80, 6.0, 5000)).is_ok());
        assert!(validator.validate_reading(&BiometricReading::new(40, 0.0, 0)).is_ok());
        assert!(validator.validate_reading(&BiometricReading::new(200, 24.0, 100_000)).is_ok());
    }

    #[test]
    fn test_invalid_heart_rate() {
        let validator = Validator::default();
        assert!(validator.validate_heart_rate(39).is_err());
        assert!(validator.validate_heart_rate(201).is_err());
    }

    #[test]
    fn test_first_failure_reported() {
        let validator = Validator::default();
        let err = validator
            .validate_reading(&BiometricReading::new(80, 25.0, -1))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfRange {
                field: "sleep_hours",
                value: 25.0,
                min: 0.0,
                max: 24.0,
            }
        );
    }

    #[test]
    fn test_nan_sleep_rejected() {
        let validator = Validator::default();
        assert_eq!(
            validator.validate_sleep_hours(f64::NAN),
            Err(ValidationError::NotFinite("sleep_hours"))
        );
    }

    #[test]
    fn test_mood_rating_scale() {
        let validator = Validator::default();
        assert!(validator.validate_mood_rating(1).is_ok());
        assert!(validator.validate_mood_rating(10).is_ok());
        assert!(validator.validate_mood_rating(0).is_err());
        assert!(validator.validate_mood_rating(11).is_err());
    }

    #[test]
    fn test_manual_entry_limits() {
        let validator = Validator::new(BiometricLimits::manual_entry());
        assert!(validator.validate_reading(&BiometricReading::new(120, 24.0, 50_000)).is_ok());
        assert!(validator.validate_reading(&BiometricReading::new(121, 8.0, 8000)).is_err());
        assert!(validator.validate_reading(&BiometricReading::new(70, 8.0, 50_001)).is_err());
        // Accepted for prediction, rejected for the manual log
        assert!(Validator::default().validate_reading(&BiometricReading::new(150, 8.0, 8000)).is_ok());
    }

    #[test]
    fn test_error_message() {
        let err = Validator::default().validate_steps(150_000).unwrap_err();
        assert_eq!(err.to_string(), "steps value 150000 is out of range [0, 100000]");
    }

    proptest! {
        #[test]
        fn prop_in_range_readings_pass(
            hr in 40i32..=200,
            sleep in 0.0f64..=24.0,
            steps in 0i64..=100_000,
        ) {
            let validator = Validator::default();
            prop_assert!(validator.validate_reading(&BiometricReading::new(hr, sleep, steps)).is_ok());
        }
    }
}
