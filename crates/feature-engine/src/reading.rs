//! Biometric Reading

use serde::{Deserialize, Serialize};

/// Rough energy cost of one step (kcal)
pub const CALORIES_PER_STEP: f64 = 0.04;

/// A single biometric snapshot for one user.
///
/// Transient value object: it is validated at the HTTP boundary and handed to
/// the predictor by value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiometricReading {
    /// Resting heart rate (beats per minute)
    pub heart_rate: i32,
    /// Hours slept in the last night
    pub sleep_hours: f64,
    /// Steps walked during the day
    pub steps: i64,
}

impl BiometricReading {
    /// Create a new reading
    pub fn new(heart_rate: i32, sleep_hours: f64, steps: i64) -> Self {
        Self {
            heart_rate,
            sleep_hours,
            steps,
        }
    }

    /// Calories burned by walking, estimated from the step count
    pub fn estimated_calories(&self) -> i64 {
        (self.steps as f64 * CALORIES_PER_STEP).round() as i64
    }
}

impl Default for BiometricReading {
    /// Population baseline: resting HR 60, 8h of sleep, 10k steps
    fn default() -> Self {
        Self::new(60, 8.0, 10_000)
    }
}
