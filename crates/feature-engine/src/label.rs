//! Stress Labels

use crate::rounding::round_half_even;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary stress classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StressLabel {
    Low,
    High,
}

impl StressLabel {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StressLabel::Low => "Low",
            StressLabel::High => "High",
        }
    }

    /// Parse the stored representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Low" => Some(StressLabel::Low),
            "High" => Some(StressLabel::High),
            _ => None,
        }
    }
}

impl fmt::Display for StressLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round a confidence score to two decimal digits
pub fn round_confidence(value: f64) -> f64 {
    round_half_even(value, 2)
}
