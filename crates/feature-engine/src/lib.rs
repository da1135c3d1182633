//! Feature Engine
//!
//! Biometric readings, the fixed-order feature vector assembled from them, and
//! the stress labels shared by the classifier and the heuristic fallback.

mod features;
mod label;
mod reading;
mod rounding;

pub use features::{Feature, FeatureVector, FEATURE_DIMENSION, FEATURE_ORDER};
pub use label::{round_confidence, StressLabel};
pub use reading::{BiometricReading, CALORIES_PER_STEP};
pub use rounding::round_half_even;
