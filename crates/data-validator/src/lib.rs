//! Data Validation
//!
//! Range checking for biometric readings and mood ratings before they reach
//! the predictor or storage.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{BiometricLimits, Validator, MOOD_RATING_RANGE};
