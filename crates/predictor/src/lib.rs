//! Stress Prediction Orchestrator
//!
//! Always produces a prediction: the trained classifier is tried first and
//! any failure on that path falls through to the heuristic.

mod orchestrator;
mod result;

pub use orchestrator::StressPredictor;
pub use result::{PredictionMethod, PredictionResult, PredictionStatus};
