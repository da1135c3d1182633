//! Heuristic Fallback
//!
//! Linear stress score over population baselines, used whenever the trained
//! classifier cannot produce an answer.

mod rules;

pub use rules::{FallbackEngine, HeuristicOutcome};
