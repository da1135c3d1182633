//! Model Interface

use crate::ClassifierError;
use feature_engine::FeatureVector;

/// A trained binary stress classifier.
///
/// Implementations must be immutable after construction; the same instance
/// serves every request concurrently.
pub trait StressModel: Send + Sync {
    /// Class probabilities for one feature vector, indexed by class id
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ClassifierError>;

    /// Human readable model identifier
    fn name(&self) -> &str;
}
