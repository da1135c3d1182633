//! Classifier Adapter
//!
//! Translates a [`BiometricReading`] into the model's feature vector, runs
//! the model and maps its class probabilities back into the stress
//! vocabulary.

use crate::model::StressModel;
use crate::ClassifierError;
use feature_engine::{round_confidence, BiometricReading, FeatureVector, StressLabel};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Class id to label mapping used when the model was trained (`0 = Low`, `1 = High`)
pub const CLASS_LABELS: [StressLabel; 2] = [StressLabel::Low, StressLabel::High];

/// Allowed drift of the probability sum away from 1.0
const PROBABILITY_SUM_TOLERANCE: f64 = 1e-3;

/// Successful model output in domain terms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Winning class
    pub label: StressLabel,
    /// Probability of the winning class, rounded to 2 decimals
    pub confidence: f64,
}

/// Adapter around an optional trained model
#[derive(Clone)]
pub struct ClassifierAdapter {
    model: Option<Arc<dyn StressModel>>,
}

impl ClassifierAdapter {
    /// Adapter over a loaded model
    pub fn new(model: Arc<dyn StressModel>) -> Self {
        Self { model: Some(model) }
    }

    /// Adapter with no model; every call reports [`ClassifierError::Unavailable`]
    pub fn unavailable() -> Self {
        Self { model: None }
    }

    /// Whether a model is loaded
    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    /// Name of the loaded model, if any
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().map(|m| m.name())
    }

    /// Classify a reading
    pub fn classify(&self, reading: &BiometricReading) -> Result<Classification, ClassifierError> {
        let model = self.model.as_ref().ok_or(ClassifierError::Unavailable)?;

        let features = FeatureVector::from_reading(reading);
        if !features.is_finite() {
            return Err(ClassifierError::InferenceFailed(format!(
                "non-finite feature vector {:?}",
                features.values()
            )));
        }

        let probabilities = model.predict_proba(&features)?;
        let classification = Self::interpret(&probabilities).map_err(|e| {
            warn!("Model {} returned malformed output: {}", model.name(), e);
            e
        })?;

        debug!(
            "Model {} classified {:?} as {} (conf={:.2})",
            model.name(),
            features.values(),
            classification.label,
            classification.confidence
        );
        Ok(classification)
    }

    /// Validate a probability vector and pick the winning class.
    ///
    /// Ties go to the lower class id.
    fn interpret(probabilities: &[f64]) -> Result<Classification, ClassifierError> {
        if probabilities.len() != CLASS_LABELS.len() {
            return Err(ClassifierError::InferenceFailed(format!(
                "expected {} class probabilities, got {}",
                CLASS_LABELS.len(),
                probabilities.len()
            )));
        }

        if let Some(bad) = probabilities
            .iter()
            .find(|p| !p.is_finite() || **p < 0.0 || **p > 1.0)
        {
            return Err(ClassifierError::InferenceFailed(format!(
                "probability {} outside [0, 1]",
                bad
            )));
        }

        let sum: f64 = probabilities.iter().sum();
        if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(ClassifierError::InferenceFailed(format!(
                "probabilities sum to {}, not 1",
                sum
            )));
        }

        let (class_id, best) = probabilities
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::MIN), |acc, (idx, p)| if p > acc.1 { (idx, p) } else { acc });

        Ok(Classification {
            label: CLASS_LABELS[class_id],
            confidence: round_confidence(best),
        })
    }
}

impl std::fmt::Debug for ClassifierAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierAdapter")
            .field("model", &self.model_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Model returning a fixed probability vector
    struct FixedModel(Vec<f64>);

    impl StressModel for FixedModel {
        fn predict_proba(&self, _features: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    /// Model that fails every call
    struct BrokenModel;

    impl StressModel for BrokenModel {
        fn predict_proba(&self, _features: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
            Err(ClassifierError::InferenceFailed("session crashed".to_string()))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    /// Model that echoes the feature vector so tests can see the column order
    struct EchoModel(std::sync::Mutex<Vec<f64>>);

    impl StressModel for EchoModel {
        fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
            *self.0.lock().unwrap() = features.values().to_vec();
            Ok(vec![0.5, 0.5])
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn reading() -> BiometricReading {
        BiometricReading::new(80, 6.0, 5000)
    }

    #[test]
    fn test_unavailable_adapter() {
        let adapter = ClassifierAdapter::unavailable();
        assert!(!adapter.is_available());
        assert_eq!(adapter.classify(&reading()), Err(ClassifierError::Unavailable));
    }

    #[test]
    fn test_positive_class_maps_to_high() {
        let adapter = ClassifierAdapter::new(Arc::new(FixedModel(vec![0.27, 0.73])));
        let result = adapter.classify(&reading()).unwrap();
        assert_eq!(result.label, StressLabel::High);
        assert_eq!(result.confidence, 0.73);
    }

    #[test]
    fn test_negative_class_maps_to_low() {
        let adapter = ClassifierAdapter::new(Arc::new(FixedModel(vec![0.914, 0.086])));
        let result = adapter.classify(&reading()).unwrap();
        assert_eq!(result.label, StressLabel::Low);
        assert_eq!(result.confidence, 0.91);
    }

    #[test]
    fn test_tie_goes_to_low() {
        let adapter = ClassifierAdapter::new(Arc::new(FixedModel(vec![0.5, 0.5])));
        let result = adapter.classify(&reading()).unwrap();
        assert_eq!(result.label, StressLabel::Low);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn test_certain_model_confidence_is_one() {
        let adapter = ClassifierAdapter::new(Arc::new(FixedModel(vec![0.0, 1.0])));
        assert_eq!(adapter.classify(&reading()).unwrap().confidence, 1.0);
    }

    #[test]
    fn test_malformed_outputs_rejected() {
        let cases = [
            vec![1.0],
            vec![0.2, 0.3, 0.5],
            vec![f64::NAN, 1.0],
            vec![-0.1, 1.1],
            vec![0.7, 0.7],
            vec![],
        ];
        for probabilities in cases {
            let adapter = ClassifierAdapter::new(Arc::new(FixedModel(probabilities.clone())));
            assert!(
                matches!(adapter.classify(&reading()), Err(ClassifierError::InferenceFailed(_))),
                "{:?} should be rejected",
                probabilities
            );
        }
    }

    #[test]
    fn test_model_error_passes_through() {
        let adapter = ClassifierAdapter::new(Arc::new(BrokenModel));
        assert_eq!(
            adapter.classify(&reading()),
            Err(ClassifierError::InferenceFailed("session crashed".to_string()))
        );
    }

    #[test]
    fn test_non_finite_reading_rejected_before_inference() {
        let adapter = ClassifierAdapter::new(Arc::new(FixedModel(vec![0.1, 0.9])));
        let result = adapter.classify(&BiometricReading::new(80, f64::INFINITY, 5000));
        assert!(matches!(result, Err(ClassifierError::InferenceFailed(_))));
    }

    #[test]
    fn test_features_passed_in_model_order() {
        let model = Arc::new(EchoModel(std::sync::Mutex::new(Vec::new())));
        let adapter = ClassifierAdapter::new(model.clone());
        adapter.classify(&BiometricReading::new(91, 4.5, 3200)).unwrap();
        assert_eq!(*model.0.lock().unwrap(), vec![91.0, 4.5, 3200.0]);
    }
}
