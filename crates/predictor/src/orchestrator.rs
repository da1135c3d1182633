//! Prediction Orchestrator

use crate::result::{PredictionMethod, PredictionResult};
use data_validator::Validator;
use fallback::FallbackEngine;
use feature_engine::BiometricReading;
use inference_engine::{Classification, ClassifierError, SharedClassifier};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

/// Stress predictor with classifier-first, heuristic-fallback policy
#[derive(Debug, Clone)]
pub struct StressPredictor {
    classifier: Arc<SharedClassifier>,
    fallback: FallbackEngine,
}

impl StressPredictor {
    /// Create a predictor over a shared classifier handle
    pub fn new(classifier: Arc<SharedClassifier>) -> Self {
        Self {
            classifier,
            fallback: FallbackEngine::new(),
        }
    }

    /// Predictor that only ever uses the heuristic
    pub fn heuristic_only() -> Self {
        Self::new(Arc::new(SharedClassifier::unavailable()))
    }

    /// Whether the model path is usable
    pub fn model_available(&self) -> bool {
        self.classifier.is_available()
    }

    /// Method the next prediction will try first
    pub fn preferred_method(&self) -> PredictionMethod {
        if self.model_available() {
            PredictionMethod::Model
        } else {
            PredictionMethod::Heuristic
        }
    }

    /// Predict the stress level of a reading.
    ///
    /// Total: model-path failures are logged and replaced by the heuristic,
    /// so the result is always a success.
    pub fn predict(&self, reading: &BiometricReading) -> PredictionResult {
        let result = match self.try_model(reading) {
            Ok(classification) => PredictionResult::success(
                classification.label,
                classification.confidence,
                PredictionMethod::Model,
            ),
            Err(e) => {
                if e == ClassifierError::Unavailable {
                    debug!("Model unavailable, using heuristic");
                } else {
                    warn!("Model prediction failed, using heuristic: {}", e);
                }
                metrics::counter!("stress_model_fallbacks_total", "reason" => e.reason())
                    .increment(1);
                self.heuristic(reading)
            }
        };

        metrics::counter!("stress_predictions_total", "method" => result.method.as_str())
            .increment(1);
        result
    }

    /// Validate the reading, then predict.
    ///
    /// This is the only way an error result is produced.
    pub fn predict_validated(
        &self,
        reading: &BiometricReading,
        validator: &Validator,
    ) -> PredictionResult {
        match validator.validate_reading(reading) {
            Ok(()) => self.predict(reading),
            Err(e) => {
                debug!("Rejected reading: {}", e);
                PredictionResult::error(e.to_string(), self.preferred_method())
            }
        }
    }

    fn try_model(&self, reading: &BiometricReading) -> Result<Classification, ClassifierError> {
        let adapter = self.classifier.adapter();
        if !adapter.is_available() {
            return Err(ClassifierError::Unavailable);
        }

        catch_unwind(AssertUnwindSafe(|| adapter.classify(reading))).unwrap_or_else(|panic| {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "model panicked".to_string());
            Err(ClassifierError::InferenceFailed(message))
        })
    }

    fn heuristic(&self, reading: &BiometricReading) -> PredictionResult {
        let outcome = self.fallback.evaluate(reading);
        PredictionResult::success(outcome.label, outcome.confidence, PredictionMethod::Heuristic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::PredictionStatus;
    use feature_engine::{FeatureVector, StressLabel};
    use inference_engine::{ModelStore, StressModel};
    use proptest::prelude::*;

    struct FixedModel(Vec<f64>);

    impl StressModel for FixedModel {
        fn predict_proba(&self, _features: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingModel;

    impl StressModel for FailingModel {
        fn predict_proba(&self, _features: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
            Err(ClassifierError::InferenceFailed("forced failure".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct PanickingModel;

    impl StressModel for PanickingModel {
        fn predict_proba(&self, _features: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
            panic!("tensor shape mismatch")
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    fn with_model(model: impl StressModel + 'static) -> StressPredictor {
        StressPredictor::new(Arc::new(SharedClassifier::from_model(Arc::new(model))))
    }

    #[test]
    fn test_model_path_used_when_available() {
        let predictor = with_model(FixedModel(vec![0.12, 0.88]));
        let result = predictor.predict(&BiometricReading::new(60, 8.0, 10_000));

        assert_eq!(result, PredictionResult::success(StressLabel::High, 0.88, PredictionMethod::Model));
        assert_eq!(predictor.preferred_method(), PredictionMethod::Model);
    }

    #[test]
    fn test_unavailable_model_uses_heuristic() {
        let predictor = StressPredictor::heuristic_only();
        let result = predictor.predict(&BiometricReading::new(80, 6.0, 5000));

        assert_eq!(
            result,
            PredictionResult::success(StressLabel::High, 0.67, PredictionMethod::Heuristic)
        );
        assert!(!predictor.model_available());
    }

    #[test]
    fn test_missing_artifact_uses_heuristic() {
        let classifier = SharedClassifier::lazy(ModelStore::new("missing/stress_model.onnx"));
        let predictor = StressPredictor::new(Arc::new(classifier));
        let result = predictor.predict(&BiometricReading::new(60, 8.0, 10_000));

        assert_eq!(
            result,
            PredictionResult::success(StressLabel::Low, 0.67, PredictionMethod::Heuristic)
        );
    }

    #[test]
    fn test_onnx_artifact_serves_predictions() {
        let store = ModelStore::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../inference-engine/tests/fixtures/stress_linear.onnx"
        ));
        let predictor = StressPredictor::new(Arc::new(SharedClassifier::eager(store)));
        let result = predictor.predict(&BiometricReading::new(80, 6.0, 5000));

        assert!(predictor.model_available());
        assert_eq!(
            result,
            PredictionResult::success(StressLabel::High, 0.88, PredictionMethod::Model)
        );
    }

    #[test]
    fn test_inference_failure_falls_back() {
        let predictor = with_model(FailingModel);
        let result = predictor.predict(&BiometricReading::new(80, 6.0, 5000));

        assert_eq!(result.status, PredictionStatus::Success);
        assert_eq!(result.method, PredictionMethod::Heuristic);
        assert_eq!(result.label, Some(StressLabel::High));
        // Availability reflects the load state, not per-call failures
        assert!(predictor.model_available());
    }

    #[test]
    fn test_malformed_output_falls_back() {
        let predictor = with_model(FixedModel(vec![0.9, 0.9]));
        let result = predictor.predict(&BiometricReading::new(60, 6.0, 10_000));

        assert_eq!(
            result,
            PredictionResult::success(StressLabel::Low, 0.0, PredictionMethod::Heuristic)
        );
    }

    #[test]
    fn test_panicking_model_falls_back() {
        let predictor = with_model(PanickingModel);
        let result = predictor.predict(&BiometricReading::new(80, 6.0, 5000));

        assert_eq!(result.method, PredictionMethod::Heuristic);
        assert!(result.is_success());
    }

    #[test]
    fn test_validation_failure_is_the_only_error() {
        let predictor = StressPredictor::heuristic_only();
        let validator = Validator::default();

        let rejected = predictor.predict_validated(&BiometricReading::new(250, 6.0, 5000), &validator);
        assert_eq!(rejected.status, PredictionStatus::Error);
        assert_eq!(rejected.label, None);
        assert_eq!(rejected.confidence, None);
        assert!(rejected.message.unwrap().contains("heart_rate"));

        let accepted = predictor.predict_validated(&BiometricReading::new(80, 6.0, 5000), &validator);
        assert!(accepted.is_success());
    }

    proptest! {
        #[test]
        fn prop_predict_is_total(
            hr in 40i32..=200,
            sleep in 0.0f64..=24.0,
            steps in 0i64..=100_000,
        ) {
            let reading = BiometricReading::new(hr, sleep, steps);
            for predictor in [
                StressPredictor::heuristic_only(),
                with_model(FixedModel(vec![0.3, 0.7])),
                with_model(FailingModel),
            ] {
                let result = predictor.predict(&reading);
                prop_assert_eq!(result.status, PredictionStatus::Success);
                prop_assert!(result.label.is_some());
                let confidence = result.confidence.unwrap();
                prop_assert!((0.0..=1.0).contains(&confidence));
                prop_assert!(result.message.is_none());
            }
        }

        #[test]
        fn prop_failing_model_indistinguishable_from_heuristic_only(
            hr in 40i32..=200,
            sleep in 0.0f64..=24.0,
            steps in 0i64..=100_000,
        ) {
            let reading = BiometricReading::new(hr, sleep, steps);
            let degraded = with_model(FailingModel).predict(&reading);
            let heuristic = StressPredictor::heuristic_only().predict(&reading);

            prop_assert_eq!(degraded, heuristic);
        }

        #[test]
        fn prop_available_model_always_tags_model(
            hr in 40i32..=200,
            sleep in 0.0f64..=24.0,
            steps in 0i64..=100_000,
            p_high in 0.0f64..=1.0,
        ) {
            let predictor = with_model(FixedModel(vec![1.0 - p_high, p_high]));
            let result = predictor.predict(&BiometricReading::new(hr, sleep, steps));
            prop_assert_eq!(result.method, PredictionMethod::Model);
            prop_assert!(result.confidence.unwrap() >= 0.5);
        }
    }
}
