//! ONNX Model Backend
//!
//! The offline training job exports the classifier to ONNX with a single
//! float input of shape `[1, 3]`. The exported graph yields the predicted
//! label first and the class probabilities (`[1, 2]`) last.

use crate::model::StressModel;
use crate::store::ModelStore;
use crate::ClassifierError;
use feature_engine::{FeatureVector, FEATURE_DIMENSION};
use std::io::Cursor;
use tracing::{debug, info};
use tract_onnx::prelude::*;

type Plan = TypedRunnableModel<TypedModel>;

/// Stress classifier backed by a tract execution plan
pub struct OnnxStressModel {
    plan: Plan,
    name: String,
}

impl OnnxStressModel {
    /// Load and optimize the model from the artifact store
    pub fn load(store: &ModelStore) -> Result<Self, ClassifierError> {
        let bytes = store.read()?;
        Self::from_bytes(&bytes, &store.path().display().to_string())
    }

    /// Load and optimize the model from raw ONNX bytes
    pub fn from_bytes(bytes: &[u8], name: &str) -> Result<Self, ClassifierError> {
        let mut reader = Cursor::new(bytes);
        let plan = tract_onnx::onnx()
            .model_for_read(&mut reader)
            .and_then(|model| {
                model.with_input_fact(0, f32::fact([1, FEATURE_DIMENSION]).into())
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| ClassifierError::ModelLoad(format!("{}: {}", name, e)))?;

        info!("Loaded ONNX stress model from {}", name);
        Ok(Self {
            plan,
            name: name.to_string(),
        })
    }

    fn run(&self, features: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
        let failed = |e: &dyn std::fmt::Display| ClassifierError::InferenceFailed(e.to_string());

        let input: Tensor =
            tract_ndarray::Array2::from_shape_vec((1, FEATURE_DIMENSION), features.to_f32().to_vec())
                .map_err(|e| failed(&e))?
                .into();
        let outputs = self.plan.run(tvec!(input.into())).map_err(|e| failed(&e))?;

        let probabilities = outputs
            .last()
            .ok_or_else(|| failed(&"model produced no outputs"))?;
        let view = probabilities.to_array_view::<f32>().map_err(|e| failed(&e))?;
        Ok(view.iter().map(|p| *p as f64).collect())
    }
}

impl StressModel for OnnxStressModel {
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
        let probabilities = self.run(features)?;
        debug!("ONNX probabilities: {:?}", probabilities);
        Ok(probabilities)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
