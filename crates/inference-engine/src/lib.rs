//! Stress Classifier Adapter
//!
//! Wraps a pre-trained binary classifier (exported to ONNX and run with
//! tract) behind a typed interface: a reading goes in, a label with a
//! confidence comes out, or a [`ClassifierError`] explains why the model path
//! is unusable.

mod adapter;
mod model;
mod onnx;
mod shared;
mod store;

pub use adapter::{Classification, ClassifierAdapter, CLASS_LABELS};
pub use model::StressModel;
pub use onnx::OnnxStressModel;
pub use shared::SharedClassifier;
pub use store::ModelStore;

use thiserror::Error;

/// Errors on the model path
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifierError {
    #[error("Classifier unavailable: no model loaded")]
    Unavailable,
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Model load failed: {0}")]
    ModelLoad(String),
}

impl ClassifierError {
    /// Short reason tag for logs and metrics
    pub fn reason(&self) -> &'static str {
        match self {
            ClassifierError::Unavailable => "unavailable",
            ClassifierError::InferenceFailed(_) => "inference_failed",
            ClassifierError::ModelLoad(_) => "model_load",
        }
    }
}
