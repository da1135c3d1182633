//! Process-wide Classifier Handle
//!
//! The trained model is loaded at most once per process, either at startup
//! or on first use, and is read-only afterwards. A failed load leaves the
//! handle permanently unavailable so the service keeps running in
//! heuristic-only mode.

use crate::adapter::ClassifierAdapter;
use crate::model::StressModel;
use crate::onnx::OnnxStressModel;
use crate::store::ModelStore;
use crate::ClassifierError;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

type Loader =
    Box<dyn Fn(&ModelStore) -> Result<Arc<dyn StressModel>, ClassifierError> + Send + Sync>;

/// Shared, lazily or eagerly initialised classifier
pub struct SharedClassifier {
    store: Option<ModelStore>,
    loader: Loader,
    adapter: OnceLock<ClassifierAdapter>,
}

impl SharedClassifier {
    /// Load the ONNX model now
    pub fn eager(store: ModelStore) -> Self {
        let shared = Self::lazy(store);
        shared.adapter();
        shared
    }

    /// Defer loading the ONNX model until the first prediction
    pub fn lazy(store: ModelStore) -> Self {
        Self::with_loader(store, |store| {
            OnnxStressModel::load(store).map(|model| Arc::new(model) as Arc<dyn StressModel>)
        })
    }

    /// Lazy handle with a custom loader
    pub fn with_loader<F>(store: ModelStore, loader: F) -> Self
    where
        F: Fn(&ModelStore) -> Result<Arc<dyn StressModel>, ClassifierError> + Send + Sync + 'static,
    {
        Self {
            store: Some(store),
            loader: Box::new(loader),
            adapter: OnceLock::new(),
        }
    }

    /// Handle over an already loaded model
    pub fn from_model(model: Arc<dyn StressModel>) -> Self {
        Self::initialised(ClassifierAdapter::new(model))
    }

    /// Handle with no model at all
    pub fn unavailable() -> Self {
        Self::initialised(ClassifierAdapter::unavailable())
    }

    fn initialised(adapter: ClassifierAdapter) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(adapter);
        Self {
            store: None,
            loader: Box::new(no_loader),
            adapter: cell,
        }
    }

    /// The adapter, loading the model on first access
    pub fn adapter(&self) -> &ClassifierAdapter {
        self.adapter.get_or_init(|| self.load())
    }

    /// Whether the model path is usable
    pub fn is_available(&self) -> bool {
        self.adapter().is_available()
    }

    /// Whether the load attempt has already happened
    pub fn is_initialised(&self) -> bool {
        self.adapter.get().is_some()
    }

    fn load(&self) -> ClassifierAdapter {
        let Some(store) = &self.store else {
            return ClassifierAdapter::unavailable();
        };

        match (self.loader)(store) {
            Ok(model) => {
                info!("Stress model {} ready", model.name());
                ClassifierAdapter::new(model)
            }
            Err(e) => {
                warn!(
                    "Stress model unavailable ({}), predictions will use the heuristic",
                    e
                );
                ClassifierAdapter::unavailable()
            }
        }
    }
}

fn no_loader(_store: &ModelStore) -> Result<Arc<dyn StressModel>, ClassifierError> {
    Err(ClassifierError::Unavailable)
}

impl std::fmt::Debug for SharedClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedClassifier")
            .field("store", &self.store)
            .field("adapter", &self.adapter.get())
            .finish()
    }
}
