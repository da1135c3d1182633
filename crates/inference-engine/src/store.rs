//! Model Artifact Store

use crate::ClassifierError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Filesystem location of the persisted model artifact
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    /// Create a store pointing at an artifact path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Artifact path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the artifact exists on disk
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the artifact bytes
    pub fn read(&self) -> Result<Vec<u8>, ClassifierError> {
        debug!("Reading model artifact from {}", self.path.display());
        std::fs::read(&self.path)
            .map_err(|e| ClassifierError::ModelLoad(format!("{}: {}", self.path.display(), e)))
    }
}
