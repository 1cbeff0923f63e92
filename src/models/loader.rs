//! ONNX artifact loading for the fraud classifier

use std::path::Path;

use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use tracing::info;

use crate::error::GuardianError;

/// Loaded classifier with resolved input/output names.
pub struct LoadedModel {
    /// ONNX Runtime session
    pub session: Session,
    /// Input name for the feature tensor
    pub input_name: String,
    /// Output name for class probabilities
    pub output_name: String,
}

/// Loader for the fraud classifier artifact.
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    intra_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread).
    pub fn new() -> Result<Self, GuardianError> {
        Self::with_threads(1)
    }

    /// Create a new model loader with the specified thread count.
    pub fn with_threads(intra_threads: usize) -> Result<Self, GuardianError> {
        ort::init().commit();
        Ok(Self { intra_threads })
    }

    /// Load the classifier from an ONNX file.
    pub fn load_model<P: AsRef<Path>>(&self, path: P) -> Result<LoadedModel, GuardianError> {
        let path = path.as_ref();
        info!(path = %path.display(), threads = self.intra_threads, "Loading fraud model");

        let session = self
            .session_builder()?
            .commit_from_file(path)
            .map_err(|e| GuardianError::ModelLoad(format!("{}: {}", path.display(), e)))?;

        Ok(Self::resolve_io(session))
    }

    /// Load the classifier from an in-memory artifact.
    pub fn load_model_bytes(&self, artifact: &[u8]) -> Result<LoadedModel, GuardianError> {
        let session = self
            .session_builder()?
            .commit_from_memory(artifact)
            .map_err(|e| GuardianError::ModelLoad(e.to_string()))?;

        Ok(Self::resolve_io(session))
    }

    fn session_builder(&self) -> Result<SessionBuilder, GuardianError> {
        let builder =
            Session::builder().map_err(|e| GuardianError::ModelLoad(e.to_string()))?;
        let builder = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| GuardianError::ModelLoad(e.to_string()))?;
        builder
            .with_intra_threads(self.intra_threads)
            .map_err(|e| GuardianError::ModelLoad(e.to_string()))
    }

    /// Resolve input/output names from session metadata.
    ///
    /// Classifier exports name their probability output differently per
    /// converter; prefer anything containing "prob", then "output", then
    /// fall back to the last output.
    fn resolve_io(session: Session) -> LoadedModel {
        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs()
            .iter()
            .find(|o| o.name().contains("prob"))
            .or_else(|| session.outputs().iter().find(|o| o.name().contains("output")))
            .map(|o| o.name().to_string())
            .unwrap_or_else(|| {
                session
                    .outputs()
                    .last()
                    .map(|o| o.name().to_string())
                    .unwrap_or_else(|| "probabilities".to_string())
            });

        info!(
            input = %input_name,
            output = %output_name,
            "Model loaded successfully"
        );

        LoadedModel {
            session,
            input_name,
            output_name,
        }
    }
}
