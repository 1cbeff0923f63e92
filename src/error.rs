//! Error types for the guardian engine

use thiserror::Error;

/// Errors that can occur while evaluating a session or loading the model.
#[derive(Debug, Error)]
pub enum GuardianError {
    /// The caller supplied a session with zero readings. An empty session
    /// is a caller error, never a VALID verdict.
    #[error("no readings supplied for evaluation")]
    EmptyInput,

    /// A reading carried a non-finite value. Propagated rather than
    /// skipped, since dropping the reading could hide the exact second
    /// where fraud occurred.
    #[error("malformed reading at t={time_index}: {field} is {value}")]
    MalformedReading {
        time_index: u64,
        field: &'static str,
        value: f64,
    },

    /// The model artifact is missing or corrupt.
    #[error("failed to load model artifact: {0}")]
    ModelLoad(String),

    /// The loaded model failed at predict time.
    #[error("model inference failed: {0}")]
    Inference(String),

    /// A session payload could not be parsed.
    #[error("invalid session payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The engine configuration could not be read.
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}

impl From<ort::Error> for GuardianError {
    fn from(err: ort::Error) -> Self {
        GuardianError::Inference(err.to_string())
    }
}
