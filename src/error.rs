//! Error types for the generation pipeline

use thiserror::Error;

/// Pipeline errors.
///
/// Cancellation is deliberately absent: a stop request is an alternate
/// termination path that still persists output, not a failure.
#[derive(Debug, Error)]
pub enum GenError {
    /// Predict or fit was requested before a prediction engine was loaded
    #[error("model not loaded")]
    ModelNotLoaded,

    /// A prediction engine call failed. Fatal during sampling; absorbed
    /// and logged during training.
    #[error("prediction engine failure: {0}")]
    Engine(String),

    /// Image decode/encode failed. Load and save are single-shot, never retried.
    #[error("image codec failure: {0}")]
    Codec(String),

    /// Training-set construction failed (manifest parse, missing file, empty set)
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Engine weight persistence failed
    #[error("weight store error: {0}")]
    Weights(String),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, GenError>;
