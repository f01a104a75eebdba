//! Error types for the loan approval trainer and predictor

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, LoanError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum LoanError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("No target column found (expected one of: {expected})")]
    TargetNotFound { expected: String },

    #[error("Target is not binary after normalization. Values seen: {seen:?}")]
    NonBinaryTarget { seen: Vec<String> },

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Artifact not found: {} ({hint})", .path.display())]
    ArtifactMissing { path: PathBuf, hint: String },

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Feature row is missing column: {0}")]
    MissingColumn(String),

    #[error("Feature row has unexpected column: {0}")]
    UnexpectedColumn(String),

    #[error("Invalid value for column {column}: {reason}")]
    InvalidValue { column: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Prompt error: {0}")]
    PromptError(String),
}

impl From<polars::error::PolarsError> for LoanError {
    fn from(err: polars::error::PolarsError) -> Self {
        LoanError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for LoanError {
    fn from(err: serde_json::Error) -> Self {
        LoanError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for LoanError {
    fn from(err: ndarray::ShapeError) -> Self {
        LoanError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

impl From<dialoguer::Error> for LoanError {
    fn from(err: dialoguer::Error) -> Self {
        LoanError::PromptError(err.to_string())
    }
}
