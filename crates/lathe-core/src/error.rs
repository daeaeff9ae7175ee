//! Error types for Lathe Core.

use lathe_training::{DecodeError, EvaluationError, ModelStoreError, StatusError, TrainingError};
use thiserror::Error;

/// Errors surfaced to the presentation layer by [`crate::Dashboard`].
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The uploaded payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Bad training data, fit failure or model slot write failure
    #[error("Training error: {0}")]
    Training(#[from] TrainingError),

    /// Evaluation requested before any model was trained
    #[error("No trained model found; upload training data first")]
    ModelNotFound,

    /// Test data does not match the trained model
    #[error("Evaluation error: {0}")]
    Evaluation(EvaluationError),

    /// The status flag medium is unavailable; status unknown
    #[error("Training status unknown: {0}")]
    StatusFlagIo(#[from] StatusError),

    /// Model slot could not be read or cleared
    #[error("Model store error: {0}")]
    ModelStore(#[from] ModelStoreError),

    /// A training run is already in flight
    #[error("A training run is already in progress")]
    ConcurrentTraining,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<EvaluationError> for DashboardError {
    fn from(err: EvaluationError) -> Self {
        match err {
            EvaluationError::ModelNotFound => Self::ModelNotFound,
            other => Self::Evaluation(other),
        }
    }
}

/// Result type alias for dashboard operations.
pub type Result<T> = std::result::Result<T, DashboardError>;
