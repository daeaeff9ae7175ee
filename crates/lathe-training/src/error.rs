use std::path::PathBuf;
use thiserror::Error;

pub type TrainingResult<T> = std::result::Result<T, TrainingError>;

/// Failure to turn an uploaded blob into a [`crate::Dataset`].
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("upload is missing the ',' between type prefix and payload")]
    MissingDelimiter,

    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV header has no columns")]
    NoColumns,

    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("row {row} has no value for column '{column}'")]
    MissingValue { row: usize, column: String },
}

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("invalid training job spec: {0}")]
    InvalidSpec(String),

    #[error("label column '{0}' not found in training data")]
    MissingLabelColumn(String),

    #[error("training data has no feature columns")]
    NoFeatures,

    #[error("training data has no rows")]
    EmptyDataset,

    #[error("feature column '{0}' is not numeric")]
    NonNumericFeature(String),

    #[error("label column must hold exactly two classes, found {found}")]
    NotBinary { found: usize },

    #[error("failed to persist trained model: {0}")]
    Persist(#[from] ModelStoreError),
}

/// Failure reading or writing the model slot.
#[derive(Debug, Error)]
pub enum ModelStoreError {
    #[error("model slot I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact is not valid: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("no trained model found; train a model first")]
    ModelNotFound,

    #[error("label column '{0}' not found in test data")]
    MissingLabelColumn(String),

    #[error("test features {found:?} do not match trained features {expected:?}")]
    FeatureMismatch { expected: Vec<String>, found: Vec<String> },

    #[error("feature column '{0}' is not numeric")]
    NonNumericFeature(String),

    #[error("test label '{label}' is not one of the trained classes {classes:?}")]
    UnknownLabel { label: String, classes: [String; 2] },

    #[error("test labels must contain both classes to draw an ROC curve")]
    SingleClass,

    #[error("test data has no rows")]
    EmptyDataset,

    #[error(transparent)]
    Store(#[from] ModelStoreError),
}

/// Failure reading or writing the training status flag.
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("status flag unavailable at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("status flag holds an unknown value: {0:?}")]
    Corrupt(String),
}
