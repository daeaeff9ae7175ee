//! Lathe Training
//!
//! Core of the Lathe dashboard:
//! - Decoding uploaded `data:` URIs into typed datasets
//! - Fitting a class-balanced random forest (`ForestTrainer`)
//! - The single model slot (`ModelRepository`)
//! - The durable training status flag (`TrainingStatusStore`)
//! - Scoring test data into an ROC curve (`evaluate`)

pub mod artifacts;
pub mod dataset;
pub mod decoder;
pub mod error;
pub mod evaluation;
pub mod forest;
pub mod job;
pub mod layout;
pub mod progress;
pub mod registry;
pub mod status;
pub mod trainer;

pub use artifacts::{ModelArtifact, ModelManifest, TrainingMetrics};
pub use dataset::{Column, ColumnKind, ColumnValues, Dataset, DatasetId, FeatureMatrix};
pub use decoder::{decode, encode_upload, EncodedUpload};
pub use error::{DecodeError, EvaluationError, ModelStoreError, StatusError, TrainingError, TrainingResult};
pub use evaluation::{evaluate, roc_curve, RocCurveResult, RocPoint};
pub use forest::RandomForest;
pub use job::{ClassWeight, TrainingHyperParams, TrainingJobId, TrainingJobSpec, DEFAULT_LABEL_COLUMN};
pub use layout::DashboardLayout;
pub use progress::{NullProgressSink, ProgressEvent, ProgressSink, TracingProgressSink};
pub use registry::{FileModelRepository, InMemoryModelRepository, ModelRepository};
pub use status::{FileStatusStore, InMemoryStatusStore, TrainingStatus, TrainingStatusStore};
pub use trainer::{run_training_job, ForestTrainer, Trainer};
