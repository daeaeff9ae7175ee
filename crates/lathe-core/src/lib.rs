//! Lathe Core
//!
//! Wires the training crate into the operations a presentation layer calls:
//! upload training data, poll or watch the training status, reset it, and
//! evaluate test data against the trained model.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod poller;

pub use config::{ConfigFile, LatheConfig, LogFormat};
pub use dashboard::{Dashboard, UploadSummary};
pub use error::{DashboardError, Result};
pub use poller::{StatusPoller, StatusWatch};

pub use lathe_training::{
    encode_upload, EvaluationError, ModelManifest, RocCurveResult, RocPoint, TrainingError, TrainingStatus,
};
