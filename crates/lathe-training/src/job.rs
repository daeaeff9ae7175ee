use crate::error::{TrainingError, TrainingResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Column holding the class label when nothing else is configured.
pub const DEFAULT_LABEL_COLUMN: &str = "label";

/// Identifier for a training job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrainingJobId(pub String);

impl TrainingJobId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for TrainingJobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TrainingJobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassWeight {
    /// Weight each class by `n_samples / (2 * class_count)`.
    Balanced,
    Uniform,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingHyperParams {
    pub n_estimators: usize,
    pub class_weight: ClassWeight,
    #[serde(default)]
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for TrainingHyperParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            class_weight: ClassWeight::Balanced,
            max_depth: None,
            min_samples_split: 2,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl TrainingHyperParams {
    pub fn validate(&self) -> TrainingResult<()> {
        if self.n_estimators == 0 {
            return Err(TrainingError::InvalidSpec("n_estimators must be >= 1".to_string()));
        }
        if self.max_depth == Some(0) {
            return Err(TrainingError::InvalidSpec("max_depth must be >= 1 when set".to_string()));
        }
        if self.min_samples_split < 2 {
            return Err(TrainingError::InvalidSpec("min_samples_split must be >= 2".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingJobSpec {
    pub job_id: TrainingJobId,
    pub created_at: DateTime<Utc>,
    pub label_column: String,
    pub hyperparams: TrainingHyperParams,
}

impl TrainingJobSpec {
    #[must_use]
    pub fn new(label_column: impl Into<String>, hyperparams: TrainingHyperParams) -> Self {
        Self { job_id: TrainingJobId::new(), created_at: Utc::now(), label_column: label_column.into(), hyperparams }
    }

    pub fn validate(&self) -> TrainingResult<()> {
        if self.label_column.trim().is_empty() {
            return Err(TrainingError::InvalidSpec("label_column is required".to_string()));
        }
        self.hyperparams.validate()
    }
}

impl Default for TrainingJobSpec {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL_COLUMN, TrainingHyperParams::default())
    }
}
