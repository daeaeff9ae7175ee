use crate::dataset::DatasetId;
use crate::forest::RandomForest;
use crate::job::{TrainingHyperParams, TrainingJobId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TrainingMetrics {
    pub rows: usize,
    /// Row counts per class, in the same order as `ModelManifest::classes`.
    pub class_counts: [usize; 2],
    pub train_accuracy: f64,
}

/// Everything needed to reload the forest and check a test set against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub job_id: TrainingJobId,
    pub created_at: DateTime<Utc>,
    pub dataset_id: DatasetId,
    pub label_column: String,
    pub feature_names: Vec<String>,
    /// `[negative, positive]`.
    pub classes: [String; 2],
    pub hyperparams: TrainingHyperParams,
    #[serde(default)]
    pub metrics: TrainingMetrics,
}

impl ModelManifest {
    #[must_use]
    pub fn positive_class(&self) -> &str {
        &self.classes[1]
    }

    #[must_use]
    pub fn class_index(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }
}

/// The single artifact stored in the model slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub manifest: ModelManifest,
    pub forest: RandomForest,
}

impl ModelArtifact {
    /// Positive-class probability for a row in `manifest.feature_names` order.
    #[must_use]
    pub fn score(&self, row: &[f64]) -> f64 {
        self.forest.predict_proba(row)
    }
}

pub fn sha256_file(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}
