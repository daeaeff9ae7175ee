//! The operations the presentation layer calls.

use crate::config::LatheConfig;
use crate::error::{DashboardError, Result};
use crate::poller::StatusPoller;
use chrono::{DateTime, Utc};
use lathe_training::{
    decode, evaluate, run_training_job, DashboardLayout, Dataset, DatasetId, FileModelRepository, FileStatusStore,
    ForestTrainer, ModelManifest, ModelRepository, ProgressSink, RocCurveResult, StatusError, Trainer,
    TrainingHyperParams, TrainingJobSpec, TrainingStatus, TrainingStatusStore, TracingProgressSink,
    DEFAULT_LABEL_COLUMN,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// What the dashboard shows about the most recent training upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    pub dataset_id: DatasetId,
    pub rows: usize,
    pub columns: Vec<String>,
    pub received_at: DateTime<Utc>,
}

impl UploadSummary {
    fn of(dataset: &Dataset) -> Self {
        Self {
            dataset_id: dataset.id().clone(),
            rows: dataset.n_rows(),
            columns: dataset.column_names().into_iter().map(str::to_string).collect(),
            received_at: Utc::now(),
        }
    }
}

/// Status flag, model slot and trainer wired together.
pub struct Dashboard {
    status: Arc<dyn TrainingStatusStore>,
    models: Arc<dyn ModelRepository>,
    trainer: Arc<dyn Trainer>,
    progress: Arc<dyn ProgressSink>,
    label_column: String,
    hyperparams: TrainingHyperParams,
    poll_interval: Duration,
    last_upload: Mutex<Option<UploadSummary>>,
}

impl Dashboard {
    /// Dashboard over the given stores with the default forest trainer.
    #[must_use]
    pub fn new(status: Arc<dyn TrainingStatusStore>, models: Arc<dyn ModelRepository>) -> Self {
        Self {
            status,
            models,
            trainer: Arc::new(ForestTrainer),
            progress: Arc::new(TracingProgressSink),
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            hyperparams: TrainingHyperParams::default(),
            poll_interval: Duration::from_secs(1),
            last_upload: Mutex::new(None),
        }
    }

    /// File-backed dashboard rooted at `config.data_dir`.
    ///
    /// The flag is set to `Empty` only when it does not exist yet. A flag holding an
    /// unknown token does not prevent opening, so `reset_training_status` can repair it.
    pub fn open(config: &LatheConfig) -> Result<Self> {
        config.validate()?;

        let layout = DashboardLayout::new(config.data_dir.clone());
        layout
            .ensure_dirs()
            .map_err(|source| StatusError::Io { path: layout.root().to_path_buf(), source })?;

        let status = FileStatusStore::new(layout.status_path());
        match status.initialize()? {
            Some(initial) => tracing::debug!(data_dir = %layout.root().display(), status = %initial, "dashboard opened"),
            None => tracing::debug!(data_dir = %layout.root().display(), "dashboard opened with an unreadable status flag"),
        }

        Ok(Self::new(Arc::new(status), Arc::new(FileModelRepository::new(layout.model_path())))
            .with_label_column(config.label_column.clone())
            .with_hyperparams(config.hyperparams())
            .with_poll_interval(config.poll_interval()))
    }

    #[must_use]
    pub fn with_trainer(mut self, trainer: Arc<dyn Trainer>) -> Self {
        self.trainer = trainer;
        self
    }

    #[must_use]
    pub fn with_progress_sink(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn with_label_column(mut self, label_column: impl Into<String>) -> Self {
        self.label_column = label_column.into();
        self
    }

    #[must_use]
    pub fn with_hyperparams(mut self, hyperparams: TrainingHyperParams) -> Self {
        self.hyperparams = hyperparams;
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    #[must_use]
    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    /// Decode the upload, train a forest on it and replace the model slot.
    ///
    /// The flag reads `Training` for the whole fit and `Trained` afterwards. A decode
    /// failure leaves the flag untouched; a training failure restores the state held
    /// before the run.
    pub fn submit_training_data(&self, blob: &str) -> Result<ModelManifest> {
        let dataset = decode(blob)?;

        let previous = self.status.get()?;
        if previous == TrainingStatus::Training {
            return Err(DashboardError::ConcurrentTraining);
        }

        self.status.lock()?;
        self.set_last_upload(Some(UploadSummary::of(&dataset)));

        let job = TrainingJobSpec::new(self.label_column.clone(), self.hyperparams.clone());
        match run_training_job(self.trainer.as_ref(), &dataset, &job, self.models.as_ref(), self.progress.as_ref()) {
            Ok(manifest) => {
                if let Err(e) = self.status.unlock() {
                    tracing::error!(
                        job_id = %manifest.job_id,
                        error = %e,
                        "model saved but the training status could not be set to trained; run reset to clear it"
                    );
                    return Err(e.into());
                }
                tracing::info!(
                    job_id = %manifest.job_id,
                    train_accuracy = manifest.metrics.train_accuracy,
                    "model trained"
                );
                Ok(manifest)
            }
            Err(e) => {
                tracing::warn!(job_id = %job.job_id, error = %e, "training failed");
                if let Err(restore) = self.status.set(previous) {
                    tracing::error!(error = %restore, status = %previous, "failed to restore training status");
                }
                Err(e.into())
            }
        }
    }

    pub fn poll_training_status(&self) -> Result<TrainingStatus> {
        Ok(self.status.get()?)
    }

    /// Flag back to `Empty` and forget the last upload. The model slot is kept.
    pub fn reset_training_status(&self) -> Result<()> {
        self.status.reset()?;
        self.set_last_upload(None);
        tracing::info!("training status reset");
        Ok(())
    }

    /// Delete the trained model.
    pub fn purge_model(&self) -> Result<()> {
        self.models.clear()?;
        tracing::info!("model slot cleared");
        Ok(())
    }

    /// Score the upload with the trained model and build its ROC curve.
    pub fn submit_test_data(&self, blob: &str) -> Result<RocCurveResult> {
        let dataset = decode(blob)?;
        Ok(evaluate(self.models.as_ref(), &dataset)?)
    }

    #[must_use]
    pub fn last_training_upload(&self) -> Option<UploadSummary> {
        self.last_upload.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Poller over this dashboard's status flag at the configured interval.
    #[must_use]
    pub fn status_poller(&self) -> StatusPoller {
        StatusPoller::new(Arc::clone(&self.status), self.poll_interval)
    }

    fn set_last_upload(&self, summary: Option<UploadSummary>) {
        *self.last_upload.lock().unwrap_or_else(PoisonError::into_inner) = summary;
    }
}
