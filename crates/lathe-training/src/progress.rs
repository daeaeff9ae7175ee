use crate::job::TrainingJobId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Started { job_id: TrainingJobId },
    Message { job_id: TrainingJobId, message: String },
    Step { job_id: TrainingJobId, step: u64, total: Option<u64> },
    Finished { job_id: TrainingJobId },
    Failed { job_id: TrainingJobId, error: String },
}

pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: ProgressEvent);
}

/// Forwards progress to `tracing`.
#[derive(Debug, Default)]
pub struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { job_id } => tracing::info!(%job_id, "training started"),
            ProgressEvent::Message { job_id, message } => tracing::info!(%job_id, "{message}"),
            ProgressEvent::Step { job_id, step, total } => {
                if let Some(total) = total {
                    tracing::debug!(%job_id, step, total, "training step");
                } else {
                    tracing::debug!(%job_id, step, "training step");
                }
            }
            ProgressEvent::Finished { job_id } => tracing::info!(%job_id, "training finished"),
            ProgressEvent::Failed { job_id, error } => tracing::info!(%job_id, %error, "training failed"),
        }
    }
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn on_event(&self, _event: ProgressEvent) {}
}
