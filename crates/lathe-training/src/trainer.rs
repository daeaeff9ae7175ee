use crate::artifacts::{ModelArtifact, ModelManifest, TrainingMetrics};
use crate::dataset::{distinct_classes, Dataset, SplitError};
use crate::error::{TrainingError, TrainingResult};
use crate::forest::RandomForest;
use crate::job::TrainingJobSpec;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::registry::ModelRepository;

impl From<SplitError> for TrainingError {
    fn from(err: SplitError) -> Self {
        match err {
            SplitError::MissingLabel(name) => Self::MissingLabelColumn(name),
            SplitError::NonNumeric(name) => Self::NonNumericFeature(name),
        }
    }
}

/// A training backend that turns a labeled dataset into a model artifact.
pub trait Trainer: Send + Sync {
    fn id(&self) -> &'static str;

    fn fit(&self, dataset: &Dataset, job: &TrainingJobSpec, progress: &dyn ProgressSink) -> TrainingResult<ModelArtifact>;
}

/// Class-balanced random forest trainer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForestTrainer;

impl Trainer for ForestTrainer {
    fn id(&self) -> &'static str {
        "random-forest"
    }

    fn fit(&self, dataset: &Dataset, job: &TrainingJobSpec, progress: &dyn ProgressSink) -> TrainingResult<ModelArtifact> {
        job.validate()?;

        let data = dataset.split_label(&job.label_column)?;
        if data.features.n_features() == 0 {
            return Err(TrainingError::NoFeatures);
        }
        if data.labels.is_empty() {
            return Err(TrainingError::EmptyDataset);
        }

        let classes = distinct_classes(&data.labels);
        let [negative, positive] = <[String; 2]>::try_from(classes)
            .map_err(|found| TrainingError::NotBinary { found: found.len() })?;

        let y: Vec<bool> = data.labels.iter().map(|l| *l == positive).collect();
        let n_pos = y.iter().filter(|&&p| p).count();

        progress.on_event(ProgressEvent::Message {
            job_id: job.job_id.clone(),
            message: format!(
                "fitting {} trees on {} rows x {} features",
                job.hyperparams.n_estimators,
                y.len(),
                data.features.n_features()
            ),
        });

        let total = job.hyperparams.n_estimators as u64;
        let forest = RandomForest::fit(&data.features.rows, &y, &job.hyperparams, |done| {
            progress.on_event(ProgressEvent::Step { job_id: job.job_id.clone(), step: done as u64, total: Some(total) });
        });

        let correct = data.features.rows.iter().zip(&y).filter(|&(row, truth)| forest.predict(row) == *truth).count();

        let manifest = ModelManifest {
            job_id: job.job_id.clone(),
            created_at: job.created_at,
            dataset_id: dataset.id().clone(),
            label_column: job.label_column.clone(),
            feature_names: data.features.names,
            classes: [negative, positive],
            hyperparams: job.hyperparams.clone(),
            metrics: TrainingMetrics {
                rows: y.len(),
                class_counts: [y.len() - n_pos, n_pos],
                train_accuracy: correct as f64 / y.len() as f64,
            },
        };

        Ok(ModelArtifact { manifest, forest })
    }
}

/// Fit with `trainer`, then overwrite the model slot. The slot is written last,
/// so a failed fit leaves the previous artifact in place.
pub fn run_training_job(
    trainer: &dyn Trainer,
    dataset: &Dataset,
    job: &TrainingJobSpec,
    repository: &dyn ModelRepository,
    progress: &dyn ProgressSink,
) -> TrainingResult<ModelManifest> {
    progress.on_event(ProgressEvent::Started { job_id: job.job_id.clone() });
    tracing::info!(
        job_id = %job.job_id,
        trainer = trainer.id(),
        dataset_id = %dataset.id(),
        rows = dataset.n_rows(),
        "running training job"
    );

    let result = trainer.fit(dataset, job, progress).and_then(|artifact| {
        progress.on_event(ProgressEvent::Message { job_id: job.job_id.clone(), message: "writing model slot".to_string() });
        repository.save(&artifact)?;
        Ok(artifact.manifest)
    });

    match &result {
        Ok(_) => progress.on_event(ProgressEvent::Finished { job_id: job.job_id.clone() }),
        Err(e) => progress.on_event(ProgressEvent::Failed { job_id: job.job_id.clone(), error: e.to_string() }),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{decode, encode_upload};
    use crate::progress::NullProgressSink;
    use crate::registry::InMemoryModelRepository;
    use std::sync::Mutex;

    fn dataset(csv: &str) -> Dataset {
        decode(&encode_upload("text/csv", csv.as_bytes())).unwrap()
    }

    fn fit(csv: &str) -> TrainingResult<ModelArtifact> {
        ForestTrainer.fit(&dataset(csv), &TrainingJobSpec::default(), &NullProgressSink)
    }

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<ProgressEvent>>);

    impl ProgressSink for RecordingSink {
        fn on_event(&self, event: ProgressEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    #[test]
    fn test_fit_small_training_set() {
        let artifact = fit("feature1,feature2,label\n1,2,0\n3,4,1\n5,6,1\n").unwrap();
        let manifest = &artifact.manifest;

        assert_eq!(manifest.feature_names, vec!["feature1", "feature2"]);
        assert_eq!(manifest.classes, ["0".to_string(), "1".to_string()]);
        assert_eq!(manifest.metrics.rows, 3);
        assert_eq!(manifest.metrics.class_counts, [1, 2]);
        assert_eq!(artifact.forest.trees().len(), 100);
    }

    #[test]
    fn test_text_labels_use_lexicographic_classes() {
        let artifact = fit("temp,label\n10,ok\n11,ok\n50,defect\n55,defect\n").unwrap();
        assert_eq!(artifact.manifest.positive_class(), "ok");
        assert!(artifact.score(&[10.5]) > artifact.score(&[52.0]));
    }

    #[test]
    fn test_single_class_is_not_binary() {
        let err = fit("a,label\n1,1\n2,1\n").unwrap_err();
        assert!(matches!(err, TrainingError::NotBinary { found: 1 }));
    }

    #[test]
    fn test_three_classes_is_not_binary() {
        let err = fit("a,label\n1,0\n2,1\n3,2\n").unwrap_err();
        assert!(matches!(err, TrainingError::NotBinary { found: 3 }));
    }

    #[test]
    fn test_non_numeric_feature() {
        let err = fit("machine,label\nm1,0\nm2,1\n").unwrap_err();
        assert!(matches!(err, TrainingError::NonNumericFeature(name) if name == "machine"));
    }

    #[test]
    fn test_missing_label_column() {
        let err = fit("a,b\n1,0\n2,1\n").unwrap_err();
        assert!(matches!(err, TrainingError::MissingLabelColumn(name) if name == "label"));
    }

    #[test]
    fn test_label_only_has_no_features() {
        assert!(matches!(fit("label\n0\n1\n").unwrap_err(), TrainingError::NoFeatures));
    }

    #[test]
    fn test_header_only_is_empty() {
        assert!(matches!(fit("a,label\n").unwrap_err(), TrainingError::EmptyDataset));
    }

    #[test]
    fn test_run_training_job_persists_and_reports() {
        let repo = InMemoryModelRepository::new();
        let sink = RecordingSink::default();
        let job = TrainingJobSpec::default();

        let manifest = run_training_job(
            &ForestTrainer,
            &dataset("feature1,feature2,label\n1,2,0\n3,4,1\n5,6,1\n"),
            &job,
            &repo,
            &sink,
        )
        .unwrap();

        assert_eq!(manifest.job_id, job.job_id);
        assert_eq!(repo.load().unwrap().unwrap().manifest, manifest);

        let events = sink.0.lock().unwrap();
        assert!(matches!(events.first(), Some(ProgressEvent::Started { .. })));
        assert!(matches!(events.last(), Some(ProgressEvent::Finished { .. })));
        let steps = events.iter().filter(|e| matches!(e, ProgressEvent::Step { .. })).count();
        assert_eq!(steps, 100);
    }

    #[test]
    fn test_failed_fit_keeps_previous_model() {
        let repo = InMemoryModelRepository::new();
        let first = run_training_job(
            &ForestTrainer,
            &dataset("a,label\n1,0\n2,1\n"),
            &TrainingJobSpec::default(),
            &repo,
            &NullProgressSink,
        )
        .unwrap();

        let result = run_training_job(
            &ForestTrainer,
            &dataset("a,label\n1,0\n2,0\n"),
            &TrainingJobSpec::default(),
            &repo,
            &NullProgressSink,
        );
        assert!(result.is_err());
        assert_eq!(repo.load().unwrap().unwrap().manifest.job_id, first.job_id);
    }

    #[test]
    fn test_failed_run_reports_failure_event() {
        let sink = RecordingSink::default();
        let result = run_training_job(
            &ForestTrainer,
            &dataset("a,label\n1,0\n2,0\n"),
            &TrainingJobSpec::default(),
            &InMemoryModelRepository::new(),
            &sink,
        );
        assert!(result.is_err());

        let events = sink.0.lock().unwrap();
        assert!(matches!(events.last(), Some(ProgressEvent::Failed { error, .. }) if error.contains("exactly two classes")));
        assert!(!events.iter().any(|e| matches!(e, ProgressEvent::Finished { .. })));
    }
}
