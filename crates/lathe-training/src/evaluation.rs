//! Scoring a labeled test set against the model slot and drawing its ROC curve.

use crate::dataset::{Dataset, SplitError};
use crate::error::EvaluationError;
use crate::registry::ModelRepository;
use serde::{Deserialize, Serialize};
use serde_json::json;

impl From<SplitError> for EvaluationError {
    fn from(err: SplitError) -> Self {
        match err {
            SplitError::MissingLabel(name) => Self::MissingLabelColumn(name),
            SplitError::NonNumeric(name) => Self::NonNumericFeature(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RocPoint {
    pub fpr: f64,
    pub tpr: f64,
    /// Score threshold that produced the point. `None` for the fixed endpoints.
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocCurveResult {
    pub points: Vec<RocPoint>,
    pub auc: f64,
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
}

impl RocCurveResult {
    /// Plotly-compatible figure: one scatter trace plus titled axes.
    #[must_use]
    pub fn to_plot_spec(&self) -> serde_json::Value {
        let x: Vec<f64> = self.points.iter().map(|p| p.fpr).collect();
        let y: Vec<f64> = self.points.iter().map(|p| p.tpr).collect();
        json!({
            "data": [{ "type": "scatter", "mode": "lines", "x": x, "y": y }],
            "layout": {
                "title": self.title,
                "xaxis": { "title": self.x_axis_title },
                "yaxis": { "title": self.y_axis_title },
            },
        })
    }
}

/// ROC curve over `scores` for binary `truth`.
///
/// Thresholds are the distinct scores in descending order. The curve starts at
/// (0,0) and ends at (1,1). Both classes must be present.
pub fn roc_curve(scores: &[f64], truth: &[bool]) -> Result<RocCurveResult, EvaluationError> {
    let positives = truth.iter().filter(|&&t| t).count();
    let negatives = truth.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(EvaluationError::SingleClass);
    }

    let mut ranked: Vec<(f64, bool)> = scores.iter().copied().zip(truth.iter().copied()).collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut points = vec![RocPoint { fpr: 0.0, tpr: 0.0, threshold: None }];
    let (mut tp, mut fp) = (0usize, 0usize);

    for (idx, &(score, positive)) in ranked.iter().enumerate() {
        if positive {
            tp += 1;
        } else {
            fp += 1;
        }
        let last_of_threshold = ranked.get(idx + 1).is_none_or(|next| next.0 != score);
        if last_of_threshold {
            points.push(RocPoint {
                fpr: fp as f64 / negatives as f64,
                tpr: tp as f64 / positives as f64,
                threshold: Some(score),
            });
        }
    }

    if points.last().is_none_or(|p| p.fpr < 1.0 || p.tpr < 1.0) {
        points.push(RocPoint { fpr: 1.0, tpr: 1.0, threshold: None });
    }

    let auc: f64 = points.windows(2).map(|w| (w[1].fpr - w[0].fpr) * (w[1].tpr + w[0].tpr) / 2.0).sum();

    Ok(RocCurveResult {
        points,
        auc,
        title: "ROC curve".to_string(),
        x_axis_title: "FPR".to_string(),
        y_axis_title: "TPR".to_string(),
    })
}

/// Load the model slot, score `dataset` and build its ROC curve.
///
/// Test features must carry exactly the trained feature names; column order may differ.
pub fn evaluate(repository: &dyn ModelRepository, dataset: &Dataset) -> Result<RocCurveResult, EvaluationError> {
    let artifact = repository.load()?.ok_or(EvaluationError::ModelNotFound)?;
    let manifest = &artifact.manifest;

    let data = dataset.split_label(&manifest.label_column)?;
    let features = data.features.reordered(&manifest.feature_names).ok_or_else(|| EvaluationError::FeatureMismatch {
        expected: manifest.feature_names.clone(),
        found: data.features.names.clone(),
    })?;
    if data.labels.is_empty() {
        return Err(EvaluationError::EmptyDataset);
    }

    let mut truth = Vec::with_capacity(data.labels.len());
    for label in &data.labels {
        let class = manifest.class_index(label).ok_or_else(|| EvaluationError::UnknownLabel {
            label: label.clone(),
            classes: manifest.classes.clone(),
        })?;
        truth.push(class == 1);
    }

    let scores: Vec<f64> = features.rows.iter().map(|row| artifact.score(row)).collect();
    let curve = roc_curve(&scores, &truth)?;

    tracing::info!(
        job_id = %manifest.job_id,
        dataset_id = %dataset.id(),
        rows = scores.len(),
        auc = curve.auc,
        "evaluated test data"
    );
    Ok(curve)
}
