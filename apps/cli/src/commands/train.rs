//! Training command implementation.

use super::upload::read_as_data_uri;
use anyhow::{Context, Result};
use colored::Colorize;
use lathe_core::Dashboard;
use std::path::PathBuf;

pub async fn execute(dashboard: &Dashboard, file: Option<PathBuf>, data_uri: Option<String>, json_output: bool) -> Result<()> {
    let (blob, source) = match (file, data_uri) {
        (Some(path), _) => (read_as_data_uri(&path)?, path.display().to_string()),
        (None, Some(blob)) => (blob, "data URI".to_string()),
        (None, None) => anyhow::bail!("Provide a CSV file or --data-uri"),
    };

    if !json_output {
        println!("{} {}", "Training...".cyan(), source.dimmed());
    }

    let manifest = dashboard.submit_training_data(&blob).context("Training failed")?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        return Ok(());
    }

    println!("{}", "Training done!".green().bold());
    println!();
    println!("  Job:            {}", manifest.job_id.to_string().cyan());
    println!("  Dataset:        {}", manifest.dataset_id.to_string().dimmed());
    println!("  Rows:           {}", manifest.metrics.rows);
    println!("  Features:       {}", manifest.feature_names.join(", "));
    println!(
        "  Classes:        {} ({}) / {} ({}, positive)",
        manifest.classes[0], manifest.metrics.class_counts[0], manifest.classes[1], manifest.metrics.class_counts[1]
    );
    println!("  Trees:          {}", manifest.hyperparams.n_estimators);
    println!("  Train accuracy: {:.3}", manifest.metrics.train_accuracy);
    println!();
    Ok(())
}
