//! Evaluate command implementation.

use super::upload::read_as_data_uri;
use anyhow::{Context, Result};
use colored::Colorize;
use lathe_core::Dashboard;
use std::path::{Path, PathBuf};

pub async fn execute(dashboard: &Dashboard, file: &Path, json_output: bool, output: Option<PathBuf>) -> Result<()> {
    let blob = read_as_data_uri(file)?;
    let curve = dashboard.submit_test_data(&blob).context("Evaluation failed")?;
    let spec = curve.to_plot_spec();

    if let Some(ref path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&spec)?)
            .with_context(|| format!("Failed to write plot spec to {}", path.display()))?;
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&spec)?);
        return Ok(());
    }

    println!();
    println!("{}", curve.title.bold().cyan());
    println!();
    println!("  AUC: {}", format!("{:.4}", curve.auc).green());
    println!();
    println!("  {:>8} {:>8} {:>10}", curve.x_axis_title, curve.y_axis_title, "threshold");
    println!("  {}", "─".repeat(28));
    for point in &curve.points {
        let threshold = point.threshold.map_or_else(|| "-".to_string(), |t| format!("{:.4}", t));
        println!("  {:>8.4} {:>8.4} {:>10}", point.fpr, point.tpr, threshold.dimmed());
    }
    println!();

    if let Some(path) = output {
        println!("  Plot spec written to {}", path.display().to_string().dimmed());
    }
    Ok(())
}
