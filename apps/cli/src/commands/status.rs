//! Status command implementation.

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use lathe_core::{Dashboard, TrainingStatus};
use serde_json::json;

/// Human-readable line for a status, as the dashboard shows it.
pub fn describe(status: TrainingStatus) -> ColoredString {
    match status {
        TrainingStatus::Empty => "No training data".yellow(),
        TrainingStatus::Training => "Training...".cyan(),
        TrainingStatus::Trained => "Training done!".green(),
    }
}

pub async fn execute(dashboard: &Dashboard, json_output: bool) -> Result<()> {
    let status = dashboard.poll_training_status().context("Failed to read training status")?;

    if json_output {
        let out = json!({
            "status": status,
            "token": status.as_token(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", describe(status));
    }
    Ok(())
}
