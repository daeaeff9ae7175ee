//! Reset command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use lathe_core::Dashboard;

pub async fn execute(dashboard: &Dashboard, purge_model: bool) -> Result<()> {
    dashboard.reset_training_status().context("Failed to reset training status")?;

    if purge_model {
        dashboard.purge_model().context("Failed to delete the trained model")?;
        println!("{} Training status reset and model deleted", "✓".green());
    } else {
        println!("{} Training status reset", "✓".green());
    }
    Ok(())
}
