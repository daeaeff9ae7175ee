//! Watch command implementation.

use super::status::describe;
use anyhow::Result;
use colored::Colorize;
use lathe_core::{Dashboard, TrainingStatus};

/// Print every status change until Ctrl-C, or until trained with `until_trained`.
pub async fn execute(dashboard: &Dashboard, until_trained: bool) -> Result<()> {
    let poller = dashboard.status_poller();
    tracing::debug!(interval_ms = poller.interval().as_millis() as u64, "watching training status");
    let mut watch = poller.spawn();

    loop {
        tokio::select! {
            next = watch.changed() => {
                let Some(status) = next else {
                    anyhow::bail!("Status poller stopped");
                };
                println!("{}", describe(status));
                if until_trained && status == TrainingStatus::Trained {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("{}", "Stopped watching".dimmed());
                break;
            }
        }
    }
    Ok(())
}
