//! Lathe CLI - command-line front end for the Lathe dashboard
//!
//! Provides a `lathe` command that uploads training and test CSV files,
//! reports the training status, and prints ROC curves.

mod commands;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, shells};
use lathe_core::{Dashboard, LatheConfig};
use std::path::PathBuf;

use commands::{evaluate, reset, status, train, watch};

/// Lathe - random forest training dashboard
///
/// Upload a labeled CSV to train a class-balanced random forest, then upload
/// test data to see how well it separates the two classes.
#[derive(Parser, Debug)]
#[command(
    name = "lathe",
    author,
    version,
    about = "Lathe - train a random forest and inspect its ROC curve",
    long_about = "Lathe trains a class-balanced random forest on uploaded CSV data and evaluates it on test data.\nState lives in a data directory so separate invocations share the trained model and status."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Data directory (overrides LATHE_DATA_DIR)
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a model on a labeled CSV file
    ///
    /// The file is sent as a base64 data URI, the same way a browser upload is.
    Train {
        /// CSV file with a header row and a label column
        #[arg(required_unless_present = "data_uri", conflicts_with = "data_uri")]
        file: Option<PathBuf>,

        /// Raw `data:<mime>;base64,<payload>` upload
        #[arg(long)]
        data_uri: Option<String>,

        /// Output the model manifest as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the training status once
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Follow the training status as it changes
    Watch {
        /// Exit once the status reads trained
        #[arg(long)]
        until_trained: bool,

        /// Poll interval in milliseconds (overrides poll_interval_ms)
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Reset the training status to empty
    Reset {
        /// Also delete the trained model
        #[arg(long)]
        purge_model: bool,
    },

    /// Evaluate the trained model on a labeled test CSV file
    Evaluate {
        /// CSV file with the model's feature columns and label column
        file: PathBuf,

        /// Output the plot spec as JSON
        #[arg(long)]
        json: bool,

        /// Write the plot spec to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Handle completion generation
    if let Ok(shell) = std::env::var("LATHE_GENERATE_COMPLETIONS") {
        let mut cmd = Args::command();
        match shell.as_str() {
            "bash" => generate(shells::Bash, &mut cmd, "lathe", &mut std::io::stdout()),
            "zsh" => generate(shells::Zsh, &mut cmd, "lathe", &mut std::io::stdout()),
            "fish" => generate(shells::Fish, &mut cmd, "lathe", &mut std::io::stdout()),
            "powershell" => generate(shells::PowerShell, &mut cmd, "lathe", &mut std::io::stdout()),
            "elvish" => generate(shells::Elvish, &mut cmd, "lathe", &mut std::io::stdout()),
            _ => anyhow::bail!("Unknown shell: {}. Supported: bash, zsh, fish, powershell, elvish", shell),
        }
        return Ok(());
    }

    let args = Args::parse();

    // CLI flags win over env and config files
    let mut config = LatheConfig::discover_and_load().context("Failed to load configuration")?;
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(Command::Watch { interval_ms: Some(ms), .. }) = args.command {
        config.poll_interval_ms = ms;
    }
    config.validate().context("Invalid configuration")?;

    lathe_core::logging::init(&config.log_level, config.log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(());
    };

    let dashboard = Dashboard::open(&config)
        .with_context(|| format!("Failed to open data directory {}", config.data_dir.display()))?;

    match command {
        Command::Train { file, data_uri, json } => {
            train::execute(&dashboard, file, data_uri, json).await?;
        }
        Command::Status { json } => {
            status::execute(&dashboard, json).await?;
        }
        Command::Watch { until_trained, .. } => {
            watch::execute(&dashboard, until_trained).await?;
        }
        Command::Reset { purge_model } => {
            reset::execute(&dashboard, purge_model).await?;
        }
        Command::Evaluate { file, json, output } => {
            evaluate::execute(&dashboard, &file, json, output).await?;
        }
    }

    Ok(())
}
