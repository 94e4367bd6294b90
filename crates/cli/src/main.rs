//! snap-purge - time-tiered snapshot retention

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

/// Thin out snapshots: keep everything recent, then one per day, week and month
#[derive(Parser)]
#[command(name = "snap-purge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every configured group and delete superseded snapshots
    Run {
        /// Configuration file
        #[arg(short, long, env = "SNAP_PURGE_CONFIG", default_value = "purge.toml")]
        config: PathBuf,
        /// Trigger event JSON file (`-` for stdin)
        #[arg(long)]
        event: Option<PathBuf>,
        /// Reference time (RFC 3339), overrides the event's time
        #[arg(long)]
        now: Option<DateTime<Utc>>,
        /// Report decisions without deleting anything
        #[arg(long)]
        dry_run: bool,
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
        /// Snapshot inventory, overrides the configured one
        #[arg(long)]
        inventory: Option<PathBuf>,
    },
    /// Validate the configuration and show the derived thresholds
    Check {
        /// Configuration file
        #[arg(short, long, env = "SNAP_PURGE_CONFIG", default_value = "purge.toml")]
        config: PathBuf,
        /// Reference time (RFC 3339)
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
    /// Print an example configuration file
    Example,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            event,
            now,
            dry_run,
            json,
            inventory,
        } => {
            let options = cmd::run::RunOptions {
                event,
                now,
                dry_run,
                json,
                inventory,
            };
            cmd::run::run(&config, options).await
        }
        Commands::Check { config, now } => cmd::check::run(&config, now),
        Commands::Example => cmd::example::run(),
    }
}
