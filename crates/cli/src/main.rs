//! softad - soft advertising detection for video folders
//!
//! Command-line interface for the extraction, transcription and
//! classification pipeline.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use softad_common::PipelineConfig;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod commands;

use commands::clean::CleanCommand;
use commands::fetch_dates::FetchDatesCommand;
use commands::report::ReportCommand;
use commands::run::RunCommand;
use commands::status::StatusCommand;

#[derive(Parser)]
#[command(
    name = "softad",
    version,
    about = "Find product placements in a folder of videos",
    long_about = "Extracts audio, transcribes speech, asks a language model whether each video\n\
                  carries (soft) advertising, and writes ads_summary.csv with the timestamps\n\
                  where the advertised products are mentioned.\n\n\
                  Every stage skips videos whose artifact already exists, so an interrupted\n\
                  run can simply be started again.",
    after_help = "EXAMPLES:\n  \
                  # Process everything under ./videos\n  \
                  softad run --video-dir ./videos\n\n  \
                  # Fetch publish dates first so they appear in the summary\n  \
                  softad fetch-dates --video-dir ./videos\n\n  \
                  # Regenerate all artifacts\n  \
                  softad run --force\n\n  \
                  # Show what cleanup would delete\n  \
                  softad clean --dry-run"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (missing file means defaults)
    #[arg(short, long, global = true, default_value = "softad.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all stages, aggregate results and localize ads
    Run(RunCommand),

    /// Fetch publish dates from the video platform into published.json
    FetchDates(FetchDatesCommand),

    /// Remove transcript and analysis artifacts of videos below the size threshold
    Clean(CleanCommand),

    /// Show the stage status of every video without running anything
    Status(StatusCommand),

    /// List advertising rows of the last summary with video links
    Report(ReportCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let config = PipelineConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;

    match cli.command {
        Commands::Run(cmd) => cmd.execute(config),
        Commands::FetchDates(cmd) => cmd.execute(config),
        Commands::Clean(cmd) => cmd.execute(config),
        Commands::Status(cmd) => cmd.execute(config),
        Commands::Report(cmd) => cmd.execute(config),
    }
}
