//! Publish-date lookup

use super::DirArgs;
use anyhow::{Context as _, Result};
use clap::Args;
use softad_common::PipelineConfig;
use softad_metadata::BilibiliClient;
use softad_orchestrator::Pipeline;

#[derive(Args)]
pub struct FetchDatesCommand {
    #[command(flatten)]
    dirs: DirArgs,

    /// Delay between API requests in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,
}

impl FetchDatesCommand {
    pub fn execute(self, mut config: PipelineConfig) -> Result<()> {
        self.dirs.apply(&mut config);
        if let Some(delay_ms) = self.delay_ms {
            config.metadata_delay_ms = delay_ms;
        }

        let client = BilibiliClient::new(config.metadata_timeout())
            .context("Failed to create metadata client")?;
        let pipeline = Pipeline::new(config);
        let report = pipeline
            .fetch_dates(&client)
            .context("Failed to fetch publish dates")?;

        println!();
        println!("Video ids found: {}", report.requested);
        println!("Publish dates fetched: {}", report.succeeded());
        if !report.failed.is_empty() {
            println!("Failed:");
            for (video_id, reason) in &report.failed {
                println!("  {video_id}: {reason}");
            }
        }
        if !report.without_id.is_empty() {
            println!("Files without a video id: {}", report.without_id.len());
        }
        println!("Saved to: {}", pipeline.store().published_path().display());

        Ok(())
    }
}
