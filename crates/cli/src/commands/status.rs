//! Stage status table

use super::DirArgs;
use anyhow::{Context as _, Result};
use clap::Args;
use softad_common::PipelineConfig;
use softad_orchestrator::Pipeline;

#[derive(Args)]
pub struct StatusCommand {
    #[command(flatten)]
    dirs: DirArgs,
}

impl StatusCommand {
    pub fn execute(self, mut config: PipelineConfig) -> Result<()> {
        self.dirs.apply(&mut config);
        let pipeline = Pipeline::new(config);
        let rows = pipeline.status().context("Failed to scan videos")?;

        println!("{:<10} {:<10} {:<10} VIDEO", "AUDIO", "TRANSCRIPT", "ANALYSIS");
        let mut done = 0;
        for row in &rows {
            if row.analysis.is_completed() {
                done += 1;
            }
            println!(
                "{:<10} {:<10} {:<10} {}",
                row.audio.to_string(),
                row.transcript.to_string(),
                row.analysis.to_string(),
                row.file.identity
            );
        }
        println!();
        println!("{done} of {} videos analyzed", rows.len());

        Ok(())
    }
}
