//! Under-threshold artifact cleanup

use super::DirArgs;
use anyhow::{Context as _, Result};
use clap::Args;
use softad_common::PipelineConfig;
use softad_orchestrator::Pipeline;

#[derive(Args)]
pub struct CleanCommand {
    #[command(flatten)]
    dirs: DirArgs,

    /// Only print the files that would be removed
    #[arg(short = 'n', long)]
    dry_run: bool,
}

impl CleanCommand {
    pub fn execute(self, mut config: PipelineConfig) -> Result<()> {
        self.dirs.apply(&mut config);
        let threshold_mb = config.min_size_bytes as f64 / (1024.0 * 1024.0);

        let pipeline = Pipeline::new(config);
        let report = pipeline
            .clean_undersized(self.dry_run)
            .context("Cleanup failed")?;

        println!("Below {threshold_mb:.1}MB: {}", report.undersized.len());
        println!("At or above {threshold_mb:.1}MB: {}", report.retained);

        if report.undersized.is_empty() {
            println!("Nothing to clean");
            return Ok(());
        }

        println!();
        for file in &report.undersized {
            println!("  {} ({:.1}MB)", file.file_name(), file.size_mb());
        }
        println!();

        for file in &report.shared {
            println!("kept (name shared with a retained video): {}", file.path.display());
        }

        if self.dry_run {
            for path in &report.outcome.removed {
                println!("would remove: {}", path.display());
            }
            println!("{} files would be removed", report.outcome.removed.len());
        } else {
            println!("Removed {} files", report.outcome.removed.len());
            for (path, reason) in &report.outcome.failed {
                println!("  failed: {} ({reason})", path.display());
            }
        }

        Ok(())
    }
}
