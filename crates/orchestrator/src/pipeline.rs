//! Whole-run entry points used by the command line.

use crate::aggregate::{AggregateRecord, AggregationSummary, ResultAggregator};
use crate::report;
use crate::runner::{Collaborators, StageReport, StageRunner};
use crate::Result;
use softad_common::{MediaFile, PipelineConfig};
use softad_ingestion::FileCatalog;
use softad_metadata::{fetch_publish_dates, FetchReport, MetadataClient};
use softad_storage::{CleanupOutcome, Stage, StageStatus, StageStore};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{info, warn};

/// Result of a full run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub catalog_size: usize,
    pub undersized: usize,
    /// Videos skipped because an earlier path already holds their identity
    pub duplicates: usize,
    pub stages: Vec<StageReport>,
    pub summary: AggregationSummary,
    pub summary_path: PathBuf,
}

impl RunReport {
    #[must_use]
    pub fn failures(&self) -> usize {
        self.stages.iter().map(|stage| stage.failed.len()).sum()
    }
}

/// Stage status of one catalog file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    pub file: MediaFile,
    pub audio: StageStatus,
    pub transcript: StageStatus,
    pub analysis: StageStatus,
}

/// Result of an under-threshold cleanup
#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    pub undersized: Vec<MediaFile>,
    pub retained: usize,
    /// Undersized videos left alone because a retained video has the same identity
    pub shared: Vec<MediaFile>,
    pub outcome: CleanupOutcome,
}

pub struct Pipeline {
    config: PipelineConfig,
    catalog: FileCatalog,
    store: StageStore,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        let catalog = FileCatalog::from_config(&config);
        let store = StageStore::from_config(&config);
        Self {
            config,
            catalog,
            store,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &StageStore {
        &self.store
    }

    /// All stages, then aggregation, localization and the summary CSV
    pub fn run(&self, collaborators: &Collaborators) -> Result<RunReport> {
        let scan = self.catalog.scan()?;
        self.store.ensure_layout()?;

        if self.config.force {
            info!("Force mode: existing artifacts will be regenerated");
        }

        let runner = StageRunner::new(&self.store, collaborators)
            .with_force(self.config.force)
            .with_language(self.config.language.clone());
        let stages = Stage::ALL
            .iter()
            .map(|stage| runner.run_stage(*stage, &scan.files))
            .collect();

        let (_, summary) = self.summarize(&scan.files)?;

        Ok(RunReport {
            catalog_size: scan.files.len(),
            undersized: scan.undersized.len(),
            duplicates: scan.duplicates.len(),
            stages,
            summary,
            summary_path: self.store.summary_csv_path(),
        })
    }

    /// Aggregate, localize and write the summary for the given files
    pub fn summarize(&self, files: &[MediaFile]) -> Result<(Vec<AggregateRecord>, AggregationSummary)> {
        info!("=== Aggregation ===");
        let index = self.store.load_publish_index();
        let aggregator = ResultAggregator::new(&self.store);
        let mut records = aggregator.aggregate(files, &index);

        info!("=== Localization ===");
        aggregator.localize(&mut records);

        report::write_summary(&self.store.summary_csv_path(), &records)?;
        let summary = AggregationSummary::from_records(&records);
        summary.log();
        Ok((records, summary))
    }

    /// Probe every stage for every catalog file without running anything
    pub fn status(&self) -> Result<Vec<StatusRow>> {
        let scan = self.catalog.scan()?;
        Ok(scan
            .files
            .into_iter()
            .map(|file| StatusRow {
                audio: self.store.status(&file, Stage::Audio),
                transcript: self.store.status(&file, Stage::Transcript),
                analysis: self.store.status(&file, Stage::Analysis),
                file,
            })
            .collect())
    }

    /// Remove downstream artifacts of videos below the size threshold
    pub fn clean_undersized(&self, dry_run: bool) -> Result<CleanReport> {
        let scan = self.catalog.scan()?;
        info!(
            "{} videos below threshold, {} at or above",
            scan.undersized.len(),
            scan.files.len()
        );

        // Artifacts are keyed by identity, so a retained namesake owns them
        let retained: HashSet<&str> = scan
            .files
            .iter()
            .map(|file| file.identity.as_str())
            .collect();
        let (shared, removable): (Vec<MediaFile>, Vec<MediaFile>) = scan
            .undersized
            .iter()
            .cloned()
            .partition(|file| retained.contains(file.identity.as_str()));
        for file in &shared {
            warn!(
                "{}: identity also used by a retained video, keeping its artifacts",
                file.path.display()
            );
        }

        let outcome = self.store.remove_artifacts(&removable, dry_run);
        Ok(CleanReport {
            retained: scan.files.len(),
            undersized: scan.undersized,
            shared,
            outcome,
        })
    }

    /// Look up publish dates for the catalog and write `published.json`
    pub fn fetch_dates(&self, client: &dyn MetadataClient) -> Result<FetchReport> {
        let scan = self.catalog.scan()?;
        let report = fetch_publish_dates(client, &scan.files, self.config.metadata_delay());
        let path = self.store.save_publish_index(&report.index)?;
        info!(
            "Fetched {} of {} publish dates into {}",
            report.succeeded(),
            report.requested,
            path.display()
        );
        Ok(report)
    }

    /// Rows of the last written summary
    pub fn load_summary(&self) -> Result<Vec<AggregateRecord>> {
        report::read_summary(&self.store.summary_csv_path())
    }
}
