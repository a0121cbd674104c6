//! Per-stage execution over the catalog.

use crate::{PipelineError, Result};
use softad_audio_extractor::Transcoder;
use softad_classifier::{parse_response, AdClassifier};
use softad_common::MediaFile;
use softad_storage::{AnalysisArtifact, Stage, StageStore};
use softad_transcription::SpeechToText;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

/// External tools the stages call out to
pub struct Collaborators {
    pub transcoder: Box<dyn Transcoder>,
    pub speech: Box<dyn SpeechToText>,
    pub classifier: AdClassifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A valid artifact already exists
    AlreadyCompleted,
    /// The artifact this stage consumes is missing or invalid
    UpstreamAbsent,
}

/// What happened to one (file, stage) pair in this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Completed,
    Skipped(SkipReason),
    /// The pair stays absent and is retried on the next run
    Failed(String),
}

impl fmt::Display for StageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageOutcome::Completed => f.write_str("completed"),
            StageOutcome::Skipped(SkipReason::AlreadyCompleted) => f.write_str("skipped (exists)"),
            StageOutcome::Skipped(SkipReason::UpstreamAbsent) => f.write_str("skipped (no input)"),
            StageOutcome::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Counts for one stage pass
#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: Stage,
    pub completed: usize,
    pub skipped_existing: usize,
    pub skipped_upstream: usize,
    /// `(identity, reason)`
    pub failed: Vec<(String, String)>,
}

impl StageReport {
    #[must_use]
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            completed: 0,
            skipped_existing: 0,
            skipped_upstream: 0,
            failed: Vec::new(),
        }
    }

    pub fn record(&mut self, file: &MediaFile, outcome: StageOutcome) {
        match outcome {
            StageOutcome::Completed => self.completed += 1,
            StageOutcome::Skipped(SkipReason::AlreadyCompleted) => self.skipped_existing += 1,
            StageOutcome::Skipped(SkipReason::UpstreamAbsent) => self.skipped_upstream += 1,
            StageOutcome::Failed(reason) => self.failed.push((file.identity.clone(), reason)),
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.completed + self.skipped_existing + self.skipped_upstream + self.failed.len()
    }
}

/// Drives one stage at a time for every catalog entry
pub struct StageRunner<'a> {
    store: &'a StageStore,
    collaborators: &'a Collaborators,
    force: bool,
    language: Option<String>,
}

impl<'a> StageRunner<'a> {
    #[must_use]
    pub fn new(store: &'a StageStore, collaborators: &'a Collaborators) -> Self {
        Self {
            store,
            collaborators,
            force: false,
            language: None,
        }
    }

    /// Treat every artifact as absent
    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        let language = language.into();
        self.language = (!language.trim().is_empty()).then_some(language);
        self
    }

    /// Run `stage` for every file in order. Per-file failures are recorded, never raised.
    pub fn run_stage(&self, stage: Stage, files: &[MediaFile]) -> StageReport {
        info!("=== Stage: {} ({} files) ===", stage, files.len());
        let start = Instant::now();

        let mut report = StageReport::new(stage);
        for file in files {
            let outcome = self.run_one(stage, file);
            report.record(file, outcome);
        }

        info!(
            "Stage {} done in {:.1}s: {} completed, {} already done, {} without input, {} failed",
            stage,
            start.elapsed().as_secs_f64(),
            report.completed,
            report.skipped_existing,
            report.skipped_upstream,
            report.failed.len()
        );
        report
    }

    /// Decide and execute a single (file, stage) pair
    pub fn run_one(&self, stage: Stage, file: &MediaFile) -> StageOutcome {
        if let Some(upstream) = stage.upstream() {
            if !self.store.status(file, upstream).is_completed() {
                info!("{}: {} missing, skipping {}", file.identity, upstream, stage);
                return StageOutcome::Skipped(SkipReason::UpstreamAbsent);
            }
        }

        if !self.force && self.store.status(file, stage).is_completed() {
            info!("{}: {} already completed, skipping", file.identity, stage);
            return StageOutcome::Skipped(SkipReason::AlreadyCompleted);
        }

        let start = Instant::now();
        match self.execute(stage, file) {
            Ok(()) => {
                info!(
                    "{}: {} completed in {:.1}s",
                    file.identity,
                    stage,
                    start.elapsed().as_secs_f64()
                );
                StageOutcome::Completed
            }
            Err(e) => {
                warn!("{}: {} failed: {}", file.identity, stage, e);
                StageOutcome::Failed(e.to_string())
            }
        }
    }

    fn execute(&self, stage: Stage, file: &MediaFile) -> Result<()> {
        match stage {
            Stage::Audio => self.extract_audio(file),
            Stage::Transcript => self.transcribe(file),
            Stage::Analysis => self.analyze(file),
        }
    }

    fn extract_audio(&self, file: &MediaFile) -> Result<()> {
        let path = self.store.audio_path(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let partial = StageStore::partial_path(&path);
        if let Err(e) = self.collaborators.transcoder.extract(&file.path, &partial) {
            if partial.exists() {
                if let Err(remove_err) = std::fs::remove_file(&partial) {
                    debug!("Could not remove {}: {}", partial.display(), remove_err);
                }
            }
            return Err(e.into());
        }

        StageStore::commit_partial(&partial, &path)?;
        Ok(())
    }

    fn transcribe(&self, file: &MediaFile) -> Result<()> {
        let audio = self.store.audio_path(file);
        let transcript = self
            .collaborators
            .speech
            .transcribe(&audio, self.language.as_deref())?;
        debug!(
            "{}: {} segments, {:.1}s of speech",
            file.identity,
            transcript.segments.len(),
            transcript.duration()
        );
        self.store.save_transcript(file, &transcript)?;
        Ok(())
    }

    fn analyze(&self, file: &MediaFile) -> Result<()> {
        let transcript = self.store.load_transcript(file)?;
        let previous = self.store.load_analysis(file).ok();
        let keep_previous = previous.as_ref().is_some_and(AnalysisArtifact::has_result);

        let mut artifact = AnalysisArtifact {
            transcript_path: self.store.transcript_path(file).display().to_string(),
            analysis_result: None,
            segments: transcript.segments.clone(),
            publish_date: previous.and_then(|p| p.publish_date),
            extra: serde_json::Map::new(),
        };

        let raw = match self.collaborators.classifier.request(&transcript) {
            Ok(raw) if !raw.trim().is_empty() => raw,
            outcome => {
                // Record the attempt unless a usable result would be overwritten
                if !keep_previous {
                    artifact.analysis_result = outcome.as_ref().ok().cloned();
                    self.store.save_analysis(file, &artifact)?;
                }
                return Err(match outcome {
                    Ok(_) => PipelineError::EmptyResponse,
                    Err(e) => e.into(),
                });
            }
        };

        let classification = parse_response(&raw);
        debug!(
            "{}: is_ad={} type={} confidence={:.2}",
            file.identity, classification.is_ad, classification.ad_type, classification.confidence
        );

        artifact
            .extra
            .insert("classification".to_string(), serde_json::to_value(&classification)?);
        artifact.analysis_result = Some(raw);
        self.store.save_analysis(file, &artifact)?;
        Ok(())
    }
}
