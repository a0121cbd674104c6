//! File-addressed artifact store rooted at the output directory.

use crate::status::{probe_analysis, probe_audio, probe_transcript};
use crate::{AnalysisArtifact, Stage, StageStatus, StorageError, StorageResult};
use serde::Serialize;
use softad_common::{MediaFile, PipelineConfig, PublishIndex};
use softad_transcription::Transcript;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const AUDIO_DIR: &str = "audio";
const TRANSCRIPT_DIR: &str = "transcript";
const ANALYSIS_DIR: &str = "analysis";
const SUMMARY_CSV: &str = "ads_summary.csv";
const PUBLISHED_JSON: &str = "published.json";

#[derive(Debug, Clone)]
pub struct StageStore {
    root: PathBuf,
}

impl StageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.output_dir)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the per-stage directories
    pub fn ensure_layout(&self) -> StorageResult<()> {
        for dir in [self.audio_dir(), self.transcript_dir(), self.analysis_dir()] {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn audio_dir(&self) -> PathBuf {
        self.root.join(AUDIO_DIR)
    }

    #[must_use]
    pub fn transcript_dir(&self) -> PathBuf {
        self.root.join(TRANSCRIPT_DIR)
    }

    #[must_use]
    pub fn analysis_dir(&self) -> PathBuf {
        self.root.join(ANALYSIS_DIR)
    }

    #[must_use]
    pub fn audio_path(&self, file: &MediaFile) -> PathBuf {
        self.audio_dir().join(format!("{}.wav", file.identity))
    }

    #[must_use]
    pub fn transcript_path(&self, file: &MediaFile) -> PathBuf {
        self.transcript_path_for(&file.identity)
    }

    #[must_use]
    pub fn transcript_path_for(&self, identity: &str) -> PathBuf {
        self.transcript_dir().join(format!("{identity}.json"))
    }

    #[must_use]
    pub fn analysis_path(&self, file: &MediaFile) -> PathBuf {
        self.analysis_dir()
            .join(format!("{}_analysis.json", file.identity))
    }

    #[must_use]
    pub fn artifact_path(&self, file: &MediaFile, stage: Stage) -> PathBuf {
        match stage {
            Stage::Audio => self.audio_path(file),
            Stage::Transcript => self.transcript_path(file),
            Stage::Analysis => self.analysis_path(file),
        }
    }

    #[must_use]
    pub fn summary_csv_path(&self) -> PathBuf {
        self.root.join(SUMMARY_CSV)
    }

    #[must_use]
    pub fn published_path(&self) -> PathBuf {
        self.root.join(PUBLISHED_JSON)
    }

    /// Hidden sibling that receives a write before it is renamed into place
    #[must_use]
    pub fn partial_path(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{name}.partial"))
    }

    /// Probe the artifact of `stage` for `file`
    #[must_use]
    pub fn status(&self, file: &MediaFile, stage: Stage) -> StageStatus {
        let path = self.artifact_path(file, stage);
        match stage {
            Stage::Audio => probe_audio(&path),
            Stage::Transcript => probe_transcript(&path),
            Stage::Analysis => probe_analysis(&path),
        }
    }

    /// Write bytes through a partial file and rename into place
    pub fn write_atomic(path: &Path, bytes: &[u8]) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let partial = Self::partial_path(path);
        std::fs::write(&partial, bytes)?;
        Self::commit_partial(&partial, path)
    }

    /// Rename a finished partial file over its final path
    pub fn commit_partial(partial: &Path, path: &Path) -> StorageResult<()> {
        std::fs::rename(partial, path)?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    /// Serialize as pretty JSON and write atomically
    pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        Self::write_atomic(path, &bytes)
    }

    pub fn save_transcript(&self, file: &MediaFile, transcript: &Transcript) -> StorageResult<PathBuf> {
        let path = self.transcript_path(file);
        Self::write_json_atomic(&path, transcript)?;
        Ok(path)
    }

    /// Load the persisted transcript for a file
    pub fn load_transcript(&self, file: &MediaFile) -> StorageResult<Transcript> {
        self.load_transcript_for(&file.identity)
    }

    pub fn load_transcript_for(&self, identity: &str) -> StorageResult<Transcript> {
        let path = self.transcript_path_for(identity);
        if !path.exists() {
            return Err(StorageError::NotFound(path.display().to_string()));
        }
        Ok(softad_transcription::load_transcript(&path)?)
    }

    pub fn save_analysis(&self, file: &MediaFile, artifact: &AnalysisArtifact) -> StorageResult<PathBuf> {
        let path = self.analysis_path(file);
        Self::write_json_atomic(&path, artifact)?;
        Ok(path)
    }

    pub fn load_analysis(&self, file: &MediaFile) -> StorageResult<AnalysisArtifact> {
        let path = self.analysis_path(file);
        if !path.exists() {
            return Err(StorageError::NotFound(path.display().to_string()));
        }
        let contents = std::fs::read(&path)?;
        serde_json::from_slice(&contents).map_err(|e| StorageError::InvalidArtifact {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Record the publish date in the analysis artifact.
    ///
    /// Returns `false` without touching the file when the same date is already stored.
    pub fn patch_publish_date(&self, file: &MediaFile, publish_date: &str) -> StorageResult<bool> {
        let mut artifact = self.load_analysis(file)?;
        if artifact.publish_date.as_deref() == Some(publish_date) {
            return Ok(false);
        }
        artifact.publish_date = Some(publish_date.to_string());
        self.save_analysis(file, &artifact)?;
        Ok(true)
    }

    /// Load `published.json`; a missing or unreadable index yields an empty one
    #[must_use]
    pub fn load_publish_index(&self) -> PublishIndex {
        let path = self.published_path();
        if !path.exists() {
            warn!("Publish date index not found, dates will be empty: {}", path.display());
            return PublishIndex::new();
        }

        let parsed = std::fs::read(&path)
            .map_err(StorageError::from)
            .and_then(|bytes| serde_json::from_slice(&bytes).map_err(StorageError::from));
        match parsed {
            Ok(index) => index,
            Err(e) => {
                warn!("Failed to read publish date index {}: {}", path.display(), e);
                PublishIndex::new()
            }
        }
    }

    pub fn save_publish_index(&self, index: &PublishIndex) -> StorageResult<PathBuf> {
        let path = self.published_path();
        Self::write_json_atomic(&path, index)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(identity: &str) -> MediaFile {
        MediaFile::new(format!("/videos/{identity}.mp4"), 6 * 1024 * 1024).unwrap()
    }

    #[test]
    fn test_artifact_paths() {
        let store = StageStore::new("/out");
        let file = media("[BV1xx] vlog");
        assert_eq!(store.audio_path(&file), PathBuf::from("/out/audio/[BV1xx] vlog.wav"));
        assert_eq!(
            store.transcript_path(&file),
            PathBuf::from("/out/transcript/[BV1xx] vlog.json")
        );
        assert_eq!(
            store.analysis_path(&file),
            PathBuf::from("/out/analysis/[BV1xx] vlog_analysis.json")
        );
        assert_eq!(store.summary_csv_path(), PathBuf::from("/out/ads_summary.csv"));
        assert_eq!(store.published_path(), PathBuf::from("/out/published.json"));
    }

    #[test]
    fn test_partial_path_is_hidden_sibling() {
        assert_eq!(
            StageStore::partial_path(Path::new("/out/audio/a.wav")),
            PathBuf::from("/out/audio/.a.wav.partial")
        );
    }
}
