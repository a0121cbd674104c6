/// Common types and utilities for the soft-ad scanning pipeline
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod config;

pub use config::PipelineConfig;

/// Minimum size of a video worth processing (5 MiB)
pub const MIN_VIDEO_SIZE_BYTES: u64 = 5 * 1024 * 1024;

/// Video extensions scanned when nothing else is configured
pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &["mp4"];

/// Processing errors
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("FFmpeg error: {0}")]
    FFmpegError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for processing operations
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Derive the per-file identity from a path: the base name without extension.
///
/// The identity is the join key between a video and every artifact derived
/// from it (`audio/<id>.wav`, `transcript/<id>.json`, ...).
#[must_use]
pub fn identity_of(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
}

/// A video discovered under the scan root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub identity: String,
}

impl MediaFile {
    /// Build a media file entry, deriving its identity from the path
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64) -> Result<Self> {
        let path = path.into();
        let identity = identity_of(&path).ok_or_else(|| {
            ProcessingError::InvalidPath(format!("No file name in {}", path.display()))
        })?;
        Ok(Self {
            path,
            size_bytes,
            identity,
        })
    }

    /// Base name including extension, as matched against publish records
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.identity.clone())
    }

    #[must_use]
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Publication metadata for one platform video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRecord {
    pub filename: String,
    pub publish_date: NaiveDate,
    #[serde(default)]
    pub title: String,
    /// Duration in seconds as reported by the platform
    #[serde(default)]
    pub duration: u64,
}

/// Publish records keyed by platform video ID (the `published.json` layout)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublishIndex {
    records: BTreeMap<String, PublishRecord>,
}

impl PublishIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for a video ID
    pub fn insert(&mut self, video_id: impl Into<String>, record: PublishRecord) {
        self.records.insert(video_id.into(), record);
    }

    #[must_use]
    pub fn get(&self, video_id: &str) -> Option<&PublishRecord> {
        self.records.get(video_id)
    }

    /// Publish date of the record whose filename matches exactly
    #[must_use]
    pub fn date_for_filename(&self, filename: &str) -> Option<NaiveDate> {
        self.records
            .values()
            .find(|record| record.filename == filename)
            .map(|record| record.publish_date)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PublishRecord)> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_strips_extension() {
        let path = Path::new("/videos/[BV1xx411c7mD] 开箱.mp4");
        assert_eq!(identity_of(path).unwrap(), "[BV1xx411c7mD] 开箱");
        assert_eq!(identity_of(Path::new("/")), None);
    }

    #[test]
    fn test_media_file_accessors() {
        let file = MediaFile::new("/videos/vlog.MP4", 6 * 1024 * 1024).unwrap();
        assert_eq!(file.identity, "vlog");
        assert_eq!(file.file_name(), "vlog.MP4");
        assert!((file.size_mb() - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_publish_index_exact_filename_match() {
        let mut index = PublishIndex::new();
        index.insert(
            "BV1ab",
            PublishRecord {
                filename: "[BV1ab] day.mp4".to_string(),
                publish_date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
                title: "day".to_string(),
                duration: 300,
            },
        );

        assert_eq!(
            index.date_for_filename("[BV1ab] day.mp4"),
            NaiveDate::from_ymd_opt(2024, 3, 9)
        );
        assert_eq!(index.date_for_filename("[BV1ab] day.MP4"), None);
        assert_eq!(index.date_for_filename("day.mp4"), None);
    }

    #[test]
    fn test_publish_index_json_layout() {
        let json = r#"{"BV1ab":{"filename":"a.mp4","publish_date":"2023-11-02","title":"t","duration":61}}"#;
        let index: PublishIndex = serde_json::from_str(json).unwrap();
        let record = index.get("BV1ab").unwrap();
        assert_eq!(record.filename, "a.mp4");
        assert_eq!(record.duration, 61);
        assert_eq!(
            record.publish_date,
            NaiveDate::from_ymd_opt(2023, 11, 2).unwrap()
        );
    }
}
