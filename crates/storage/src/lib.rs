//! Stage artifact storage
//!
//! Every stage of the pipeline persists one file-addressed artifact per video
//! under the output root:
//!
//! | Stage | Artifact |
//! |-------|----------|
//! | audio | `audio/<id>.wav` |
//! | transcript | `transcript/<id>.json` |
//! | analysis | `analysis/<id>_analysis.json` |
//!
//! The artifacts double as the job ledger: [`StageStore::status`] probes the
//! expected path and reports a stage as completed only when the file is
//! structurally valid for that stage. Writes go through a sibling partial file
//! and a rename, so an interrupted write never looks completed.

use serde::{Deserialize, Serialize};
use softad_transcription::{TranscriptSegment, TranscriptionError};
use std::fmt;
use thiserror::Error;

pub mod maintenance;
pub mod status;
pub mod store;

pub use maintenance::CleanupOutcome;
pub use store::StageStore;

/// Storage layer errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid artifact {path}: {reason}")]
    InvalidArtifact { path: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Transcript error: {0}")]
    Transcript(#[from] TranscriptionError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Pipeline stage owning one artifact per video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Audio,
    Transcript,
    Analysis,
}

impl Stage {
    /// All stages in execution order
    pub const ALL: [Stage; 3] = [Stage::Audio, Stage::Transcript, Stage::Analysis];

    /// Stage whose artifact this stage consumes
    #[must_use]
    pub fn upstream(self) -> Option<Stage> {
        match self {
            Stage::Audio => None,
            Stage::Transcript => Some(Stage::Audio),
            Stage::Analysis => Some(Stage::Transcript),
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Stage::Audio => "audio",
            Stage::Transcript => "transcript",
            Stage::Analysis => "analysis",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per (file, stage) state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Absent,
    Completed,
}

impl StageStatus {
    #[must_use]
    pub fn is_completed(self) -> bool {
        self == StageStatus::Completed
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageStatus::Absent => f.write_str("absent"),
            StageStatus::Completed => f.write_str("completed"),
        }
    }
}

/// Persisted analysis artifact (`analysis/<id>_analysis.json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisArtifact {
    pub transcript_path: String,

    /// Raw reasoning-endpoint output, stored verbatim
    #[serde(default)]
    pub analysis_result: Option<String>,

    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,

    /// Back-filled by aggregation once the publish date is known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,

    /// Fields written by other tools, preserved on rewrite
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AnalysisArtifact {
    /// Raw response text, empty when the endpoint returned nothing
    #[must_use]
    pub fn raw_response(&self) -> &str {
        self.analysis_result.as_deref().unwrap_or_default()
    }

    /// True when the raw response holds non-whitespace text
    #[must_use]
    pub fn has_result(&self) -> bool {
        !self.raw_response().trim().is_empty()
    }
}
