//! Transcription module
//!
//! Provides the transcript data model, the speech-to-text collaborator
//! contract, and the backends that implement it:
//! - [`WhisperCli`]: runs the `whisper` command-line tool and reads its JSON output
//! - `WhisperCppTranscriber` (feature `whisper`): in-process whisper.cpp

pub mod whisper_cli;
#[cfg(feature = "whisper")]
pub mod whisper_cpp;

pub use whisper_cli::WhisperCli;
#[cfg(feature = "whisper")]
pub use whisper_cpp::WhisperCppTranscriber;

use serde::{Deserialize, Serialize};
use softad_common::ProcessingError;
use std::path::Path;
use thiserror::Error;

/// Transcription errors
#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("Failed to load model: {0}")]
    ModelLoadError(String),

    #[error("Failed to load audio: {0}")]
    AudioLoadError(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Invalid transcript: {0}")]
    InvalidTranscript(String),

    #[error("Processing error: {0}")]
    ProcessingError(#[from] ProcessingError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TranscriptionError>;

/// Transcript segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Segment start time in seconds
    #[serde(default)]
    pub start: f64,
    /// Segment end time in seconds
    #[serde(default)]
    pub end: f64,
    /// Segment text
    #[serde(default)]
    pub text: String,
}

/// Complete transcript: full text plus time-stamped segments ordered by start
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Full transcribed text
    #[serde(default)]
    pub text: String,
    pub segments: Vec<TranscriptSegment>,
    /// Detected or requested language code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Transcript {
    /// Parse a transcript from JSON; extra fields written by other tools are ignored
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Get total duration
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.segments.last().map_or(0.0, |s| s.end)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.text.trim().is_empty()
    }
}

/// Speech-to-text collaborator contract: `(audio_path, language_hint) -> transcript`
pub trait SpeechToText {
    fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<Transcript>;
}

/// Load a persisted transcript
pub fn load_transcript(path: &Path) -> Result<Transcript> {
    let contents = std::fs::read_to_string(path)?;
    Transcript::from_json_str(&contents)
}
