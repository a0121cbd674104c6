//! Pipeline orchestration
//!
//! Runs the stages in order over an immutable catalog snapshot, with a
//! barrier between stages:
//!
//! 1. audio extraction
//! 2. transcription
//! 3. classification
//! 4. aggregation with publish dates
//! 5. timestamp localization
//!
//! Whether a stage runs for a file is decided only by probing its artifact,
//! so an interrupted run resumes where it stopped.

pub mod aggregate;
pub mod pipeline;
pub mod report;
pub mod runner;

pub use aggregate::{AggregateRecord, AggregationSummary, ResultAggregator};
pub use pipeline::{CleanReport, Pipeline, RunReport, StatusRow};
pub use runner::{Collaborators, SkipReason, StageOutcome, StageReport, StageRunner};

use softad_classifier::ClassifierError;
use softad_common::ProcessingError;
use softad_storage::StorageError;
use softad_transcription::TranscriptionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Processing error: {0}")]
    Processing(#[from] ProcessingError),

    #[error("Transcription error: {0}")]
    Transcription(#[from] TranscriptionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Reasoning endpoint returned an empty response")]
    EmptyResponse,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
