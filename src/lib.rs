//! softad - soft advertising detection for video folders
//!
//! Re-exports the pipeline crates under one name. The `softad` binary lives
//! in `crates/cli`.

pub use softad_audio_extractor as audio_extractor;
pub use softad_classifier as classifier;
pub use softad_common as common;
pub use softad_ingestion as ingestion;
pub use softad_localizer as localizer;
pub use softad_metadata as metadata;
pub use softad_orchestrator as orchestrator;
pub use softad_storage as storage;
pub use softad_transcription as transcription;

pub use softad_common::PipelineConfig;
pub use softad_orchestrator::{Collaborators, Pipeline};
