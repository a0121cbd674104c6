//! Pipeline configuration, threaded explicitly through every component.

use crate::{ProcessingError, Result, DEFAULT_VIDEO_EXTENSIONS, MIN_VIDEO_SIZE_BYTES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default reasoning endpoint (Ollama generate API)
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/api/generate";

/// Default reasoning model
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2:7b-instruct";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory scanned (recursively) for videos
    pub video_dir: PathBuf,

    /// Root of all persisted artifacts (`audio/`, `transcript/`, `analysis/`, ...)
    pub output_dir: PathBuf,

    /// Videos smaller than this are excluded from the catalog
    pub min_size_bytes: u64,

    /// Accepted video extensions, matched case-insensitively, without the dot
    pub extensions: Vec<String>,

    /// Treat every artifact as absent and rerun all stages
    pub force: bool,

    /// Language hint passed to speech-to-text
    pub language: String,

    /// Whisper model name (CLI backend) or model file path (whisper.cpp backend)
    pub whisper_model: String,

    pub ollama_url: String,
    pub ollama_model: String,

    /// Reasoning request timeout in seconds
    pub reasoning_timeout_secs: u64,

    /// Delay between metadata lookups in milliseconds
    pub metadata_delay_ms: u64,

    /// Metadata request timeout in seconds
    pub metadata_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            video_dir: PathBuf::from("videos"),
            output_dir: PathBuf::from("output"),
            min_size_bytes: MIN_VIDEO_SIZE_BYTES,
            extensions: DEFAULT_VIDEO_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            force: false,
            language: "zh".to_string(),
            whisper_model: "base".to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            reasoning_timeout_secs: 300,
            metadata_delay_ms: 1000,
            metadata_timeout_secs: 10,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents).map_err(|e| {
            ProcessingError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.extensions.is_empty() {
            return Err(ProcessingError::Config(
                "extensions must not be empty".to_string(),
            ));
        }

        if self.extensions.iter().any(|ext| ext.starts_with('.')) {
            return Err(ProcessingError::Config(
                "extensions are given without the leading dot".to_string(),
            ));
        }

        if self.reasoning_timeout_secs == 0 {
            return Err(ProcessingError::Config(
                "reasoning_timeout_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }

    #[must_use]
    pub fn reasoning_timeout(&self) -> Duration {
        Duration::from_secs(self.reasoning_timeout_secs)
    }

    #[must_use]
    pub fn metadata_delay(&self) -> Duration {
        Duration::from_millis(self.metadata_delay_ms)
    }

    #[must_use]
    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout_secs)
    }
}
