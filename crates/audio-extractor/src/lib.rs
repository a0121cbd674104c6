/// Audio extraction module
///
/// Converts a video into the 16kHz mono 16-bit PCM WAV consumed by speech-to-text.
/// The conversion itself is delegated to an external transcoder behind the
/// [`Transcoder`] trait; [`FfmpegTranscoder`] drives the `ffmpeg` CLI.
use softad_common::{ProcessingError, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Audio extraction configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioConfig {
    /// Target sample rate
    pub sample_rate: u32,
    /// Number of channels (1 for mono)
    pub channels: u8,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
        }
    }
}

/// External audio transcoder contract: `(input, output) -> success | failure`.
///
/// Implementations must write 16kHz mono PCM WAV to `output_path`.
pub trait Transcoder {
    fn extract(&self, input_path: &Path, output_path: &Path) -> Result<()>;
}

/// Transcoder backed by the `ffmpeg` command-line tool
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    binary: OsString,
    config: AudioConfig,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new(AudioConfig::default())
    }
}

impl FfmpegTranscoder {
    #[must_use]
    pub fn new(config: AudioConfig) -> Self {
        Self {
            binary: OsString::from("ffmpeg"),
            config,
        }
    }

    /// Use a specific ffmpeg executable instead of the one on `PATH`
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<OsString>) -> Self {
        self.binary = binary.into();
        self
    }

    #[must_use]
    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    fn build_command(&self, input_path: &Path, output_path: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-y")
            .arg("-i")
            .arg(input_path)
            .arg("-vn") // No video
            .arg("-acodec")
            .arg("pcm_s16le")
            .arg("-ar")
            .arg(self.config.sample_rate.to_string())
            .arg("-ac")
            .arg(self.config.channels.to_string());

        // Output names may not end in .wav (partial files), so force the muxer
        cmd.arg("-f").arg("wav").arg(output_path);
        cmd
    }
}

impl Transcoder for FfmpegTranscoder {
    fn extract(&self, input_path: &Path, output_path: &Path) -> Result<()> {
        if !input_path.is_file() {
            return Err(ProcessingError::InvalidPath(format!(
                "Input video not found: {}",
                input_path.display()
            )));
        }

        let mut cmd = self.build_command(input_path, output_path);
        debug!("Running {:?}", cmd);

        let output = cmd
            .output()
            .map_err(|e| ProcessingError::FFmpegError(format!("Failed to execute FFmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProcessingError::FFmpegError(format!(
                "FFmpeg failed ({}): {}",
                output.status,
                stderr.trim()
            )));
        }

        if !output_path.exists() {
            return Err(ProcessingError::FFmpegError(
                "Output file was not created".to_string(),
            ));
        }

        Ok(())
    }
}
