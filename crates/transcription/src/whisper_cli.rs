//! Speech-to-text through the `whisper` command-line tool.
//!
//! The tool is asked for JSON output into a scratch directory; the file it
//! writes (`<audio stem>.json`) has the `{text, segments, language}` layout.

use crate::{SpeechToText, Result, Transcript, TranscriptionError};
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct WhisperCli {
    binary: OsString,
    model: String,
}

impl WhisperCli {
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            binary: OsString::from("whisper"),
            model: model.into(),
        }
    }

    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<OsString>) -> Self {
        self.binary = binary.into();
        self
    }

    fn build_command(&self, audio_path: &Path, language: Option<&str>, output_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(audio_path)
            .arg("--model")
            .arg(&self.model)
            .arg("--output_format")
            .arg("json")
            .arg("--output_dir")
            .arg(output_dir)
            .arg("--verbose")
            .arg("False");

        if let Some(language) = language {
            cmd.arg("--language").arg(language);
        }

        cmd
    }
}

impl SpeechToText for WhisperCli {
    fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<Transcript> {
        let stem = audio_path.file_stem().ok_or_else(|| {
            TranscriptionError::AudioLoadError(format!("No file name in {}", audio_path.display()))
        })?;

        let scratch = tempfile::Builder::new().prefix("softad-whisper").tempdir()?;
        let mut cmd = self.build_command(audio_path, language, scratch.path());
        debug!("Running {:?}", cmd);

        info!("Transcribing {} (model={})", audio_path.display(), self.model);
        let output = cmd.output().map_err(|e| {
            TranscriptionError::TranscriptionFailed(format!("Failed to execute whisper: {e}"))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscriptionError::TranscriptionFailed(format!(
                "whisper failed ({}): {}",
                output.status,
                stderr.trim()
            )));
        }

        let mut json_name = stem.to_os_string();
        json_name.push(".json");
        let json_path = scratch.path().join(json_name);
        if !json_path.exists() {
            return Err(TranscriptionError::TranscriptionFailed(format!(
                "whisper produced no JSON output for {}",
                audio_path.display()
            )));
        }

        crate::load_transcript(&json_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_requests_json_output() {
        let cli = WhisperCli::new("base");
        let cmd = cli.build_command(Path::new("audio/a.wav"), Some("zh"), Path::new("/tmp/x"));
        let args: Vec<String> = cmd
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();

        assert_eq!(cmd.get_program(), "whisper");
        assert_eq!(args[0], "audio/a.wav");
        assert!(args.windows(2).any(|w| w == ["--model", "base"]));
        assert!(args.windows(2).any(|w| w == ["--output_format", "json"]));
        assert!(args.windows(2).any(|w| w == ["--output_dir", "/tmp/x"]));
        assert!(args.windows(2).any(|w| w == ["--language", "zh"]));
    }

    #[test]
    fn test_language_is_optional() {
        let cli = WhisperCli::new("small").with_binary("/usr/local/bin/whisper");
        let cmd = cli.build_command(Path::new("a.wav"), None, Path::new("/tmp/x"));
        assert_eq!(cmd.get_program(), "/usr/local/bin/whisper");
        assert!(!cmd.get_args().any(|arg| arg == "--language"));
    }

    #[test]
    fn test_missing_binary_is_a_transcription_failure() {
        let cli = WhisperCli::new("base").with_binary("/nonexistent/whisper-binary");
        let result = cli.transcribe(Path::new("a.wav"), Some("zh"));
        assert!(matches!(
            result,
            Err(TranscriptionError::TranscriptionFailed(_))
        ));
    }
}
