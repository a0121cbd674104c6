//! In-process transcription with whisper.cpp.

use crate::{Result, SpeechToText, Transcript, TranscriptSegment, TranscriptionError};
use std::path::Path;
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Expected input sample rate
const SAMPLE_RATE: u32 = 16000;

const BEAM_SIZE: i32 = 5;

/// Transcription engine using Whisper.cpp
pub struct WhisperCppTranscriber {
    context: WhisperContext,
    num_threads: usize,
}

impl WhisperCppTranscriber {
    /// Load a ggml model file
    pub fn new(model_path: impl AsRef<Path>) -> Result<Self> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            return Err(TranscriptionError::ModelLoadError(format!(
                "Model file not found: {}",
                model_path.display()
            )));
        }

        info!("Loading Whisper model from {}", model_path.display());

        let context = WhisperContext::new_with_params(
            model_path.to_str().ok_or_else(|| {
                TranscriptionError::ModelLoadError("Invalid path encoding".to_string())
            })?,
            WhisperContextParameters::default(),
        )
        .map_err(|e| TranscriptionError::ModelLoadError(e.to_string()))?;

        Ok(Self {
            context,
            num_threads: num_cpus::get(),
        })
    }

    fn load_samples(audio_path: &Path) -> Result<Vec<f32>> {
        let mut reader = hound::WavReader::open(audio_path).map_err(|e| {
            TranscriptionError::AudioLoadError(format!("Failed to open WAV file: {e}"))
        })?;

        let spec = reader.spec();
        if spec.sample_rate != SAMPLE_RATE {
            return Err(TranscriptionError::AudioLoadError(format!(
                "Expected 16kHz sample rate, got {}Hz",
                spec.sample_rate
            )));
        }
        if spec.channels != 1 {
            return Err(TranscriptionError::AudioLoadError(format!(
                "Expected mono audio, got {} channels",
                spec.channels
            )));
        }

        let samples = match spec.sample_format {
            hound::SampleFormat::Int => {
                let max_val = (1_i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|s| s as f32 / max_val))
                    .collect::<std::result::Result<Vec<f32>, _>>()
            }
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<f32>, _>>(),
        }
        .map_err(|e| TranscriptionError::AudioLoadError(format!("Failed to read sample: {e}")))?;

        debug!(
            "Loaded {} samples ({:.2}s) from {}",
            samples.len(),
            samples.len() as f64 / f64::from(SAMPLE_RATE),
            audio_path.display()
        );

        Ok(samples)
    }
}

impl SpeechToText for WhisperCppTranscriber {
    fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<Transcript> {
        let samples = Self::load_samples(audio_path)?;

        let mut params = FullParams::new(SamplingStrategy::BeamSearch {
            beam_size: BEAM_SIZE,
            patience: 1.0,
        });
        params.set_n_threads(self.num_threads as i32);
        params.set_language(language);
        params.set_print_progress(false);
        params.set_print_realtime(false);

        let mut state = self
            .context
            .create_state()
            .map_err(|e| TranscriptionError::TranscriptionFailed(e.to_string()))?;

        state
            .full(params, &samples)
            .map_err(|e| TranscriptionError::TranscriptionFailed(e.to_string()))?;

        let mut segments = Vec::new();
        let mut text = String::new();
        for segment in state.as_iter() {
            // whisper.cpp timestamps are in centiseconds
            let start = segment.start_timestamp() as f64 / 100.0;
            let end = segment.end_timestamp() as f64 / 100.0;
            let segment_text = segment.to_string();

            text.push_str(&segment_text);
            segments.push(TranscriptSegment {
                start,
                end,
                text: segment_text.trim().to_string(),
            });
        }

        info!(
            "Transcription complete: {} segments from {}",
            segments.len(),
            audio_path.display()
        );

        Ok(Transcript {
            text: text.trim().to_string(),
            segments,
            language: language.map(str::to_string),
        })
    }
}
