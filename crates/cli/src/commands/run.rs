//! Full pipeline run

use super::DirArgs;
use anyhow::{Context as _, Result};
use clap::Args;
use softad_audio_extractor::FfmpegTranscoder;
use softad_classifier::{AdClassifier, OllamaClient};
use softad_common::PipelineConfig;
use softad_orchestrator::{Collaborators, Pipeline};
use softad_transcription::SpeechToText;
use std::time::Instant;
use tracing::info;

#[derive(Args)]
pub struct RunCommand {
    #[command(flatten)]
    dirs: DirArgs,

    /// Regenerate every artifact even if it already exists
    #[arg(short, long)]
    force: bool,

    /// Whisper model name, or a ggml model file with the `whisper` feature
    #[arg(long)]
    whisper_model: Option<String>,

    /// Reasoning model served by Ollama
    #[arg(long)]
    model: Option<String>,
}

impl RunCommand {
    pub fn execute(self, mut config: PipelineConfig) -> Result<()> {
        self.dirs.apply(&mut config);
        config.force |= self.force;
        if let Some(model) = self.whisper_model {
            config.whisper_model = model;
        }
        if let Some(model) = self.model {
            config.ollama_model = model;
        }

        info!("=== softad run ===");
        info!("Videos: {}", config.video_dir.display());
        info!("Output: {}", config.output_dir.display());

        let collaborators = build_collaborators(&config)?;
        let pipeline = Pipeline::new(config);

        let start = Instant::now();
        let report = pipeline
            .run(&collaborators)
            .context("Pipeline run failed")?;

        println!();
        println!("Videos processed: {} ({} below size threshold)", report.catalog_size, report.undersized);
        if report.duplicates > 0 {
            println!("Skipped {} videos sharing a file name with another video", report.duplicates);
        }
        for stage in &report.stages {
            println!(
                "  {:<10} {} completed, {} skipped, {} failed",
                stage.stage.to_string(),
                stage.completed,
                stage.skipped_existing + stage.skipped_upstream,
                stage.failed.len()
            );
        }
        println!("Analyzed: {}", report.summary.total);
        println!("Flagged as advertising: {}", report.summary.ads);
        println!("With timestamps: {}", report.summary.localized);
        println!("Summary: {}", report.summary_path.display());
        println!("Elapsed: {:.1}s", start.elapsed().as_secs_f64());

        Ok(())
    }
}

fn build_collaborators(config: &PipelineConfig) -> Result<Collaborators> {
    let client = OllamaClient::with_timeout(
        &config.ollama_url,
        &config.ollama_model,
        config.reasoning_timeout(),
    )
    .context("Failed to create reasoning client")?;

    Ok(Collaborators {
        transcoder: Box::new(FfmpegTranscoder::default()),
        speech: build_speech(config)?,
        classifier: AdClassifier::new(client),
    })
}

#[cfg(feature = "whisper")]
fn build_speech(config: &PipelineConfig) -> Result<Box<dyn SpeechToText>> {
    use softad_transcription::{WhisperCli, WhisperCppTranscriber};

    let model = std::path::Path::new(&config.whisper_model);
    if model.is_file() {
        let transcriber = WhisperCppTranscriber::new(model).context("Failed to load whisper model")?;
        return Ok(Box::new(transcriber));
    }
    Ok(Box::new(WhisperCli::new(&config.whisper_model)))
}

#[cfg(not(feature = "whisper"))]
fn build_speech(config: &PipelineConfig) -> Result<Box<dyn SpeechToText>> {
    use softad_transcription::WhisperCli;

    Ok(Box::new(WhisperCli::new(&config.whisper_model)))
}
