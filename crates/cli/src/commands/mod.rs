pub mod clean;
pub mod fetch_dates;
pub mod report;
pub mod run;
pub mod status;

use clap::Args;
use softad_common::PipelineConfig;
use std::path::PathBuf;

/// Directory overrides shared by the commands
#[derive(Args, Debug, Clone, Default)]
pub struct DirArgs {
    /// Directory scanned recursively for videos
    #[arg(long)]
    pub video_dir: Option<PathBuf>,

    /// Root directory for all artifacts
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

impl DirArgs {
    /// Command-line values take precedence over the config file
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(video_dir) = &self.video_dir {
            config.video_dir.clone_from(video_dir);
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir.clone_from(output_dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_only_given_dirs() {
        let mut config = PipelineConfig::default();
        let args = DirArgs {
            video_dir: Some(PathBuf::from("/media/videos")),
            output_dir: None,
        };
        args.apply(&mut config);
        assert_eq!(config.video_dir, PathBuf::from("/media/videos"));
        assert_eq!(config.output_dir, PipelineConfig::default().output_dir);
    }
}
