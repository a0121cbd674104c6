//! Artifact cleanup for videos that fall out of scope.
//!
//! Only the transcript and analysis artifacts are removed. Extracted audio is
//! kept so a later size-threshold change does not force re-extraction.

use crate::StageStore;
use softad_common::MediaFile;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Result of a cleanup pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupOutcome {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl CleanupOutcome {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl StageStore {
    /// Existing downstream artifacts of `file`, including stale partial writes.
    ///
    /// Names are matched exactly, so `a.mp4` never claims the artifacts of `ab.mp4`.
    #[must_use]
    pub fn downstream_artifacts(&self, file: &MediaFile) -> Vec<PathBuf> {
        let transcript = self.transcript_path(file);
        let analysis = self.analysis_path(file);
        [
            Self::partial_path(&transcript),
            transcript,
            Self::partial_path(&analysis),
            analysis,
        ]
        .into_iter()
        .filter(|path| path.is_file())
        .collect()
    }

    /// Delete the downstream artifacts of every listed file.
    ///
    /// With `dry_run` set nothing is deleted; the outcome lists what would be.
    pub fn remove_artifacts(&self, files: &[MediaFile], dry_run: bool) -> CleanupOutcome {
        let mut outcome = CleanupOutcome::default();
        for file in files {
            for path in self.downstream_artifacts(file) {
                if dry_run {
                    debug!("Would remove {}", path.display());
                    outcome.removed.push(path);
                    continue;
                }
                match std::fs::remove_file(&path) {
                    Ok(()) => {
                        info!("Removed {}", path.display());
                        outcome.removed.push(path);
                    }
                    Err(e) => {
                        warn!("Failed to remove {}: {}", path.display(), e);
                        outcome.failed.push((path, e.to_string()));
                    }
                }
            }
        }
        outcome
    }
}
