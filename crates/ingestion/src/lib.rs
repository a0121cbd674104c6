/// Video catalog: discovers candidate videos under a root directory
use softad_common::{MediaFile, PipelineConfig, ProcessingError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Result of scanning the root: accepted videos and the ones below the size threshold
#[derive(Debug, Clone, Default)]
pub struct CatalogScan {
    /// Videos at or above the threshold, sorted by path
    pub files: Vec<MediaFile>,
    /// Videos below the threshold, sorted by path (reported, never processed)
    pub undersized: Vec<MediaFile>,
    /// Accepted-size videos whose identity is already taken by an earlier path.
    /// They would share every artifact with that video, so they are not processed.
    pub duplicates: Vec<MediaFile>,
}

/// Enumerates videos by extension and minimum size
#[derive(Debug, Clone)]
pub struct FileCatalog {
    root: PathBuf,
    extensions: Vec<String>,
    min_size_bytes: u64,
}

impl FileCatalog {
    pub fn new(root: impl Into<PathBuf>, extensions: &[String], min_size_bytes: u64) -> Self {
        Self {
            root: root.into(),
            extensions: extensions.iter().map(|ext| ext.to_lowercase()).collect(),
            min_size_bytes,
        }
    }

    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.video_dir, &config.extensions, config.min_size_bytes)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Case-insensitive extension check
    #[must_use]
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            })
    }

    /// All videos with an accepted extension regardless of size, sorted by path.
    ///
    /// Entries whose size cannot be read are logged and skipped.
    pub fn scan_candidates(&self) -> Result<Vec<MediaFile>> {
        if !self.root.is_dir() {
            return Err(ProcessingError::InvalidPath(format!(
                "Video directory does not exist: {}",
                self.root.display()
            )));
        }

        let mut candidates = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", self.root.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.matches_extension(entry.path()) {
                continue;
            }

            let size_bytes = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    warn!("Cannot read size of {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            match MediaFile::new(entry.path(), size_bytes) {
                Ok(file) => candidates.push(file),
                Err(e) => warn!("Skipping {}: {}", entry.path().display(), e),
            }
        }

        candidates.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(candidates)
    }

    /// Scan and split candidates by the size threshold.
    ///
    /// Identities are unique among the accepted files: the first path in sorted
    /// order keeps the identity, later ones land in `duplicates`.
    pub fn scan(&self) -> Result<CatalogScan> {
        let mut scan = CatalogScan::default();
        let mut identities = HashSet::new();
        for file in self.scan_candidates()? {
            if file.size_bytes >= self.min_size_bytes {
                if identities.insert(file.identity.clone()) {
                    scan.files.push(file);
                } else {
                    warn!(
                        "Duplicate identity {}: {} is skipped",
                        file.identity,
                        file.path.display()
                    );
                    scan.duplicates.push(file);
                }
            } else {
                debug!(
                    "Skipping small file ({:.1}MB): {}",
                    file.size_mb(),
                    file.path.display()
                );
                scan.undersized.push(file);
            }
        }

        info!(
            "Catalog: {} videos accepted, {} below {:.1}MB, {} duplicate names in {}",
            scan.files.len(),
            scan.undersized.len(),
            self.min_size_bytes as f64 / (1024.0 * 1024.0),
            scan.duplicates.len(),
            self.root.display()
        );

        Ok(scan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let catalog = FileCatalog::new("/tmp", &["mp4".to_string(), "MKV".to_string()], 0);
        assert!(catalog.matches_extension(Path::new("a.mp4")));
        assert!(catalog.matches_extension(Path::new("a.MP4")));
        assert!(catalog.matches_extension(Path::new("b.mkv")));
        assert!(!catalog.matches_extension(Path::new("c.mp4.part")));
        assert!(!catalog.matches_extension(Path::new("mp4")));
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let catalog = FileCatalog::new("/definitely/not/here", &["mp4".to_string()], 0);
        assert!(matches!(
            catalog.scan(),
            Err(ProcessingError::InvalidPath(_))
        ));
    }
}
