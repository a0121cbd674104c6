//! Publish-date collection over a set of videos.

use crate::{extract_video_id, MetadataClient};
use softad_common::{MediaFile, PublishIndex, PublishRecord};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, warn};

/// Outcome of a fetch pass
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub index: PublishIndex,
    /// Distinct IDs looked up
    pub requested: usize,
    /// Files whose name carries no platform ID
    pub without_id: Vec<String>,
    /// `(video_id, reason)` for every lookup that produced no date
    pub failed: Vec<(String, String)>,
}

impl FetchReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.index.len()
    }
}

/// Look up the publish date of every file carrying a platform ID.
///
/// Files sharing an ID collapse onto the last one in `files` order, which is
/// path order for catalog scans. Lookups run in ID order, not file order.
/// `delay` is slept after every lookup to stay under the API rate limit.
pub fn fetch_publish_dates(
    client: &dyn MetadataClient,
    files: &[MediaFile],
    delay: Duration,
) -> FetchReport {
    let mut report = FetchReport::default();

    let mut ids: BTreeMap<String, String> = BTreeMap::new();
    for file in files {
        let filename = file.file_name();
        match extract_video_id(&filename) {
            Some(video_id) => {
                ids.insert(video_id, filename);
            }
            None => report.without_id.push(filename),
        }
    }
    info!("Found {} video ids in {} files", ids.len(), files.len());
    report.requested = ids.len();

    for (video_id, filename) in ids {
        info!("Fetching video info: {} ({})", video_id, filename);
        match client.video_info(&video_id) {
            Ok(video) => match video.publish_date() {
                Some(publish_date) => {
                    info!("{}: published {}", video_id, publish_date);
                    report.index.insert(
                        video_id,
                        PublishRecord {
                            filename,
                            publish_date,
                            title: video.title,
                            duration: video.duration,
                        },
                    );
                }
                None => {
                    warn!("{}: no publish date (pubdate={})", video_id, video.pubdate);
                    report
                        .failed
                        .push((video_id, format!("invalid pubdate {}", video.pubdate)));
                }
            },
            Err(e) => {
                warn!("{}: failed to fetch video info: {}", video_id, e);
                report.failed.push((video_id, e.to_string()));
            }
        }

        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }

    report
}
