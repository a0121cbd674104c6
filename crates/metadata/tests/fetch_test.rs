//! Fetch loop against an in-process metadata API

use softad_common::MediaFile;
use softad_metadata::{fetch_publish_dates, MetadataClient, MetadataError, VideoInfo};
use std::cell::RefCell;
use std::time::Duration;

struct FakeApi {
    calls: RefCell<Vec<String>>,
}

impl FakeApi {
    fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl MetadataClient for FakeApi {
    fn video_info(&self, video_id: &str) -> softad_metadata::Result<VideoInfo> {
        self.calls.borrow_mut().push(video_id.to_string());
        match video_id {
            "BV1ok" => Ok(VideoInfo {
                pubdate: 1_709_294_400,
                title: "开箱".to_string(),
                duration: 305,
            }),
            "BV1nodate" => Ok(VideoInfo {
                pubdate: 0,
                title: "draft".to_string(),
                duration: 10,
            }),
            _ => Err(MetadataError::Api {
                code: -404,
                message: "not found".to_string(),
            }),
        }
    }
}

fn media(name: &str) -> MediaFile {
    MediaFile::new(format!("/videos/{name}"), 6 * 1024 * 1024).unwrap()
}

#[test]
fn test_fetch_collects_dates_and_failures() {
    let api = FakeApi::new();
    let files = vec![
        media("[BV1ok] 开箱.mp4"),
        media("[BV1nodate] 草稿.mp4"),
        media("[BV1gone] 删除.mp4"),
        media("no id here.mp4"),
    ];

    let report = fetch_publish_dates(&api, &files, Duration::ZERO);

    assert_eq!(report.requested, 3);
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed.len(), 2);
    assert_eq!(report.without_id, vec!["no id here.mp4".to_string()]);

    let record = report.index.get("BV1ok").unwrap();
    assert_eq!(record.filename, "[BV1ok] 开箱.mp4");
    assert_eq!(record.title, "开箱");
    assert_eq!(record.duration, 305);
    assert_eq!(
        report.index.date_for_filename("[BV1ok] 开箱.mp4"),
        Some(record.publish_date)
    );
}

#[test]
fn test_duplicate_ids_collapse_to_last_file() {
    let api = FakeApi::new();
    let files = vec![media("[BV1ok] part1.mp4"), media("[BV1ok] part2.mp4")];

    let report = fetch_publish_dates(&api, &files, Duration::ZERO);

    assert_eq!(api.calls.borrow().as_slice(), ["BV1ok".to_string()]);
    assert_eq!(report.index.get("BV1ok").unwrap().filename, "[BV1ok] part2.mp4");
}
