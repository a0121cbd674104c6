//! Tests for the artifact store against a real output directory

use softad_common::{MediaFile, PublishIndex, PublishRecord};
use softad_storage::{AnalysisArtifact, Stage, StageStatus, StageStore, StorageError};
use softad_transcription::{Transcript, TranscriptSegment};
use tempfile::TempDir;

fn media(identity: &str) -> MediaFile {
    MediaFile::new(format!("/videos/{identity}.mp4"), 8 * 1024 * 1024).unwrap()
}

fn transcript() -> Transcript {
    Transcript {
        text: "今天推荐一款耳机".to_string(),
        segments: vec![TranscriptSegment {
            start: 3.2,
            end: 6.0,
            text: "今天推荐一款耳机".to_string(),
        }],
        language: Some("zh".to_string()),
    }
}

fn analysis(result: Option<&str>) -> AnalysisArtifact {
    AnalysisArtifact {
        transcript_path: "transcript/a.json".to_string(),
        analysis_result: result.map(str::to_string),
        segments: transcript().segments,
        ..Default::default()
    }
}

#[test]
fn test_status_follows_artifact_validity() {
    let dir = TempDir::new().unwrap();
    let store = StageStore::new(dir.path());
    store.ensure_layout().unwrap();
    let file = media("a");

    for stage in Stage::ALL {
        assert_eq!(store.status(&file, stage), StageStatus::Absent);
    }

    store.save_transcript(&file, &transcript()).unwrap();
    assert_eq!(store.status(&file, Stage::Transcript), StageStatus::Completed);

    store.save_analysis(&file, &analysis(None)).unwrap();
    assert_eq!(store.status(&file, Stage::Analysis), StageStatus::Absent);

    store.save_analysis(&file, &analysis(Some("{\"is_ad\": false}"))).unwrap();
    assert_eq!(store.status(&file, Stage::Analysis), StageStatus::Completed);
}

#[test]
fn test_truncated_transcript_is_not_completed() {
    let dir = TempDir::new().unwrap();
    let store = StageStore::new(dir.path());
    store.ensure_layout().unwrap();
    let file = media("a");

    std::fs::write(store.transcript_path(&file), r#"{"text":"今天","segm"#).unwrap();
    assert_eq!(store.status(&file, Stage::Transcript), StageStatus::Absent);
    assert!(store.load_transcript(&file).is_err());
}

#[test]
fn test_atomic_write_leaves_no_partial() {
    let dir = TempDir::new().unwrap();
    let store = StageStore::new(dir.path());
    let file = media("a");

    let path = store.save_transcript(&file, &transcript()).unwrap();
    assert!(path.exists());
    assert!(!StageStore::partial_path(&path).exists());
    assert_eq!(store.load_transcript(&file).unwrap(), transcript());
}

#[test]
fn test_load_missing_analysis_is_not_found() {
    let dir = TempDir::new().unwrap();
    let store = StageStore::new(dir.path());
    assert!(matches!(
        store.load_analysis(&media("missing")),
        Err(StorageError::NotFound(_))
    ));
}

#[test]
fn test_patch_publish_date_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = StageStore::new(dir.path());
    let file = media("a");
    store.save_analysis(&file, &analysis(Some("{}"))).unwrap();

    assert!(store.patch_publish_date(&file, "2024-03-01").unwrap());
    let first = std::fs::read(store.analysis_path(&file)).unwrap();

    assert!(!store.patch_publish_date(&file, "2024-03-01").unwrap());
    let second = std::fs::read(store.analysis_path(&file)).unwrap();
    assert_eq!(first, second);

    let artifact = store.load_analysis(&file).unwrap();
    assert_eq!(artifact.publish_date.as_deref(), Some("2024-03-01"));
    assert_eq!(artifact.raw_response(), "{}");
}

#[test]
fn test_publish_index_roundtrip_and_corruption() {
    let dir = TempDir::new().unwrap();
    let store = StageStore::new(dir.path());
    assert!(store.load_publish_index().is_empty());

    let mut index = PublishIndex::new();
    index.insert(
        "BV1xx411c7mD",
        PublishRecord {
            filename: "[BV1xx411c7mD] vlog.mp4".to_string(),
            publish_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            title: "vlog".to_string(),
            duration: 600,
        },
    );
    store.save_publish_index(&index).unwrap();
    assert_eq!(store.load_publish_index(), index);

    std::fs::write(store.published_path(), "{not json").unwrap();
    assert!(store.load_publish_index().is_empty());
}

#[test]
fn test_cleanup_matches_exact_names() {
    let dir = TempDir::new().unwrap();
    let store = StageStore::new(dir.path());
    store.ensure_layout().unwrap();
    let small = media("a");
    let neighbour = media("ab");

    for file in [&small, &neighbour] {
        store.save_transcript(file, &transcript()).unwrap();
        store.save_analysis(file, &analysis(Some("{}"))).unwrap();
    }
    std::fs::write(store.audio_path(&small), b"RIFF\0\0\0\0WAVE").unwrap();

    let dry = store.remove_artifacts(std::slice::from_ref(&small), true);
    assert_eq!(dry.removed.len(), 2);
    assert!(store.transcript_path(&small).exists());

    let outcome = store.remove_artifacts(std::slice::from_ref(&small), false);
    assert!(outcome.is_clean());
    assert_eq!(outcome.removed.len(), 2);
    assert!(!store.transcript_path(&small).exists());
    assert!(!store.analysis_path(&small).exists());
    assert!(store.audio_path(&small).exists());
    assert!(store.transcript_path(&neighbour).exists());
    assert!(store.analysis_path(&neighbour).exists());
}
