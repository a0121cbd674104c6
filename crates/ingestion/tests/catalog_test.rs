use softad_common::MIN_VIDEO_SIZE_BYTES;
use softad_ingestion::FileCatalog;
use std::fs::File;
use std::path::Path;
use tempfile::TempDir;

fn make_file(path: &Path, len: u64) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().set_len(len).unwrap();
}

fn mp4_catalog(root: &Path) -> FileCatalog {
    FileCatalog::new(root, &["mp4".to_string()], MIN_VIDEO_SIZE_BYTES)
}

#[test]
fn test_undersized_files_never_enter_catalog() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    make_file(&root.join("exact.mp4"), MIN_VIDEO_SIZE_BYTES);
    make_file(&root.join("one_byte_short.mp4"), MIN_VIDEO_SIZE_BYTES - 1);
    make_file(&root.join("empty.mp4"), 0);
    make_file(&root.join("large.MP4"), MIN_VIDEO_SIZE_BYTES * 3);

    let scan = mp4_catalog(root).scan().unwrap();

    let accepted: Vec<&str> = scan.files.iter().map(|f| f.identity.as_str()).collect();
    assert_eq!(accepted, vec!["exact", "large"]);
    assert!(scan
        .files
        .iter()
        .all(|f| f.size_bytes >= MIN_VIDEO_SIZE_BYTES));

    let undersized: Vec<&str> = scan
        .undersized
        .iter()
        .map(|f| f.identity.as_str())
        .collect();
    assert_eq!(undersized, vec!["empty", "one_byte_short"]);

    // Excluded, not deleted
    assert!(root.join("empty.mp4").exists());
}

#[test]
fn test_scan_is_recursive_and_sorted() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    make_file(&root.join("b/second.mp4"), MIN_VIDEO_SIZE_BYTES);
    make_file(&root.join("a/first.mp4"), MIN_VIDEO_SIZE_BYTES);
    make_file(&root.join("c.mp4"), MIN_VIDEO_SIZE_BYTES);
    make_file(&root.join("notes.txt"), MIN_VIDEO_SIZE_BYTES);
    make_file(&root.join("clip.mov"), MIN_VIDEO_SIZE_BYTES);

    let catalog = mp4_catalog(root);
    let first = catalog.scan().unwrap();
    let second = catalog.scan().unwrap();

    let identities: Vec<&str> = first.files.iter().map(|f| f.identity.as_str()).collect();
    assert_eq!(identities, vec!["first", "second", "c"]);
    assert_eq!(first.files, second.files);
}

#[test]
fn test_candidates_ignore_threshold() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    make_file(&root.join("tiny.mp4"), 10);
    make_file(&root.join("big.mp4"), MIN_VIDEO_SIZE_BYTES);

    let candidates = mp4_catalog(root).scan_candidates().unwrap();
    assert_eq!(candidates.len(), 2);
}

#[test]
fn test_same_stem_in_two_folders_keeps_first_path() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    make_file(&root.join("b/x.mp4"), MIN_VIDEO_SIZE_BYTES);
    make_file(&root.join("a/x.mp4"), MIN_VIDEO_SIZE_BYTES);
    make_file(&root.join("y.mp4"), MIN_VIDEO_SIZE_BYTES);

    let scan = mp4_catalog(root).scan().unwrap();

    let accepted: Vec<_> = scan.files.iter().map(|f| f.path.clone()).collect();
    assert_eq!(accepted, vec![root.join("a/x.mp4"), root.join("y.mp4")]);
    assert_eq!(scan.duplicates.len(), 1);
    assert_eq!(scan.duplicates[0].path, root.join("b/x.mp4"));
    assert!(scan.undersized.is_empty());
}

#[test]
fn test_undersized_namesake_does_not_displace_accepted_file() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    make_file(&root.join("a/x.mp4"), 10);
    make_file(&root.join("b/x.mp4"), MIN_VIDEO_SIZE_BYTES);

    let scan = mp4_catalog(root).scan().unwrap();

    assert_eq!(scan.files.len(), 1);
    assert_eq!(scan.files[0].path, root.join("b/x.mp4"));
    assert_eq!(scan.undersized.len(), 1);
    assert_eq!(scan.undersized[0].path, root.join("a/x.mp4"));
    assert!(scan.duplicates.is_empty());
}
