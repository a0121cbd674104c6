//! Structural validity probes for stage artifacts.
//!
//! Each probe is a pure read: it never repairs or removes what it finds.

use crate::StageStatus;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Audio: a RIFF/WAVE header is present
#[must_use]
pub fn probe_audio(path: &Path) -> StageStatus {
    let mut header = [0_u8; 12];
    let valid = File::open(path)
        .and_then(|mut file| file.read_exact(&mut header))
        .map(|()| &header[0..4] == b"RIFF" && &header[8..12] == b"WAVE")
        .unwrap_or(false);

    if valid {
        StageStatus::Completed
    } else {
        StageStatus::Absent
    }
}

/// Transcript: parseable JSON with a `segments` list
#[must_use]
pub fn probe_transcript(path: &Path) -> StageStatus {
    match read_json(path) {
        Some(value) if value.get("segments").is_some_and(serde_json::Value::is_array) => {
            StageStatus::Completed
        }
        Some(_) => {
            debug!("Transcript without segments list: {}", path.display());
            StageStatus::Absent
        }
        None => StageStatus::Absent,
    }
}

/// Analysis: parseable JSON whose `analysis_result` is a non-empty string
#[must_use]
pub fn probe_analysis(path: &Path) -> StageStatus {
    let Some(value) = read_json(path) else {
        return StageStatus::Absent;
    };

    match value.get("analysis_result").and_then(serde_json::Value::as_str) {
        Some(result) if !result.trim().is_empty() => StageStatus::Completed,
        _ => {
            debug!("Analysis without usable result: {}", path.display());
            StageStatus::Absent
        }
    }
}

fn read_json(path: &Path) -> Option<serde_json::Value> {
    let contents = std::fs::read(path).ok()?;
    match serde_json::from_slice(&contents) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Unparseable artifact {}: {}", path.display(), e);
            None
        }
    }
}
