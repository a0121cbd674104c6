//! `ads_summary.csv` reading and writing.
//!
//! The file starts with a UTF-8 byte order mark so spreadsheet tools pick the
//! right encoding for the Chinese columns.

use crate::{AggregateRecord, Result};
use softad_common::identity_of;
use softad_storage::StageStore;
use std::path::Path;
use tracing::info;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Column order of the summary
pub const SUMMARY_COLUMNS: [&str; 9] = [
    "filename",
    "publish_date",
    "is_ad",
    "ad_type",
    "product_name",
    "ad_text",
    "confidence",
    "ads_time",
    "raw_response",
];

/// Render records as CSV bytes, header row included
pub fn to_csv_bytes(records: &[AggregateRecord]) -> Result<Vec<u8>> {
    let mut buffer = UTF8_BOM.to_vec();
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        // Serialization only emits the header alongside the first row
        if records.is_empty() {
            writer.write_record(SUMMARY_COLUMNS)?;
        }
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
    }
    Ok(buffer)
}

/// Write the summary atomically
pub fn write_summary(path: &Path, records: &[AggregateRecord]) -> Result<()> {
    let bytes = to_csv_bytes(records)?;
    StageStore::write_atomic(path, &bytes)?;
    info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

/// Read a summary written by [`write_summary`]
pub fn read_summary(path: &Path) -> Result<Vec<AggregateRecord>> {
    let contents = std::fs::read(path)?;
    let body = contents.strip_prefix(UTF8_BOM).unwrap_or(contents.as_slice());

    let mut reader = csv::Reader::from_reader(body);
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let mut record: AggregateRecord = row?;
        record.identity = identity_of(Path::new(&record.filename)).unwrap_or_default();
        records.push(record);
    }
    Ok(records)
}
