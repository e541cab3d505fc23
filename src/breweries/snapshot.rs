//! Timestamped snapshot files of fetched records

use super::Record;
use crate::error::Result;
use crate::storage::NdjsonWriter;

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// `<raw_dir>/breweries_<YYYYMMDD_HHMMSS>.jsonl` for the capture time
pub fn snapshot_path(raw_dir: impl AsRef<Path>, captured_at: DateTime<Local>) -> PathBuf {
    raw_dir.as_ref().join(format!(
        "breweries_{}.jsonl",
        captured_at.format("%Y%m%d_%H%M%S")
    ))
}

/// Write `records` to a fresh snapshot in `raw_dir` and return its path
///
/// Fails rather than overwrite if a snapshot with the same timestamp exists.
pub fn write_snapshot(raw_dir: impl AsRef<Path>, records: &[Record]) -> Result<PathBuf> {
    let path = snapshot_path(raw_dir, Local::now());
    NdjsonWriter::new(&path).write_new(records)?;
    Ok(path)
}
