//! Zip packaging of an export set.
//!
//! Archives are named `<basename>_<MODE>_<hex-timestamp>.zip`, where the
//! timestamp is milliseconds since the Unix epoch in lowercase hex. Members are
//! written in export order with deflate compression.

use crate::export::ExportEntry;
use crate::layout::Mode;
use std::fs;
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] ZipError),
}

/// `<basename>_<MODE>_<hex millis>.zip`
pub fn archive_file_name(basename: &str, mode: Mode, timestamp_ms: i64) -> String {
    format!("{basename}_{}_{timestamp_ms:x}.zip", mode.name())
}

/// Write `entries` as a zip into `writer` and hand the writer back.
pub fn write_archive<W: Write + Seek>(entries: &[ExportEntry], writer: W) -> Result<W, ArchiveError> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        zip.start_file(entry.filename.as_str(), options)?;
        zip.write_all(&entry.bytes)?;
    }
    Ok(zip.finish()?)
}

/// Zip `entries` in memory.
pub fn archive_bytes(entries: &[ExportEntry]) -> Result<Vec<u8>, ArchiveError> {
    Ok(write_archive(entries, Cursor::new(Vec::new()))?.into_inner())
}

/// Write the archive into `dir` under a freshly timestamped name.
pub fn save_archive(
    entries: &[ExportEntry],
    dir: &Path,
    basename: &str,
    mode: Mode,
) -> Result<PathBuf, ArchiveError> {
    let name = archive_file_name(basename, mode, chrono::Utc::now().timestamp_millis());
    let bytes = archive_bytes(entries)?;

    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, &bytes)?;

    info!(path = %path.display(), bytes = bytes.len(), files = entries.len(), "archive written");
    Ok(path)
}
