//! NDJSON (Newline Delimited JSON) snapshot files

use crate::breweries::Record;
use crate::error::{EtlError, Result};
use crate::etl::Extractor;

use eyre::Context;
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Read records from a JSON-lines file
pub struct NdjsonReader {
    path: PathBuf,
}

impl NdjsonReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read every non-blank line as a JSON object, in file order
    pub fn read(&self) -> Result<Vec<Record>> {
        if !self.path.exists() {
            return Err(EtlError::not_found("snapshot file", &self.path));
        }

        let content =
            std::fs::read_to_string(&self.path).map_err(|e| EtlError::io(&self.path, e))?;

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str::<Record>(line).map_err(EtlError::from))
            .collect()
    }
}

impl Extractor for NdjsonReader {
    type Item = Record;

    async fn extract(&self) -> eyre::Result<Vec<Self::Item>> {
        self.read()
            .with_context(|| format!("Failed to read snapshot {}", self.path.display()))
    }
}

/// Write records to a new JSON-lines file
pub struct NdjsonWriter {
    path: PathBuf,
}

impl NdjsonWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write items as one compact JSON value per line
    ///
    /// Parent directories are created as needed. The file must not already
    /// exist; an existing file is never truncated.
    pub fn write_new<T: Serialize>(&self, items: &[T]) -> Result<usize> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| EtlError::io(parent, e))?;
        }

        let file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .map_err(|e| EtlError::io(&self.path, e))?;
        let mut out = BufWriter::new(file);

        for item in items {
            serde_json::to_writer(&mut out, item)?;
            out.write_all(b"\n")
                .map_err(|e| EtlError::io(&self.path, e))?;
        }
        out.flush().map_err(|e| EtlError::io(&self.path, e))?;

        Ok(items.len())
    }
}
