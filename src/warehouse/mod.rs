//! SQLite warehouse: raw-table loads, SQL script runs and table exports
//!
//! Each operation opens its own connection and drops it before returning.

mod exporter;
mod raw_table;
mod scripts;

pub use exporter::{ExportFormat, ExportedTable, TableExporter, list_tables, safe_filename};
pub use raw_table::{LoadMode, RawTableLoader};
pub use scripts::{ScriptRunner, TableCount, TransformReport};

use crate::error::{EtlError, Result};
use rusqlite::Connection;
use std::path::Path;

/// Quote an identifier for interpolation into SQL text
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub(crate) fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let mut stmt =
        conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    Ok(stmt.exists([table])?)
}

/// Fail with `NotFound` unless the database file exists
pub(crate) fn require_database(db_path: &Path) -> Result<()> {
    if db_path.is_file() {
        Ok(())
    } else {
        Err(EtlError::not_found("database", db_path))
    }
}
