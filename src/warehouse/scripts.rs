//! Ordered SQL script execution
//!
//! Builds the staging and dimension tables by running SQL files against the
//! warehouse, then reports row counts for the summary tables.

use super::{quote_ident, require_database};
use crate::config::TransformConfig;
use crate::error::{EtlError, Result};

use owo_colors::OwoColorize;
use rusqlite::{Batch, Connection, OpenFlags};
use std::path::{Path, PathBuf};

/// Row count for one summary table; `rows` is `None` when the table does
/// not exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableCount {
    pub table: String,
    pub rows: Option<u64>,
}

impl std::fmt::Display for TableCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.rows {
            Some(rows) => write!(f, "{}: {}", self.table, rows),
            None => write!(f, "{}: -1", self.table),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TransformReport {
    /// Script filenames, in the order they ran
    pub scripts: Vec<String>,
    pub counts: Vec<TableCount>,
}

/// Runs a validated list of SQL scripts against an existing database
///
/// Construction checks that the database and every script exist, so a bad
/// path is reported before any SQL runs.
///
/// # Example
/// ```no_run
/// use brewery_etl::config::TransformConfig;
/// use brewery_etl::warehouse::ScriptRunner;
///
/// # fn example() -> brewery_etl::error::Result<()> {
/// let report = ScriptRunner::prepare(&TransformConfig::default())?.run()?;
/// for count in &report.counts {
///     println!("{}", count);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ScriptRunner {
    db_path: PathBuf,
    scripts: Vec<PathBuf>,
    summary_tables: Vec<String>,
}

impl ScriptRunner {
    /// Resolve scripts against `sql_dir` and check that everything exists
    ///
    /// # Errors
    /// `NotFound` naming the database or the first missing script
    pub fn prepare(config: &TransformConfig) -> Result<Self> {
        require_database(&config.db_path)?;

        let scripts = config
            .scripts
            .iter()
            .map(|name| {
                let path = config.sql_dir.join(name);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(EtlError::not_found("SQL script", path))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            db_path: config.db_path.clone(),
            scripts,
            summary_tables: config.summary_tables.clone(),
        })
    }

    pub fn scripts(&self) -> &[PathBuf] {
        &self.scripts
    }

    /// Execute every script in order, stopping at the first failure
    ///
    /// The session runs with foreign keys enforced and WAL journaling.
    /// Nothing is rolled back beyond what the scripts' own transactions
    /// cover.
    pub fn run(&self) -> Result<TransformReport> {
        log::info!("Using DB: {}", self.db_path.display().bright_black());

        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.pragma_update(None, "foreign_keys", true)?;
        let journal: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        log::debug!("journal_mode = {}", journal);

        let mut ran = Vec::with_capacity(self.scripts.len());
        for path in &self.scripts {
            let filename = script_name(path);
            log::info!("==> Running {}", filename.cyan());

            let sql = std::fs::read_to_string(path).map_err(|e| EtlError::io(path, e))?;
            execute_script(&conn, &sql).map_err(|error| EtlError::Script {
                filename: filename.clone(),
                error,
            })?;

            log::info!("Completed {}", filename);
            ran.push(filename);
        }

        let counts = self
            .summary_tables
            .iter()
            .map(|table| {
                Ok(TableCount {
                    table: table.clone(),
                    rows: count_rows(&conn, table)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(TransformReport {
            scripts: ran,
            counts,
        })
    }
}

fn script_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Run every statement of `sql` in order, draining any result rows
fn execute_script(conn: &Connection, sql: &str) -> rusqlite::Result<()> {
    let mut batch = Batch::new(conn, sql);
    while let Some(mut stmt) = batch.next()? {
        let mut rows = stmt.raw_query();
        while rows.next()?.is_some() {}
    }
    Ok(())
}

/// `None` for a missing table; other failures propagate
fn count_rows(conn: &Connection, table: &str) -> Result<Option<u64>> {
    let exists = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1")?
        .exists([table])?;
    if !exists {
        return Ok(None);
    }

    let rows: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
        [],
        |row| row.get(0),
    )?;
    Ok(Some(rows.max(0) as u64))
}
